//! This crate simulates the BER-versus-SNR performance of BPSK, QPSK, and
//! 16-QAM over an AWGN channel, either uncoded or with a rate-1/2 K=7
//! convolutional code and soft-decision Viterbi decoding. Simulation
//! parameters are specified on the command line, and simulation results are
//! saved to a JSON file.
//!
//! Build the executable with `cargo build --release` and then run
//! `./target/release/linksim -h` for help on the command-line interface.

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

use anyhow::Result;
use clap::{crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use linksim::{sim, Modulation};
use std::time::Instant;

/// Main function
fn main() -> Result<()> {
    let timer = Instant::now();
    let matches = command_line_parser().get_matches();
    let json_filename = json_filename_from_matches(&matches);
    sim::run_sims(&all_sim_params(&matches)?, &json_filename)?;
    eprintln!("Elapsed time: {:.3?}", timer.elapsed());
    Ok(())
}

/// Returns command line parser.
fn command_line_parser() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Evaluates the BER of BPSK/QPSK/16-QAM over an AWGN channel")
        .arg(mod_order())
        .arg(coded())
        .arg(first_snr_db())
        .arg(snr_step_db())
        .arg(num_snr())
        .arg(num_bits())
        .arg(seed())
        .arg(json_filename())
}

/// Returns argument for modulation order.
fn mod_order() -> Arg {
    Arg::new("mod_order")
        .short('m')
        .value_parser(["2", "4", "16"])
        .default_value("4")
        .help("Modulation order")
}

/// Returns argument for enabling the convolutional code.
fn coded() -> Arg {
    Arg::new("coded")
        .short('c')
        .action(ArgAction::SetTrue)
        .help("Apply the rate-1/2 K=7 convolutional code")
}

/// Returns argument for first Eb/N0 (dB).
fn first_snr_db() -> Arg {
    Arg::new("first_snr_db")
        .short('r')
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .default_value("0.0")
        .help("First Eb/N0 (dB)")
}

/// Returns argument for Eb/N0 step (dB).
fn snr_step_db() -> Arg {
    Arg::new("snr_step_db")
        .short('p')
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .default_value("1.0")
        .help("Eb/N0 step (dB)")
}

/// Returns argument for number of Eb/N0 values.
fn num_snr() -> Arg {
    Arg::new("num_snr")
        .short('s')
        .value_parser(value_parser!(u32))
        .default_value("11")
        .help("Number of Eb/N0 values")
}

/// Returns argument for number of information bits per point.
fn num_bits() -> Arg {
    Arg::new("num_bits")
        .short('b')
        .value_parser(value_parser!(u64))
        .default_value("1000000")
        .help("Number of information bits per Eb/N0 point")
}

/// Returns argument for base seed.
fn seed() -> Arg {
    Arg::new("seed")
        .short('d')
        .value_parser(value_parser!(u64))
        .help("Base seed; point n uses seed + n (entropy-seeded if absent)")
}

/// Returns argument for name of JSON file to which results must be saved.
fn json_filename() -> Arg {
    Arg::new("json_filename")
        .short('f')
        .default_value("results.json")
        .help("Name of JSON file to which results must be saved")
}

/// Returns simulation parameters based on command-line arguments.
fn all_sim_params(matches: &ArgMatches) -> Result<Vec<sim::SimParams>> {
    let modulation = modulation_from_matches(matches)?;
    let coded = matches.get_flag("coded");
    let num_bits = num_bits_from_matches(matches);
    let base_seed = seed_from_matches(matches);
    let all_params = all_eb_over_n0_db_from_matches(matches)
        .into_iter()
        .enumerate()
        .map(|(index, eb_over_n0_db)| sim::SimParams {
            modulation,
            coded,
            eb_over_n0_db,
            num_bits,
            seed: base_seed.map(|seed| seed + index as u64),
        })
        .collect();
    Ok(all_params)
}

/// Returns modulation scheme.
fn modulation_from_matches(matches: &ArgMatches) -> Result<Modulation> {
    let mod_order: u32 = matches
        .get_one::<String>("mod_order")
        .expect("argument has a default value")
        .parse()?;
    Ok(Modulation::from_order(mod_order)?)
}

/// Returns all Eb/N0 (dB) values.
fn all_eb_over_n0_db_from_matches(matches: &ArgMatches) -> Vec<f64> {
    let first_snr_db: f64 = *matches
        .get_one("first_snr_db")
        .expect("argument has a default value");
    let snr_step_db: f64 = *matches
        .get_one("snr_step_db")
        .expect("argument has a default value");
    let num_snr: u32 = *matches
        .get_one("num_snr")
        .expect("argument has a default value");
    (0 .. num_snr)
        .map(|n| first_snr_db + snr_step_db * f64::from(n))
        .collect()
}

/// Returns number of information bits per point.
fn num_bits_from_matches(matches: &ArgMatches) -> u64 {
    *matches
        .get_one("num_bits")
        .expect("argument has a default value")
}

/// Returns base seed, if one was given.
fn seed_from_matches(matches: &ArgMatches) -> Option<u64> {
    matches.get_one("seed").copied()
}

/// Returns name of JSON file to which simulation results must be saved.
fn json_filename_from_matches(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("json_filename")
        .expect("argument has a default value")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_line_for_test() -> Vec<&'static str> {
        vec![
            crate_name!(),
            "-m",
            "16",
            "-c",
            "-r",
            "-2.0",
            "-p",
            "0.5",
            "-s",
            "4",
            "-b",
            "50000",
            "-d",
            "17",
            "-f",
            "results.json",
        ]
    }

    #[test]
    fn test_command_line_parser() {
        assert!(command_line_parser()
            .try_get_matches_from(command_line_for_test())
            .is_ok());
    }

    #[test]
    fn test_command_line_parser_rejects_bad_mod_order() {
        assert!(command_line_parser()
            .try_get_matches_from([crate_name!(), "-m", "8"])
            .is_err());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_all_sim_params() {
        let matches = command_line_parser().get_matches_from(command_line_for_test());
        let all_params = all_sim_params(&matches).unwrap();
        let all_eb_over_n0_db = [-2.0, -1.5, -1.0, -0.5];
        assert_eq!(all_params.len(), 4);
        for (index, &params) in all_params.iter().enumerate() {
            assert_eq!(params.modulation, Modulation::Qam16);
            assert!(params.coded);
            assert_eq!(params.eb_over_n0_db, all_eb_over_n0_db[index]);
            assert_eq!(params.num_bits, 50000);
            assert_eq!(params.seed, Some(17 + index as u64));
        }
    }

    #[test]
    fn test_all_sim_params_defaults() {
        let matches = command_line_parser().get_matches_from([crate_name!()]);
        let all_params = all_sim_params(&matches).unwrap();
        assert_eq!(all_params.len(), 11);
        assert_eq!(all_params[0].modulation, Modulation::Qpsk);
        assert!(!all_params[0].coded);
        assert_eq!(all_params[0].seed, None);
    }
}
