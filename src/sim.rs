//! BER simulation drivers and SNR estimation
//!
//! The library twins [`uncoded_ber`], [`coded_ber`], and
//! [`pilot_snr_estimate`] are generic over the random number generator and
//! report failures through [`Error`]. The procedural surface
//! ([`compute_ber`], [`compute_ber_seeded`], [`compute_ber_coded`],
//! [`estimate_snr`]) wraps them behind numeric sentinels: `-1.0` for any
//! invalid BER-driver input, `0.0` for a run left with nothing to transmit,
//! and `-999.0` for an invalid SNR-estimation input. No error value crosses
//! that boundary any other way.
//!
//! [`SimParams`] and [`SimResults`] describe one point of a BER-versus-SNR
//! sweep; [`run_sims`] runs a whole sweep and saves the results to a JSON
//! file.
//!
//! # Examples
//!
//! ```
//! use linksim::sim::{self, SimParams};
//! use linksim::Modulation;
//!
//! let params = SimParams {
//!     modulation: Modulation::Qpsk,
//!     coded: true,
//!     eb_over_n0_db: 4.0,
//!     num_bits: 20_000,
//!     seed: Some(7),
//! };
//! let results = sim::run_sim(&params)?;
//! assert!((0.0 ..= 1.0).contains(&results.ber));
//! # Ok::<(), linksim::Error>(())
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;

use crate::{channel, conv, llr, modem, theory, utils, Error, Modulation};

/// Code rate of the convolutional code on the coded path
const CODE_RATE: f64 = 0.5;

/// Accepted Eb/N0 range (dB) for the simulation drivers
const SNR_MIN_DB: f64 = -50.0;
/// Upper end of the accepted Eb/N0 range (dB)
const SNR_MAX_DB: f64 = 50.0;

/// Cap on uncoded bits per run, to bound memory use
const MAX_UNCODED_BITS: u64 = 100_000_000;

/// Cap on coded bits per run, to bound the decoder grids
const MAX_CODED_BITS: u64 = 200_000_000;

/// Cap on the pilot count for SNR estimation
const MAX_PILOTS: u64 = 1_000_000;

/// Sentinel returned by the BER drivers on invalid input
pub const BER_INVALID: f64 = -1.0;

/// Sentinel returned by the SNR estimator on invalid input
pub const SNR_INVALID: f64 = -999.0;

/// Checks that an Eb/N0 value lies in the accepted range.
fn check_snr_db(eb_over_n0_db: f64) -> Result<(), Error> {
    if (SNR_MIN_DB ..= SNR_MAX_DB).contains(&eb_over_n0_db) {
        Ok(())
    } else {
        Err(Error::InvalidRange(format!(
            "Eb/N0 of {eb_over_n0_db} dB is outside [{SNR_MIN_DB}, {SNR_MAX_DB}]",
        )))
    }
}

/// Simulates uncoded transmission over AWGN and returns the bit error rate.
///
/// `num_bits` is rounded down to a whole number of symbols. Random bits are
/// modulated, sent through the channel at `Es/N0 = k * Eb/N0`, hard-decision
/// demodulated, and compared against the transmitted sequence.
///
/// Returns `Ok(0.0)` when the rounding leaves nothing to transmit.
///
/// # Errors
///
/// Returns an error if `eb_over_n0_db` is outside `[-50, 50]` or `num_bits`
/// exceeds the 10^8 safety cap.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn uncoded_ber<R: Rng>(
    modulation: Modulation,
    eb_over_n0_db: f64,
    num_bits: u64,
    rng: &mut R,
) -> Result<f64, Error> {
    check_snr_db(eb_over_n0_db)?;
    let bits_per_symbol = modulation.bits_per_symbol() as u64;
    let num_bits = num_bits - num_bits % bits_per_symbol;
    if num_bits == 0 {
        return Ok(0.0);
    }
    if num_bits > MAX_UNCODED_BITS {
        return Err(Error::InvalidInput(format!(
            "{num_bits} bits exceeds the per-run cap of {MAX_UNCODED_BITS}",
        )));
    }
    let bits = utils::random_bits(num_bits as usize, rng);
    let mut symbols = modem::modulate(&bits, modulation)?;
    let es_over_n0 = bits_per_symbol as f64 * utils::db_to_linear(eb_over_n0_db);
    channel::add_awgn(&mut symbols, es_over_n0, rng);
    let bits_hat = modem::demodulate(&symbols, modulation);
    Ok(utils::error_count(&bits_hat, &bits) as f64 / num_bits as f64)
}

/// Simulates convolutionally coded transmission and returns the information
/// bit error rate.
///
/// Random information bits are encoded at rate 1/2, modulated, sent through
/// the channel at `Es/N0 = R * k * Eb/N0`, soft demodulated to LLR values,
/// and Viterbi decoded. For 16-QAM an odd `num_info_bits` is reduced by one
/// so the coded sequence fills whole symbols.
///
/// Returns `Ok(0.0)` when the adjustment leaves nothing to transmit.
///
/// # Errors
///
/// Returns an error if `eb_over_n0_db` is outside `[-50, 50]` or the coded
/// length `2 * (num_info_bits + 6)` exceeds the 2 * 10^8 safety cap.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn coded_ber<R: Rng>(
    modulation: Modulation,
    eb_over_n0_db: f64,
    num_info_bits: u64,
    rng: &mut R,
) -> Result<f64, Error> {
    check_snr_db(eb_over_n0_db)?;
    let mut num_info_bits = num_info_bits;
    if modulation == Modulation::Qam16 && num_info_bits % 2 != 0 {
        // 2 * (L + 6) must be a multiple of 4 to fill whole symbols.
        num_info_bits -= 1;
    }
    if num_info_bits == 0 {
        return Ok(0.0);
    }
    let coded_len = 2 * (num_info_bits + conv::MEMORY_LENGTH as u64);
    if coded_len > MAX_CODED_BITS {
        return Err(Error::InvalidInput(format!(
            "{coded_len} coded bits exceeds the per-run cap of {MAX_CODED_BITS}",
        )));
    }
    let info_bits = utils::random_bits(num_info_bits as usize, rng);
    let coded_bits = conv::convolutional_encode(&info_bits)?;
    let mut symbols = modem::modulate(&coded_bits, modulation)?;
    let es_over_n0 =
        CODE_RATE * modulation.bits_per_symbol() as f64 * utils::db_to_linear(eb_over_n0_db);
    channel::add_awgn(&mut symbols, es_over_n0, rng);
    let code_bits_llr = llr::soft_demodulate(&symbols, modulation, 1.0 / es_over_n0);
    let info_bits_hat = conv::viterbi_decode(&code_bits_llr)?;
    let err_count = utils::error_count(&info_bits_hat, &info_bits);
    Ok(err_count as f64 / num_info_bits as f64)
}

/// Estimates the channel SNR from known all-ones pilot symbols.
///
/// Transmits `num_pilots` pilots at `Es/N0 = Eb/N0` (one bit per pilot),
/// measures the mean squared deviation from the transmitted value, and
/// returns `10 * log10(1 / variance)`.
///
/// # Errors
///
/// Returns an error if `true_snr_db` is outside `[-50, 50]` or `num_pilots`
/// is not in `[1, 10^6]`.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn pilot_snr_estimate<R: Rng>(
    true_snr_db: f64,
    num_pilots: u64,
    rng: &mut R,
) -> Result<f64, Error> {
    if !(SNR_MIN_DB ..= SNR_MAX_DB).contains(&true_snr_db) {
        return Err(Error::InvalidRange(format!(
            "True SNR of {true_snr_db} dB is outside [{SNR_MIN_DB}, {SNR_MAX_DB}]",
        )));
    }
    if num_pilots == 0 || num_pilots > MAX_PILOTS {
        return Err(Error::InvalidRange(format!(
            "Pilot count {num_pilots} is outside [1, {MAX_PILOTS}]",
        )));
    }
    let tx_pilots = channel::pilot_symbols(num_pilots as usize);
    let mut rx_pilots = tx_pilots.clone();
    let es_over_n0 = utils::db_to_linear(true_snr_db);
    channel::add_awgn(&mut rx_pilots, es_over_n0, rng);
    let noise_var = rx_pilots
        .iter()
        .zip(tx_pilots.iter())
        .map(|(rx, tx)| (rx - tx).norm_sqr())
        .sum::<f64>()
        / num_pilots as f64;
    Ok(utils::linear_to_db(1.0 / noise_var))
}

/// Returns the uncoded BER for the given modulation order, Eb/N0 (dB), and
/// bit count, using a fresh entropy seed.
///
/// Returns `-1.0` if the order is not 2, 4, or 16, if the SNR is outside
/// `[-50, 50]` dB, or if the bit count exceeds 10^8; returns `0.0` when the
/// bit count rounds down to zero symbols.
#[must_use]
pub fn compute_ber(mod_order: u32, eb_over_n0_db: f64, num_bits: u64) -> f64 {
    let mut rng = StdRng::from_entropy();
    Modulation::from_order(mod_order)
        .and_then(|modulation| uncoded_ber(modulation, eb_over_n0_db, num_bits, &mut rng))
        .unwrap_or(BER_INVALID)
}

/// Returns the uncoded BER like [`compute_ber`], reproducibly for a fixed
/// seed.
#[must_use]
pub fn compute_ber_seeded(mod_order: u32, eb_over_n0_db: f64, num_bits: u64, seed: u64) -> f64 {
    let mut rng = StdRng::seed_from_u64(seed);
    Modulation::from_order(mod_order)
        .and_then(|modulation| uncoded_ber(modulation, eb_over_n0_db, num_bits, &mut rng))
        .unwrap_or(BER_INVALID)
}

/// Returns the coded information BER for the given modulation order, Eb/N0
/// (dB), information bit count, and seed.
///
/// Sentinels match [`compute_ber`]: `-1.0` for any invalid input, `0.0` when
/// the adjusted information bit count is zero.
#[must_use]
pub fn compute_ber_coded(
    mod_order: u32,
    eb_over_n0_db: f64,
    num_info_bits: u64,
    seed: u64,
) -> f64 {
    let mut rng = StdRng::seed_from_u64(seed);
    Modulation::from_order(mod_order)
        .and_then(|modulation| coded_ber(modulation, eb_over_n0_db, num_info_bits, &mut rng))
        .unwrap_or(BER_INVALID)
}

/// Estimates the channel SNR from `num_pilots` all-ones pilots transmitted at
/// `true_snr_db`, using a fresh entropy seed.
///
/// Returns `-999.0` if the SNR is outside `[-50, 50]` dB or the pilot count
/// is not in `[1, 10^6]`.
#[must_use]
pub fn estimate_snr(true_snr_db: f64, num_pilots: u64) -> f64 {
    let mut rng = StdRng::from_entropy();
    pilot_snr_estimate(true_snr_db, num_pilots, &mut rng).unwrap_or(SNR_INVALID)
}

/// Parameters for one point of a BER-versus-SNR simulation
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimParams {
    /// Modulation scheme
    pub modulation: Modulation,
    /// Whether the convolutional code is applied
    pub coded: bool,
    /// Ratio (dB) of energy per information bit to noise spectral density
    pub eb_over_n0_db: f64,
    /// Number of information bits to transmit
    pub num_bits: u64,
    /// Seed for the run; a fresh entropy seed is drawn when absent
    pub seed: Option<u64>,
}

impl SimParams {
    /// Checks validity of simulation parameters.
    fn check(&self) -> Result<(), Error> {
        check_snr_db(self.eb_over_n0_db)?;
        if self.num_bits == 0 {
            return Err(Error::InvalidInput(
                "Number of bits cannot be zero".to_string(),
            ));
        }
        let cap = if self.coded {
            MAX_CODED_BITS / 2 - conv::MEMORY_LENGTH as u64
        } else {
            MAX_UNCODED_BITS
        };
        if self.num_bits > cap {
            return Err(Error::InvalidInput(format!(
                "{} bits exceeds the per-run cap of {cap}",
                self.num_bits,
            )));
        }
        Ok(())
    }

    /// Prints simulation parameters.
    fn print(&self) {
        eprintln!();
        eprintln!(
            "{}, {}",
            self.modulation,
            if self.coded {
                "rate-1/2 convolutional code"
            } else {
                "uncoded"
            }
        );
        eprintln!("Eb/N0 of {} dB", self.eb_over_n0_db);
        eprintln!("{} information bits", self.num_bits);
        match self.seed {
            Some(seed) => eprintln!("Seed {seed}"),
            None => eprintln!("Entropy-seeded"),
        }
    }
}

/// Results from one point of a BER-versus-SNR simulation
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimResults {
    /// Simulation parameters
    pub params: SimParams,
    /// Measured bit error rate
    pub ber: f64,
    /// Closed-form uncoded reference for the same modulation and Eb/N0
    pub theoretical_ber: f64,
}

impl SimResults {
    /// Prints a one-line summary of the results.
    fn print(&self) {
        eprintln!(
            "{} Eb/N0 = {:6.2} dB: BER = {:9.4e} (uncoded theory {:9.4e})",
            self.params.modulation, self.params.eb_over_n0_db, self.ber, self.theoretical_ber,
        );
    }
}

/// Runs the simulation described by the given parameters.
///
/// # Errors
///
/// Returns an error if the parameters fail validation.
pub fn run_sim(params: &SimParams) -> Result<SimResults, Error> {
    params.check()?;
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ber = if params.coded {
        coded_ber(
            params.modulation,
            params.eb_over_n0_db,
            params.num_bits,
            &mut rng,
        )?
    } else {
        uncoded_ber(
            params.modulation,
            params.eb_over_n0_db,
            params.num_bits,
            &mut rng,
        )?
    };
    let theoretical_ber = match params.modulation {
        Modulation::Bpsk | Modulation::Qpsk => theory::ber_bpsk_qpsk(params.eb_over_n0_db),
        Modulation::Qam16 => theory::ber_qam16(params.eb_over_n0_db),
    };
    Ok(SimResults {
        params: *params,
        ber,
        theoretical_ber,
    })
}

/// Runs a sweep of simulations and saves all results to a JSON file.
///
/// Scenarios with invalid parameters are skipped with a warning, matching the
/// behaviour of a long overnight sweep that should not die on one bad point.
///
/// # Errors
///
/// Returns an error if creating or writing to the JSON file fails.
pub fn run_sims(all_params: &[SimParams], json_filename: &str) -> Result<(), Error> {
    let mut all_results = Vec::with_capacity(all_params.len());
    for params in all_params {
        params.print();
        if let Ok(results) = run_sim(params) {
            results.print();
            all_results.push(results);
        } else {
            eprintln!("WARNING: Invalid simulation parameters");
        }
    }
    save_all_results_to_file(&all_results, json_filename)?;
    Ok(())
}

/// Saves all simulation results to a JSON file.
///
/// # Errors
///
/// Returns an error if creating or writing to the JSON file fails.
pub fn save_all_results_to_file(
    all_results: &[SimResults],
    json_filename: &str,
) -> Result<(), Error> {
    let writer = BufWriter::new(File::create(json_filename)?);
    serde_json::to_writer_pretty(writer, all_results)?;
    Ok(())
}

/// Returns all simulation results from a JSON file.
///
/// # Errors
///
/// Returns an error if opening or reading from the JSON file fails.
pub fn all_results_from_file(json_filename: &str) -> Result<Vec<SimResults>, Error> {
    let reader = BufReader::new(File::open(json_filename)?);
    let all_results = serde_json::from_reader(reader)?;
    Ok(all_results)
}
