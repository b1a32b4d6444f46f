//! # Link-level BER simulation over an AWGN channel
//!
//! This crate measures the bit error rate (BER) of a digital transmission
//! chain over an additive-white-Gaussian-noise channel. Three Gray-labelled
//! modulation schemes are supported — BPSK, QPSK, and 16-QAM — on two
//! transmission paths: an uncoded path, and a coded path that applies a
//! constraint-length-7, rate-1/2 convolutional code with soft-decision
//! Viterbi decoding. A separate entry point estimates the channel SNR from
//! known pilot symbols.
//!
//! The [`modem`], [`channel`], [`llr`], and [`conv`] modules expose the
//! pieces of the chain individually, while the [`sim`] module ties them into
//! BER drivers and a sweep runner that saves its results to a JSON file. The
//! [`theory`] module provides the closed-form curves the simulated rates are
//! validated against, and [`utils`] has some useful functions for such a
//! simulation.
//!
//! # Examples
//!
//! The full coded pipeline, one stage at a time:
//!
//! ```
//! use linksim::conv::{convolutional_encode, viterbi_decode};
//! use linksim::{channel, llr, modem, utils, Modulation};
//!
//! let mut rng = rand::thread_rng();
//! let info_bits = utils::random_bits(128, &mut rng);
//! let code_bits = convolutional_encode(&info_bits)?;
//! let mut symbols = modem::modulate(&code_bits, Modulation::Qpsk)?;
//! let es_over_n0 = 10.0; // linear, generous
//! channel::add_awgn(&mut symbols, es_over_n0, &mut rng);
//! let code_bits_llr = llr::soft_demodulate(&symbols, Modulation::Qpsk, 1.0 / es_over_n0);
//! let info_bits_hat = viterbi_decode(&code_bits_llr)?;
//! assert_eq!(info_bits_hat.len(), info_bits.len());
//! # Ok::<(), linksim::Error>(())
//! ```
//!
//! Or as a single driver call, reproducible for a fixed seed:
//!
//! ```
//! use linksim::compute_ber_coded;
//!
//! let ber = compute_ber_coded(4, 3.0, 10_000, 42);
//! assert!((0.0 ..= 1.0).contains(&ber));
//! ```

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

pub mod channel;
mod common;
pub mod conv;
pub mod llr;
pub mod modem;
pub mod sim;
pub mod theory;
pub mod utils;

pub use common::{Bit, Error};
pub use modem::Modulation;
pub use sim::{compute_ber, compute_ber_coded, compute_ber_seeded, estimate_snr};
