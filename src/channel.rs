//! AWGN channel simulation
//!
//! Adds circularly symmetric white Gaussian noise to complex symbols. The
//! caller owns the random number generator, and with it the reproducibility
//! of the noise sequence.

use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;

/// Adds white Gaussian noise for the given linear `Es/N0` to each symbol.
///
/// With unit symbol energy, `N0 = 1 / es_over_n0` and each complex component
/// receives independent `N(0, N0 / 2)` noise.
pub fn add_awgn<R: Rng>(symbols: &mut [Complex64], es_over_n0: f64, rng: &mut R) {
    let sigma = (0.5 / es_over_n0).sqrt();
    for symbol in symbols.iter_mut() {
        let re: f64 = rng.sample(StandardNormal);
        let im: f64 = rng.sample(StandardNormal);
        *symbol += Complex64::new(sigma * re, sigma * im);
    }
}

/// Returns the all-ones pilot sequence used for SNR estimation.
#[must_use]
pub fn pilot_symbols(num_pilots: usize) -> Vec<Complex64> {
    vec![Complex64::new(1.0, 0.0); num_pilots]
}
