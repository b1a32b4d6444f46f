//! Closed-form error rates for validating simulated results
//!
//! Q-function-based expressions for the bit error rate of Gray-labelled
//! BPSK/QPSK and 16-QAM over AWGN. The simulation test suites compare
//! measured rates against these curves.

use crate::utils;

/// Gaussian tail probability `Q(x) = erfc(x / sqrt(2)) / 2`.
#[must_use]
pub fn qfunc(x: f64) -> f64 {
    0.5 * erfc(x / std::f64::consts::SQRT_2)
}

/// Theoretical BER of BPSK or Gray-labelled QPSK at the given Eb/N0 (dB).
#[must_use]
pub fn ber_bpsk_qpsk(eb_over_n0_db: f64) -> f64 {
    let eb_over_n0 = utils::db_to_linear(eb_over_n0_db);
    qfunc((2.0 * eb_over_n0).sqrt())
}

/// Theoretical BER of Gray-labelled 16-QAM at the given Eb/N0 (dB).
#[must_use]
pub fn ber_qam16(eb_over_n0_db: f64) -> f64 {
    let eb_over_n0 = utils::db_to_linear(eb_over_n0_db);
    let sqrt_term = (2.0 * eb_over_n0 / 5.0).sqrt();
    0.25 * (3.0 * qfunc(sqrt_term) + qfunc(3.0 * sqrt_term))
}

/// Asymptotic coding gain (dB) of the K=7, rate-1/2 convolutional code.
///
/// The code has free distance 10, giving `10 * log10(10 * 0.5)` or about
/// 7 dB with soft-decision decoding.
#[must_use]
pub fn coding_gain_db() -> f64 {
    7.0
}

/// Complementary error function (Abramowitz and Stegun 7.1.26).
fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736
                + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    poly * (-x * x).exp()
}
