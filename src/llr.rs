//! Soft demodulation to per-bit log-likelihood ratios
//!
//! The sign convention matches the Viterbi decoder in [`crate::conv`]: a
//! branch whose expected coded bit is `1` adds its LLR value to the path
//! metric, so the values emitted here are the negated textbook ratios
//! `log P(bit = 0 | y) - log P(bit = 1 | y)`. A positive LLR therefore means
//! the bit is more likely `1`.

use num_complex::Complex64;

use crate::modem::{Modulation, QAM16_LEVELS, QAM16_SCALE};

/// Computes an LLR value for every coded bit carried by the given symbols.
///
/// `n0` is the one-sided noise spectral density at the channel output; each
/// complex noise component has variance `n0 / 2`. The output has one value
/// per coded bit, in the order the modulator consumed them, which for 16-QAM
/// is `(msb_I, msb_Q, lsb_I, lsb_Q)` per symbol.
#[must_use]
pub fn soft_demodulate(symbols: &[Complex64], modulation: Modulation, n0: f64) -> Vec<f64> {
    let mut llrs = Vec::with_capacity(symbols.len() * modulation.bits_per_symbol());
    let scale = 2.0 / n0;
    match modulation {
        Modulation::Bpsk => {
            for y in symbols {
                llrs.push(-y.re * scale);
            }
        }
        Modulation::Qpsk => {
            for y in symbols {
                llrs.push(-y.re * scale);
                llrs.push(-y.im * scale);
            }
        }
        Modulation::Qam16 => {
            for y in symbols {
                let (i_msb, i_lsb) = pam_llrs(y.re / QAM16_SCALE, n0);
                let (q_msb, q_lsb) = pam_llrs(y.im / QAM16_SCALE, n0);
                llrs.push(i_msb);
                llrs.push(q_msb);
                llrs.push(i_lsb);
                llrs.push(q_lsb);
            }
        }
    }
    llrs
}

/// Returns the `(msb, lsb)` LLR values for one de-normalised 4-PAM component.
fn pam_llrs(value: f64, n0: f64) -> (f64, f64) {
    // Log-likelihood of each Gray-indexed amplitude level, up to a constant.
    let mut metric = [0.0; 4];
    for (m, &level) in metric.iter_mut().zip(QAM16_LEVELS.iter()) {
        let d = value - level;
        *m = -(d * d) / n0;
    }
    // Levels with msb = 0 sit at indices 0 and 1, msb = 1 at 2 and 3;
    // lsb = 0 at indices 0 and 2, lsb = 1 at 1 and 3.
    let msb = log_sum_exp2(metric[0], metric[1]) - log_sum_exp2(metric[2], metric[3]);
    let lsb = log_sum_exp2(metric[0], metric[2]) - log_sum_exp2(metric[1], metric[3]);
    (-msb, -lsb)
}

/// Returns `log(exp(a) + exp(b))` without overflowing for large magnitudes.
fn log_sum_exp2(a: f64, b: f64) -> f64 {
    a.max(b) + (-(a - b).abs()).exp().ln_1p()
}
