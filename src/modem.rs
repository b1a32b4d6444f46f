//! Modulation and hard-decision demodulation
//!
//! Maps bit sequences to Gray-labelled BPSK, QPSK, or 16-QAM symbols with
//! unit average symbol energy, and back. Over a noiseless channel,
//! [`demodulate`] exactly inverts [`modulate`] for every supported scheme.
//!
//! # Examples
//!
//! ```
//! use linksim::modem::{demodulate, modulate};
//! use linksim::{Bit, Modulation};
//! use Bit::{One, Zero};
//!
//! let bits = [Zero, Zero, One, One];
//! let symbols = modulate(&bits, Modulation::Qpsk)?;
//! assert_eq!(demodulate(&symbols, Modulation::Qpsk), bits);
//! # Ok::<(), linksim::Error>(())
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::{Bit, Error};

/// Per-component scaling for QPSK (`1/sqrt(2)`, so that `Es = 1`)
pub(crate) const QPSK_SCALE: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Per-component scaling for 16-QAM (`1/sqrt(10)`, so that `Es = 1`)
pub(crate) const QAM16_SCALE: f64 = 0.316_227_766_016_837_94;

/// Gray-labelled 4-PAM amplitude levels, indexed by `(msb << 1) | lsb`.
///
/// Stored in bit-pair index order, not amplitude order: the Gray labelling
/// puts -3 at index `0b10` and -1 at index `0b11`, so that adjacent
/// amplitudes (+3, +1, -1, -3) differ in exactly one bit. Sorting this table
/// by amplitude would destroy that property.
pub(crate) const QAM16_LEVELS: [f64; 4] = [3.0, 1.0, -3.0, -1.0];

/// Enumeration of supported modulation schemes
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum Modulation {
    /// Binary phase-shift keying, 1 bit per symbol
    Bpsk,
    /// Quadrature phase-shift keying, 2 bits per symbol
    Qpsk,
    /// Gray-labelled 16-ary quadrature amplitude modulation, 4 bits per symbol
    Qam16,
}

impl Modulation {
    /// Returns the modulation scheme of the given order.
    ///
    /// # Errors
    ///
    /// Returns an error unless `order` is `2`, `4`, or `16`.
    pub fn from_order(order: u32) -> Result<Self, Error> {
        match order {
            2 => Ok(Modulation::Bpsk),
            4 => Ok(Modulation::Qpsk),
            16 => Ok(Modulation::Qam16),
            _ => Err(Error::InvalidModulation(order)),
        }
    }

    /// Returns the modulation order.
    #[must_use]
    pub fn order(self) -> u32 {
        match self {
            Modulation::Bpsk => 2,
            Modulation::Qpsk => 4,
            Modulation::Qam16 => 16,
        }
    }

    /// Returns the number of bits carried by each symbol.
    #[must_use]
    pub fn bits_per_symbol(self) -> usize {
        match self {
            Modulation::Bpsk => 1,
            Modulation::Qpsk => 2,
            Modulation::Qam16 => 4,
        }
    }
}

impl std::fmt::Display for Modulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modulation::Bpsk => write!(f, "BPSK"),
            Modulation::Qpsk => write!(f, "QPSK"),
            Modulation::Qam16 => write!(f, "16-QAM"),
        }
    }
}

/// Returns the BPSK amplitude of a single bit (`Zero` maps to `+1`).
fn bpsk_amplitude(bit: Bit) -> f64 {
    match bit {
        Bit::Zero => 1.0,
        Bit::One => -1.0,
    }
}

/// Returns the 4-PAM amplitude for a Gray bit pair.
pub(crate) fn gray_level(msb: Bit, lsb: Bit) -> f64 {
    QAM16_LEVELS[((msb as usize) << 1) | (lsb as usize)]
}

/// Quantises a received component to the nearest 4-PAM amplitude.
fn nearest_level(value: f64) -> f64 {
    if value > 2.0 {
        3.0
    } else if value > 0.0 {
        1.0
    } else if value > -2.0 {
        -1.0
    } else {
        -3.0
    }
}

/// Returns the Gray bit pair `(msb, lsb)` labelling a 4-PAM amplitude.
#[allow(clippy::cast_possible_truncation)]
fn level_bits(level: f64) -> (Bit, Bit) {
    match level as i32 {
        3 => (Bit::Zero, Bit::Zero),
        1 => (Bit::Zero, Bit::One),
        -1 => (Bit::One, Bit::One),
        _ => (Bit::One, Bit::Zero),
    }
}

/// Maps a bit sequence to complex channel symbols.
///
/// Bits are consumed in groups of `modulation.bits_per_symbol()`; a trailing
/// partial group is discarded. For 16-QAM the in-phase component carries bits
/// `(b0, b2)` of each group and the quadrature component bits `(b1, b3)`,
/// with `b0`/`b1` the most significant bits of their Gray pairs. The soft
/// demodulator emits LLR values in this same bit order.
///
/// # Errors
///
/// Returns an error if fewer bits than one symbol's worth are supplied.
pub fn modulate(bits: &[Bit], modulation: Modulation) -> Result<Vec<Complex64>, Error> {
    let bits_per_symbol = modulation.bits_per_symbol();
    if bits.len() < bits_per_symbol {
        return Err(Error::InvalidInput(format!(
            "{modulation} maps {bits_per_symbol} bits per symbol (found only {})",
            bits.len()
        )));
    }
    let symbols = match modulation {
        Modulation::Bpsk => bits
            .iter()
            .map(|&b| Complex64::new(bpsk_amplitude(b), 0.0))
            .collect(),
        Modulation::Qpsk => bits
            .chunks_exact(2)
            .map(|pair| {
                Complex64::new(bpsk_amplitude(pair[0]), bpsk_amplitude(pair[1])) * QPSK_SCALE
            })
            .collect(),
        Modulation::Qam16 => bits
            .chunks_exact(4)
            .map(|quad| {
                Complex64::new(gray_level(quad[0], quad[2]), gray_level(quad[1], quad[3]))
                    * QAM16_SCALE
            })
            .collect(),
    };
    Ok(symbols)
}

/// Recovers a hard-decision bit sequence from channel symbols.
///
/// The output has `symbols.len() * modulation.bits_per_symbol()` bits and
/// exactly inverts [`modulate`] over a noiseless channel.
#[must_use]
pub fn demodulate(symbols: &[Complex64], modulation: Modulation) -> Vec<Bit> {
    let mut bits = Vec::with_capacity(symbols.len() * modulation.bits_per_symbol());
    match modulation {
        Modulation::Bpsk => {
            for y in symbols {
                bits.push(Bit::from_bool(y.re < 0.0));
            }
        }
        Modulation::Qpsk => {
            for y in symbols {
                let z = *y / QPSK_SCALE;
                bits.push(Bit::from_bool(z.re < 0.0));
                bits.push(Bit::from_bool(z.im < 0.0));
            }
        }
        Modulation::Qam16 => {
            for y in symbols {
                let z = *y / QAM16_SCALE;
                let (i_msb, i_lsb) = level_bits(nearest_level(z.re));
                let (q_msb, q_lsb) = level_bits(nearest_level(z.im));
                bits.push(i_msb);
                bits.push(q_msb);
                bits.push(i_lsb);
                bits.push(q_lsb);
            }
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use float_eq::assert_float_eq;
    use Bit::{One, Zero};

    #[test]
    fn test_from_order() {
        assert_eq!(Modulation::from_order(2).unwrap(), Modulation::Bpsk);
        assert_eq!(Modulation::from_order(4).unwrap(), Modulation::Qpsk);
        assert_eq!(Modulation::from_order(16).unwrap(), Modulation::Qam16);
        assert!(Modulation::from_order(0).is_err());
        assert!(Modulation::from_order(3).is_err());
        assert!(Modulation::from_order(64).is_err());
    }

    #[test]
    fn test_order_and_bits_per_symbol() {
        for modulation in [Modulation::Bpsk, Modulation::Qpsk, Modulation::Qam16] {
            assert_eq!(
                1 << modulation.bits_per_symbol(),
                modulation.order() as usize
            );
        }
    }

    #[test]
    fn test_gray_adjacency() {
        // Walking the amplitudes in order (+3, +1, -1, -3) must flip exactly
        // one bit per step.
        let amplitude_order = [3.0, 1.0, -1.0, -3.0];
        for window in amplitude_order.windows(2) {
            let (msb0, lsb0) = level_bits(window[0]);
            let (msb1, lsb1) = level_bits(window[1]);
            let flips = usize::from(msb0 != msb1) + usize::from(lsb0 != lsb1);
            assert_eq!(flips, 1);
        }
    }

    #[test]
    fn test_gray_level_roundtrip() {
        for msb in [Zero, One] {
            for lsb in [Zero, One] {
                assert_eq!(level_bits(gray_level(msb, lsb)), (msb, lsb));
            }
        }
    }

    #[test]
    fn test_nearest_level_thresholds() {
        assert_float_eq!(nearest_level(2.1), 3.0, abs <= 1e-12);
        assert_float_eq!(nearest_level(2.0), 1.0, abs <= 1e-12);
        assert_float_eq!(nearest_level(0.1), 1.0, abs <= 1e-12);
        assert_float_eq!(nearest_level(0.0), -1.0, abs <= 1e-12);
        assert_float_eq!(nearest_level(-2.0), -1.0, abs <= 1e-12);
        assert_float_eq!(nearest_level(-2.1), -3.0, abs <= 1e-12);
    }

    #[test]
    fn test_modulate_bpsk() {
        let symbols = modulate(&[Zero, One], Modulation::Bpsk).unwrap();
        assert_eq!(symbols.len(), 2);
        assert_float_eq!(symbols[0].re, 1.0, abs <= 1e-12);
        assert_float_eq!(symbols[0].im, 0.0, abs <= 1e-12);
        assert_float_eq!(symbols[1].re, -1.0, abs <= 1e-12);
        assert_float_eq!(symbols[1].im, 0.0, abs <= 1e-12);
    }

    #[test]
    fn test_modulate_qpsk() {
        let symbols = modulate(&[Zero, Zero, One, One], Modulation::Qpsk).unwrap();
        assert_eq!(symbols.len(), 2);
        assert_float_eq!(symbols[0].re, QPSK_SCALE, abs <= 1e-12);
        assert_float_eq!(symbols[0].im, QPSK_SCALE, abs <= 1e-12);
        assert_float_eq!(symbols[1].re, -QPSK_SCALE, abs <= 1e-12);
        assert_float_eq!(symbols[1].im, -QPSK_SCALE, abs <= 1e-12);
    }

    #[test]
    fn test_modulate_qam16() {
        let symbols = modulate(&[Zero, Zero, Zero, Zero], Modulation::Qam16).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_float_eq!(symbols[0].re, 3.0 * QAM16_SCALE, abs <= 1e-12);
        assert_float_eq!(symbols[0].im, 3.0 * QAM16_SCALE, abs <= 1e-12);
        // (b0, b2) = (1, 0) puts the in-phase component at -3.
        let symbols = modulate(&[One, Zero, Zero, One], Modulation::Qam16).unwrap();
        assert_float_eq!(symbols[0].re, -3.0 * QAM16_SCALE, abs <= 1e-12);
        assert_float_eq!(symbols[0].im, QAM16_SCALE, abs <= 1e-12);
    }

    #[test]
    fn test_modulate_unit_symbol_energy() {
        let mut rng = rand::thread_rng();
        for modulation in [Modulation::Bpsk, Modulation::Qpsk, Modulation::Qam16] {
            let bits = utils::random_bits(4000 * modulation.bits_per_symbol(), &mut rng);
            let symbols = modulate(&bits, modulation).unwrap();
            let mean_energy =
                symbols.iter().map(|s| s.norm_sqr()).sum::<f64>() / symbols.len() as f64;
            // BPSK and QPSK have Es = 1 exactly; 16-QAM on average.
            assert!((mean_energy - 1.0).abs() < 0.1);
        }
    }

    #[test]
    fn test_modulate_truncates_partial_group() {
        let symbols = modulate(&[Zero, One, One, Zero, One], Modulation::Qam16).unwrap();
        assert_eq!(symbols.len(), 1);
        let symbols = modulate(&[Zero, One, One], Modulation::Qpsk).unwrap();
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_modulate_insufficient_bits() {
        assert!(modulate(&[], Modulation::Bpsk).is_err());
        assert!(modulate(&[Zero], Modulation::Qpsk).is_err());
        assert!(modulate(&[Zero, One, One], Modulation::Qam16).is_err());
    }

    #[test]
    fn test_demodulate_identity_vectors() {
        let bits = [Zero, One];
        assert_eq!(
            demodulate(&modulate(&bits, Modulation::Bpsk).unwrap(), Modulation::Bpsk),
            bits
        );
        let bits = [Zero, Zero, One, One];
        assert_eq!(
            demodulate(&modulate(&bits, Modulation::Qpsk).unwrap(), Modulation::Qpsk),
            bits
        );
        let bits = [Zero, Zero, Zero, Zero];
        assert_eq!(
            demodulate(
                &modulate(&bits, Modulation::Qam16).unwrap(),
                Modulation::Qam16
            ),
            bits
        );
    }

    #[test]
    fn test_demodulate_identity_random() {
        let mut rng = rand::thread_rng();
        for modulation in [Modulation::Bpsk, Modulation::Qpsk, Modulation::Qam16] {
            let bits = utils::random_bits(240 * modulation.bits_per_symbol(), &mut rng);
            let symbols = modulate(&bits, modulation).unwrap();
            assert_eq!(demodulate(&symbols, modulation), bits);
        }
    }

    #[test]
    fn test_demodulate_empty() {
        assert!(demodulate(&[], Modulation::Qam16).is_empty());
    }
}
