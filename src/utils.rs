//! Collection of useful functions for the simulation drivers
//!
//! # Examples
//!
//! ```
//! use linksim::utils;
//!
//! let mut rng = rand::thread_rng();
//! let bits = utils::random_bits(40, &mut rng);
//! let err_count = utils::error_count(&bits, &bits);
//! assert_eq!(err_count, 0);
//! ```

use crate::Bit;
use rand::Rng;

/// Returns given number of random bits.
///
/// # Parameters
///
/// - `num_bits`: Number of random bits to be generated.
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bits`: Random bits.
pub fn random_bits<R: Rng>(num_bits: usize, rng: &mut R) -> Vec<Bit> {
    (0 .. num_bits)
        .map(|_| Bit::from_bool(rng.gen_bool(0.5)))
        .collect()
}

/// Returns number of errors in a sequence with respect to a reference sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared.
///
/// # Returns
///
/// - `err_count`: Number of positions in which the two sequences differ. If they are of different
///   lengths, then the longer sequence is effectively truncated to the length of the shorter one.
pub fn error_count<T: PartialEq>(seq: &[T], ref_seq: &[T]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count()
}

/// Converts a decibel value to linear scale.
#[must_use]
pub fn db_to_linear(db_value: f64) -> f64 {
    10f64.powf(0.1 * db_value)
}

/// Converts a linear value to decibels.
#[must_use]
pub fn linear_to_db(linear_value: f64) -> f64 {
    10.0 * linear_value.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use Bit::{One, Zero};

    #[test]
    fn test_random_bits() {
        let mut rng = rand::thread_rng();
        assert!(random_bits(0, &mut rng).is_empty());
        let num_bits = 10000;
        let bits = random_bits(num_bits, &mut rng);
        let num_zeros = bits.iter().filter(|&b| *b == Zero).count();
        let num_ones = bits.iter().filter(|&b| *b == One).count();
        assert!(num_zeros > 9 * num_bits / 20 && num_ones > 9 * num_bits / 20);
    }

    #[test]
    fn test_error_count() {
        assert_eq!(error_count(&[], &[One, Zero]), 0);
        assert_eq!(error_count(&[One, Zero], &[]), 0);
        // Longer `seq`
        let ref_seq = [One, Zero, Zero, One, One, One, Zero, Zero];
        let seq = [One, One, Zero, Zero, One, One, Zero, Zero, Zero, One];
        assert_eq!(error_count(&seq, &ref_seq), 2);
        // Shorter `seq`
        let ref_seq = [One, Zero, Zero, One, One, One, Zero, Zero, Zero, One];
        let seq = [One, One, Zero, Zero, One, One, Zero, Zero];
        assert_eq!(error_count(&seq, &ref_seq), 2);
    }

    #[test]
    fn test_db_to_linear() {
        assert_float_eq!(db_to_linear(0.0), 1.0, abs <= 1e-12);
        assert_float_eq!(db_to_linear(10.0), 10.0, abs <= 1e-12);
        assert_float_eq!(db_to_linear(-3.0), 0.501_187_233_627_272_2, abs <= 1e-12);
    }

    #[test]
    fn test_linear_to_db() {
        assert_float_eq!(linear_to_db(1.0), 0.0, abs <= 1e-12);
        assert_float_eq!(linear_to_db(100.0), 20.0, abs <= 1e-12);
        for db_value in [-7.0, 0.0, 13.0] {
            assert_float_eq!(linear_to_db(db_to_linear(db_value)), db_value, abs <= 1e-9);
        }
    }
}
