//! Rate-1/2 convolutional code with constraint length 7
//!
//! Encoder and soft-decision Viterbi decoder for the generator pair
//! `(133, 171)` octal. The encoder appends six zero tail bits so every
//! codeword terminates in the zero state, and the decoder exploits that by
//! starting its traceback there.
//!
//! The state-transition tables are built once per process on first use and
//! are read lock-free afterwards.
//!
//! # Examples
//!
//! ```
//! use linksim::conv::{convolutional_encode, viterbi_decode};
//! use linksim::Bit;
//! use Bit::{One, Zero};
//!
//! let info_bits = [One, Zero, One, One];
//! let coded_bits = convolutional_encode(&info_bits)?;
//! assert_eq!(coded_bits.len(), 2 * (info_bits.len() + 6));
//!
//! // Ideal LLRs: +10 for a coded 1, -10 for a coded 0.
//! let llrs: Vec<f64> = coded_bits
//!     .iter()
//!     .map(|b| if b.is_one() { 10.0 } else { -10.0 })
//!     .collect();
//! assert_eq!(viterbi_decode(&llrs)?, info_bits);
//! # Ok::<(), linksim::Error>(())
//! ```

use std::sync::OnceLock;

use crate::{Bit, Error};

/// Constraint length of the code
pub const CONSTRAINT_LENGTH: usize = 7;

/// Number of encoder memory bits, and of tail bits appended per codeword
pub const MEMORY_LENGTH: usize = CONSTRAINT_LENGTH - 1;

/// Number of trellis states
pub const NUM_STATES: usize = 1 << MEMORY_LENGTH;

/// Generator polynomial `133` octal (first output bit of each pair)
const G1: usize = 0o133;

/// Generator polynomial `171` octal (second output bit of each pair)
const G2: usize = 0o171;

/// Log-domain stand-in for an unreachable path metric
const NEG_INF: f64 = -1e30;

/// Transitions out of and into one trellis state
#[derive(Clone, Copy, Debug, Default)]
struct StateTransitions {
    /// Next state for input 0 and 1
    next_state: [u8; 2],
    /// Coded bit pair `(g1_parity << 1) | g2_parity` for input 0 and 1
    output: [u8; 2],
    /// The two states with an edge into this state, in enumeration order
    prev_state: [u8; 2],
    /// Input bit labelling the edge from each predecessor
    prev_input: [u8; 2],
}

/// State-transition tables for the code trellis
#[derive(Debug)]
struct Trellis {
    states: [StateTransitions; NUM_STATES],
}

impl Trellis {
    /// Builds the forward transition tables and inverts them for traceback.
    #[allow(clippy::cast_possible_truncation)]
    fn build() -> Self {
        let mut states = [StateTransitions::default(); NUM_STATES];
        for (state, entry) in states.iter_mut().enumerate() {
            for input in 0 .. 2 {
                // Shift register holds [input, state bits], newest on the left.
                let shift_reg = (input << MEMORY_LENGTH) | state;
                let out1 = parity(shift_reg & G1);
                let out2 = parity(shift_reg & G2);
                entry.output[input] = ((out1 << 1) | out2) as u8;
                entry.next_state[input] = (shift_reg >> 1) as u8;
            }
        }
        // Every state has exactly two predecessors; record them in the order
        // the forward scan finds them, since the decoder's tie-break keeps the
        // earlier-enumerated one.
        let forward = states;
        for (state, entry) in states.iter_mut().enumerate() {
            let mut count = 0;
            for (prev, prev_entry) in forward.iter().enumerate() {
                for input in 0 .. 2 {
                    if count < 2 && usize::from(prev_entry.next_state[input]) == state {
                        entry.prev_state[count] = prev as u8;
                        entry.prev_input[count] = input as u8;
                        count += 1;
                    }
                }
            }
        }
        Trellis { states }
    }

    /// Returns the process-wide trellis, building it on first use.
    fn get() -> &'static Trellis {
        static TRELLIS: OnceLock<Trellis> = OnceLock::new();
        TRELLIS.get_or_init(Trellis::build)
    }
}

/// Returns the GF(2) sum of the bits of the given integer.
fn parity(value: usize) -> usize {
    (value.count_ones() & 1) as usize
}

/// Emits the coded bit pair for one encoder step and returns the next state.
fn encode_step(trellis: &Trellis, state: usize, input: usize, coded_bits: &mut Vec<Bit>) -> usize {
    let entry = &trellis.states[state];
    let output = entry.output[input];
    coded_bits.push(Bit::from_bool(output & 0b10 != 0));
    coded_bits.push(Bit::from_bool(output & 0b01 != 0));
    usize::from(entry.next_state[input])
}

/// Encodes information bits at rate 1/2, terminating the trellis.
///
/// Each input bit emits two coded bits, the G1 parity followed by the G2
/// parity; six zero tail steps then drive the encoder back to the zero state,
/// for an output length of `2 * (info_bits.len() + 6)`.
///
/// # Errors
///
/// Returns an error if `info_bits` is empty.
pub fn convolutional_encode(info_bits: &[Bit]) -> Result<Vec<Bit>, Error> {
    if info_bits.is_empty() {
        return Err(Error::InvalidInput(
            "Cannot encode an empty information sequence".to_string(),
        ));
    }
    let trellis = Trellis::get();
    let mut coded_bits = Vec::with_capacity(2 * (info_bits.len() + MEMORY_LENGTH));
    let mut state = 0;
    for &bit in info_bits {
        state = encode_step(trellis, state, bit as usize, &mut coded_bits);
    }
    for _ in 0 .. MEMORY_LENGTH {
        state = encode_step(trellis, state, 0, &mut coded_bits);
    }
    debug_assert_eq!(state, 0);
    Ok(coded_bits)
}

/// Decodes a coded-bit LLR sequence with the soft-decision Viterbi algorithm.
///
/// LLR values follow the convention of [`crate::llr::soft_demodulate`]: a
/// branch whose expected coded bit is `1` adds the corresponding LLR to its
/// metric, a bit of `0` subtracts it. Survivors are updated on strictly
/// greater metrics only, so on a tie the earlier-enumerated predecessor wins;
/// this keeps decoder output bit-exact on marginal inputs. Traceback starts
/// from the zero state, which the encoder tail guarantees, and the six tail
/// stages are dropped, leaving `llrs.len() / 2 - 6` information bits.
///
/// # Errors
///
/// - [`Error::InvalidInput`] if `llrs` is empty or of odd length.
/// - [`Error::Underflow`] if `llrs` covers no information bits beyond the
///   tail.
/// - [`Error::TrellisInconsistency`] if the terminal zero state is
///   unreachable (cannot happen for inputs of valid length).
#[allow(clippy::cast_possible_truncation)]
pub fn viterbi_decode(llrs: &[f64]) -> Result<Vec<Bit>, Error> {
    if llrs.is_empty() || llrs.len() % 2 != 0 {
        return Err(Error::InvalidInput(format!(
            "Rate-1/2 decoder expects a non-empty, even number of LLR values (found {})",
            llrs.len()
        )));
    }
    let num_stages = llrs.len() / 2;
    if num_stages <= MEMORY_LENGTH {
        return Err(Error::Underflow(num_stages));
    }
    let info_len = num_stages - MEMORY_LENGTH;
    let trellis = Trellis::get();

    let mut metrics = vec![NEG_INF; (num_stages + 1) * NUM_STATES];
    let mut history = vec![0u8; (num_stages + 1) * NUM_STATES];
    metrics[0] = 0.0;

    // Forward pass: each state pulls from its two predecessors.
    for stage in 0 .. num_stages {
        let llr0 = llrs[2 * stage];
        let llr1 = llrs[2 * stage + 1];
        let mut updated_metrics = [NEG_INF; NUM_STATES];
        let mut updated_history = [0u8; NUM_STATES];
        let reached = &metrics[stage * NUM_STATES .. (stage + 1) * NUM_STATES];
        for (state, new_metric) in updated_metrics.iter_mut().enumerate() {
            let entry = &trellis.states[state];
            let mut survivor = None;
            for branch in 0 .. 2 {
                let prev = usize::from(entry.prev_state[branch]);
                if reached[prev] == NEG_INF {
                    continue;
                }
                let input = usize::from(entry.prev_input[branch]);
                let output = trellis.states[prev].output[input];
                let mut branch_metric = if output & 0b10 != 0 { llr0 } else { -llr0 };
                branch_metric += if output & 0b01 != 0 { llr1 } else { -llr1 };
                let candidate = reached[prev] + branch_metric;
                let better = match survivor {
                    Some((incumbent, _)) => candidate > incumbent,
                    None => true,
                };
                if better {
                    survivor = Some((candidate, ((prev << 1) | input) as u8));
                }
            }
            if let Some((metric, hist)) = survivor {
                *new_metric = metric;
                updated_history[state] = hist;
            }
        }
        metrics[(stage + 1) * NUM_STATES .. (stage + 2) * NUM_STATES]
            .copy_from_slice(&updated_metrics);
        history[(stage + 1) * NUM_STATES .. (stage + 2) * NUM_STATES]
            .copy_from_slice(&updated_history);
    }

    if metrics[num_stages * NUM_STATES] == NEG_INF {
        return Err(Error::TrellisInconsistency(
            "terminal zero state unreachable".to_string(),
        ));
    }

    // Traceback from the zero state; stages beyond info_len are tail.
    let mut decoded_bits = vec![Bit::Zero; info_len];
    let mut state = 0;
    for stage in (1 ..= num_stages).rev() {
        let entry = history[stage * NUM_STATES + state];
        if stage <= info_len {
            decoded_bits[stage - 1] = Bit::from_bool(entry & 1 == 1);
        }
        state = usize::from(entry >> 1);
    }
    Ok(decoded_bits)
}
