//! Types needed in multiple modules

/// Enumeration of binary symbol values
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub enum Bit {
    /// Binary symbol `0`
    Zero = 0,
    /// Binary symbol `1`
    One = 1,
}

impl Bit {
    /// Returns the bit corresponding to a boolean (`true` maps to `One`).
    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }

    /// Returns `true` iff the bit is `One`.
    #[must_use]
    pub fn is_one(self) -> bool {
        self == Bit::One
    }
}

/// Custom error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Unsupported modulation order
    #[error("Unsupported modulation order {0} (expected 2, 4, or 16)")]
    InvalidModulation(u32),
    /// Parameter outside its accepted range
    #[error("{0}")]
    InvalidRange(String),
    /// Invalid input error
    #[error("{0}")]
    InvalidInput(String),
    /// Internal trellis bookkeeping failure (should never occur)
    #[error("Trellis inconsistency: {0}")]
    TrellisInconsistency(String),
    /// Received sequence too short to carry any information bits
    #[error("{0} trellis stages leave no information bits after the tail")]
    Underflow(usize),
    /// File read/write error
    #[error("{0}")]
    FileReadWriteError(#[from] std::io::Error),
    /// Serde read/write error
    #[error("{0}")]
    SerdeReadWriteError(#[from] serde_json::Error),
}
