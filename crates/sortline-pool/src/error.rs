//! Pool-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while building a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// A pool with no slots could never spawn anything.
    ZeroCapacity,
    /// Slot ids are `u32`; the requested capacity does not fit.
    CapacityOverflow {
        /// The requested number of slots.
        requested: usize,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "pool capacity must be at least 1"),
            Self::CapacityOverflow { requested } => {
                write!(f, "pool capacity {requested} exceeds u32::MAX slots")
            }
        }
    }
}

impl Error for PoolError {}
