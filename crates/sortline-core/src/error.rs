//! Error types for the sortline core crate.
//!
//! The simulation itself has no failure path; the only fallible core
//! operation is parsing a mode name supplied from outside.

use std::error::Error;
use std::fmt;

/// A mode name that is not one of `weight`, `color`, `size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseModeError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown sensor mode '{}' (expected weight, color or size)",
            self.input
        )
    }
}

impl Error for ParseModeError {}
