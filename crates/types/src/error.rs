//! Value Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A value error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for value parsing and conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// User (or config) input could not be understood as the requested type.
    #[display("invalid {kind}: {value:?}")]
    ParseError {
        /// The value type that was being parsed.
        kind: &'static str,
        /// The offending input.
        value: String,
    },
    /// A raw number was understood, but the value type can't represent it.
    #[display("{kind} out of range: {value}")]
    OutOfRange {
        /// The value type that was being constructed.
        kind: &'static str,
        /// The offending number.
        value: String,
    },
}

impl ErrorKind {
    pub(crate) fn parse(kind: &'static str, value: impl Into<String>) -> Self {
        Self::ParseError { kind, value: value.into() }
    }

    pub(crate) fn range(kind: &'static str, value: impl ToString) -> Self {
        Self::OutOfRange { kind, value: value.to_string() }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same input, same answer.
        false
    }
}
