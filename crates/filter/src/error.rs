//! Filter Error Types

use derive_more::{Display, Error};

/// A filter error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not one of `=`, `!=`, `<`, `<=`, `>`, `>=`.
    #[display("invalid comparison operator: {_0:?}")]
    InvalidOperator(#[error(not(source))] String),
    /// A user-supplied value doesn't parse as what the filter compares.
    #[display("invalid {kind}: {value:?}")]
    InvalidValue {
        /// What was expected.
        kind: &'static str,
        /// User input, verbatim.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
