//! Torrent Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

use crate::Key;

/// A torrent error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for torrent operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The key isn't a torrent property at all. Don't ask again.
    #[display("unknown torrent key: {_0:?}")]
    UnknownKey(#[error(not(source))] String),
    /// The key is valid, but the raw fields it needs haven't been fetched.
    /// Ask again after the next fetch that includes `field`.
    #[display("{key} is not available: raw field {field:?} has not been fetched")]
    NotAvailable {
        /// The requested property.
        key: Key,
        /// The first of its raw fields that is missing.
        field: &'static str,
    },
    /// A raw record lacks a field that construction (or a derivation) reads.
    #[display("missing raw field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A raw field is present but doesn't have the expected shape.
    #[display("invalid raw field '{field}', found value: {value}")]
    InvalidField {
        /// The raw field name.
        field: &'static str,
        /// The offending value, as JSON.
        value: String,
    },
    /// A file path in the raw record can't be placed in a file tree.
    #[display("malformed file path: {_0:?}")]
    MalformedPath(#[error(not(source))] String),
    /// An update carried a different torrent ID than the record it was applied to.
    #[display("update for torrent #{found} applied to torrent #{expected}")]
    IdMismatch {
        /// ID of the record being updated.
        expected: u64,
        /// ID carried by the update.
        found: u64,
    },
    /// A property table violates its own rules.
    #[display("invalid property table: {_0}")]
    InvalidSchema(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotAvailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::UnknownKey("colour".to_string()).to_string(), r#"unknown torrent key: "colour""#);
        assert_eq!(
            ErrorKind::NotAvailable { key: Key::Ratio, field: "uploadRatio" }.to_string(),
            r#"ratio is not available: raw field "uploadRatio" has not been fetched"#
        );
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::NotAvailable { key: Key::Name, field: "name" }.is_retryable());
        assert!(!ErrorKind::UnknownKey("colour".to_string()).is_retryable());
        assert!(!ErrorKind::MalformedPath("a//b".to_string()).is_retryable());
    }
}
