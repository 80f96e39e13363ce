//! Error types for shelfdb
//!
//! Every fallible operation returns these as values. Callers branch on the
//! variant instead of catching panics. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for shelfdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document store
#[derive(Debug, Error)]
pub enum Error {
    /// A user-supplied field name starts with the reserved prefix
    #[error("Documents cannot contain fields which start with an _, like {0}")]
    ReservedField(String),

    /// A unique index already holds the value at another position
    #[error("The unique index for \"{field}\" already has the value {value}")]
    UniqueViolation {
        /// Indexed field
        field: String,
        /// Rendered duplicate value
        value: String,
    },

    /// A document lacks a field that a required_field index demands
    #[error("The document is missing the field \"{field}\" which is required by an index")]
    MissingRequiredField {
        /// Required field
        field: String,
    },

    /// An index is already declared on the field
    #[error("An index already exists for \"{0}\"")]
    IndexExists(String),

    /// A regex literal could not be parsed or compiled
    #[error("Invalid regex {literal}: {reason}")]
    InvalidRegex {
        /// The literal as written, e.g. `/abc/i`
        literal: String,
        /// Why it was rejected
        reason: String,
    },

    /// The query document is structurally invalid
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The update document is structurally invalid
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// The sort request is invalid
    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    /// I/O error while reading or writing a snapshot
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// True for unique/required violations and duplicate index declarations
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::UniqueViolation { .. }
                | Error::MissingRequiredField { .. }
                | Error::IndexExists(_)
        )
    }

    /// True for errors caused by a malformed query, update or sort spec
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidRegex { .. }
                | Error::InvalidQuery(_)
                | Error::InvalidUpdate(_)
                | Error::InvalidSort(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_reserved_field() {
        let err = Error::ReservedField("_secret".to_string());
        let msg = err.to_string();
        assert!(msg.contains("_secret"));
    }

    #[test]
    fn test_error_display_unique_violation() {
        let err = Error::UniqueViolation {
            field: "email".to_string(),
            value: "\"a@b.c\"".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("unique index"));
        assert!(msg.contains("email"));
        assert!(msg.contains("a@b.c"));
    }

    #[test]
    fn test_error_display_invalid_regex() {
        let err = Error::InvalidRegex {
            literal: "/(/".to_string(),
            reason: "unclosed group".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/(/"));
        assert!(msg.contains("unclosed group"));
    }

    #[test]
    fn test_error_categories() {
        assert!(Error::MissingRequiredField {
            field: "a".to_string()
        }
        .is_constraint_violation());
        assert!(Error::IndexExists("a".to_string()).is_constraint_violation());
        assert!(!Error::InvalidQuery("x".to_string()).is_constraint_violation());
        assert!(Error::InvalidQuery("x".to_string()).is_malformed_input());
        assert!(!Error::ReservedField("_x".to_string()).is_malformed_input());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let result: Result<serde_json::Value> =
            serde_json::from_str("{not json").map_err(Error::from);
        assert!(matches!(result, Err(Error::SerializationError(_))));
    }
}
