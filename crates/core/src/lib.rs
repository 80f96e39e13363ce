//! Core types for shelfdb
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: tagged value union for document fields
//! - Document / DocumentId: the stored record and its generated identifier
//! - Error: error type hierarchy, returned as values

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod value;

pub use document::{is_reserved, Document, DocumentId, ID_FIELD, RELEVANCE_FIELD, RESERVED_PREFIX};
pub use error::{Error, Result};
pub use value::Value;
