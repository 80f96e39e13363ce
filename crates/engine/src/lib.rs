//! Storage engine for shelfdb
//!
//! This crate owns everything that operates on a store:
//! - Store: the document sequence, its indexes and the concurrency gate
//! - Indexes: per-field value → positions buckets kept in step with mutations
//! - Query: operator language, index-accelerated matching and full-text scoring
//! - Update: whole-document replacement and field modifiers
//! - Sort: natural ordering, limit and skip
//! - Snapshot / config: JSON persistence and `shelf.toml` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod id;
pub mod index;
pub mod query;
pub mod snapshot;
pub mod sort;
pub mod store;
pub mod update;

pub use config::{FullTextConfig, SnapshotConfig, StoreConfig, CONFIG_FILE_NAME};
pub use id::generate_id;
pub use index::{Index, IndexEntry, IndexSet, Position};
pub use query::{Clause, Condition, Operator, Pattern, Query};
pub use snapshot::Snapshot;
pub use sort::{natural_cmp, SortOrder, SortSpec};
pub use store::{Store, StoreGuard, UpdateOptions};
pub use update::{ModifierKind, ModifierOp, Update};

pub use shelfdb_core::{Document, DocumentId, Error, Result, Value};
