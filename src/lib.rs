//! shelfdb - embedded in-process document store
//!
//! Documents are loosely typed JSON-like records. They are queried through a
//! small operator language, accelerated by secondary indexes, and mutated by
//! whole-document replacement or field modifiers.
//!
//! # Quick Start
//!
//! ```ignore
//! use shelfdb::{Document, Query, SortSpec, Store, Update, UpdateOptions};
//!
//! let store = Store::open("data/store.json")?;
//! store.index("email", true, true)?;
//!
//! store.insert(Document::new().with("email", "a@example.com").with("logins", 0))?;
//! store.update(
//!     &Query::new().eq("email", "a@example.com"),
//!     &Update::modify().add("logins", 1),
//!     UpdateOptions::default(),
//! )?;
//!
//! let recent = store.sort(&SortSpec::highest_first("logins"), &store.find(&Query::new()));
//! store.save("data/store.json")?;
//! ```
//!
//! # Architecture
//!
//! `shelfdb-core` holds the data model and error types; `shelfdb-engine` holds
//! the store and everything it drives. This crate re-exports the engine API.

pub use shelfdb_engine::*;
