//! The document store
//!
//! A [`Store`] owns the document sequence and its indexes behind a single
//! `parking_lot::Mutex`. Every public method takes the gate for its whole
//! duration, so at most one operation runs at a time.
//!
//! [`Store::lock`] hands the gate to the caller as a [`StoreGuard`] that
//! exposes the same operations. Several calls made through one guard are
//! atomic with respect to other threads. The gate is released when the guard
//! is dropped or passed to [`StoreGuard::unlock`].
//!
//! Calling a `Store` method while holding its guard on the same thread
//! deadlocks; use the guard's methods instead.
//!
//! # Example
//!
//! ```text
//! use shelfdb_engine::{Store, Query, Update, UpdateOptions};
//!
//! let store = Store::new();
//! store.index("email", true, true)?;
//! store.insert(Document::new().with("email", "a@b.c").with("visits", 0))?;
//! store.update(&Query::new().eq("email", "a@b.c"), &Update::modify().add("visits", 1), UpdateOptions::default())?;
//! ```

use crate::config::{StoreConfig, CONFIG_FILE_NAME};
use crate::id::generate_id;
use crate::index::{Index, IndexSet};
use crate::query::{matcher, Query};
use crate::snapshot;
use crate::sort::{self, SortSpec};
use crate::update::Update;
use parking_lot::{Mutex, MutexGuard};
use shelfdb_core::{Document, Error, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Options for [`Store::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOptions {
    /// Update every match instead of stopping after the first
    pub multi: bool,
    /// Insert a new document when nothing matches
    pub upsert: bool,
}

impl UpdateOptions {
    /// First match only, no upsert
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `multi`
    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    /// Set `upsert`
    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}

/// Documents and indexes guarded by the store's gate
#[derive(Debug, Default)]
struct StoreState {
    docs: Vec<Document>,
    indexes: IndexSet,
}

// ============================================================================
// Store
// ============================================================================

/// An embedded document store
#[derive(Debug)]
pub struct Store {
    state: Mutex<StoreState>,
    config: StoreConfig,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty in-memory store with default settings
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty in-memory store
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            config,
        }
    }

    /// Open a store backed by a snapshot file
    ///
    /// Settings are read from `shelf.toml` next to the snapshot; a default
    /// file is written there if none exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_path = config_path_for(path);
        if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        StoreConfig::write_default_if_missing(&config_path)?;
        let config = StoreConfig::from_file(&config_path)?;
        Self::open_snapshot(path, config)
    }

    /// Open a store backed by a snapshot file with explicit settings
    ///
    /// The settings are written to `shelf.toml` so a later [`Store::open`]
    /// picks them up.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        let config_path = config_path_for(path);
        if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        config.write_to_file(&config_path)?;
        Self::open_snapshot(path, config)
    }

    /// Load `path` if it exists, otherwise create it from an empty store
    fn open_snapshot(path: &Path, config: StoreConfig) -> Result<Self> {
        if path.exists() {
            let snapshot::Snapshot { docs, indexes } = snapshot::load(path)?;
            info!(
                target: "shelfdb::store",
                path = %path.display(),
                docs = docs.len(),
                indexes = indexes.len(),
                "Opened store from snapshot"
            );
            Ok(Self {
                state: Mutex::new(StoreState { docs, indexes }),
                config,
            })
        } else {
            let store = Self::with_config(config);
            store.save(path)?;
            info!(
                target: "shelfdb::store",
                path = %path.display(),
                "Created empty store snapshot"
            );
            Ok(store)
        }
    }

    /// Active settings
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Take the gate for a sequence of operations
    ///
    /// Blocks until no other operation is running.
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            state: self.state.lock(),
            config: &self.config,
        }
    }

    /// Insert a document, returning a copy with its new `_id`
    pub fn insert(&self, doc: Document) -> Result<Document> {
        self.lock().insert(doc)
    }

    /// Documents matching every clause of `query`
    pub fn find(&self, query: &Query) -> Vec<Document> {
        self.lock().find(query)
    }

    /// Documents matched with an explicit `require_all_keys` mode
    pub fn find_with(&self, query: &Query, require_all_keys: bool) -> Vec<Document> {
        self.lock().find_with(query, require_all_keys)
    }

    /// Update matching documents
    pub fn update(
        &self,
        query: &Query,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<Vec<Document>> {
        self.lock().update(query, update, options)
    }

    /// Remove matching documents, returning how many were removed
    pub fn remove(&self, query: &Query) -> usize {
        self.lock().remove(query)
    }

    /// Declare an index on `field`
    pub fn index(&self, field: &str, unique: bool, required_field: bool) -> Result<()> {
        self.lock().index(field, unique, required_field)
    }

    /// Drop the index on `field`
    pub fn remove_index(&self, field: &str) {
        self.lock().remove_index(field)
    }

    /// Sorted copies of `docs`
    pub fn sort(&self, spec: &SortSpec, docs: &[Document]) -> Vec<Document> {
        self.lock().sort(spec, docs)
    }

    /// First `n` of `docs`
    pub fn limit(&self, n: usize, docs: &[Document]) -> Vec<Document> {
        self.lock().limit(n, docs)
    }

    /// `docs` without the first `n`
    pub fn skip(&self, n: usize, docs: &[Document]) -> Vec<Document> {
        self.lock().skip(n, docs)
    }

    /// Write a snapshot of the whole store to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.lock().save(path)
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies of every stored document, in store order
    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents()
    }

    /// Copy of the index on `field`
    pub fn index_info(&self, field: &str) -> Option<Index> {
        self.lock().index_info(field)
    }

    /// Indexed field names
    pub fn index_fields(&self) -> Vec<String> {
        self.lock().index_fields()
    }

    /// True if every index agrees with the document sequence
    pub fn verify_indexes(&self) -> bool {
        self.lock().verify_indexes()
    }
}

fn config_path_for(snapshot_path: &Path) -> std::path::PathBuf {
    snapshot_path
        .parent()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| CONFIG_FILE_NAME.into())
}

// ============================================================================
// StoreGuard
// ============================================================================

/// Exclusive access to a store, released on drop
pub struct StoreGuard<'a> {
    state: MutexGuard<'a, StoreState>,
    config: &'a StoreConfig,
}

impl<'a> StoreGuard<'a> {
    /// Release the gate
    pub fn unlock(self) {}

    /// Insert a document
    ///
    /// # Errors
    ///
    /// - `ReservedField` if the document carries a `_`-prefixed field
    /// - `MissingRequiredField` / `UniqueViolation` from index constraints
    ///
    /// The store is unchanged on error.
    pub fn insert(&mut self, doc: Document) -> Result<Document> {
        doc.validate_user_fields()?;

        let mut doc = doc;
        doc.set_relevance(None);
        let id = generate_id();
        doc.set_id(&id);

        let state = &mut *self.state;
        if let Err(e) = state.indexes.validate(&doc, None) {
            debug!(target: "shelfdb::store", error = %e, "Insert rejected");
            return Err(e);
        }

        let pos = state.docs.len();
        state.indexes.insert_document(&doc, pos);
        state.docs.push(doc.clone());

        debug!(target: "shelfdb::store", id = %id, pos, "Inserted document");
        Ok(doc)
    }

    /// Documents matching every clause of `query`
    pub fn find(&self, query: &Query) -> Vec<Document> {
        self.find_with(query, true)
    }

    /// Documents matched with an explicit `require_all_keys` mode
    ///
    /// With `require_all_keys == false` the result is the documents that
    /// matched some clause but not all of them.
    pub fn find_with(&self, query: &Query, require_all_keys: bool) -> Vec<Document> {
        matcher::find(
            &self.state.docs,
            &self.state.indexes,
            query,
            require_all_keys,
            &self.config.fulltext,
        )
    }

    /// Update matching documents in store order
    ///
    /// Stops after the first update unless `options.multi`. When nothing
    /// matches and `options.upsert` is set, the update is applied to an empty
    /// document and inserted.
    ///
    /// # Errors
    ///
    /// Returns the first index constraint violation. Documents updated earlier
    /// in the same call stay updated.
    pub fn update(
        &mut self,
        query: &Query,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<Vec<Document>> {
        update.validate()?;

        let mut updated = Vec::new();
        let state = &mut *self.state;
        for pos in 0..state.docs.len() {
            let current = &state.docs[pos];
            if !matcher::matches_all(current, query, &self.config.fulltext) {
                continue;
            }

            let mut candidate = update.apply(current);
            if let Some(id) = current.id() {
                candidate.set_id(&id);
            }

            if let Err(e) = state.indexes.validate(&candidate, Some(pos)) {
                warn!(
                    target: "shelfdb::store",
                    pos,
                    committed = updated.len(),
                    error = %e,
                    "Update stopped by index constraint"
                );
                return Err(e);
            }

            state.indexes.remove_position(pos);
            state.indexes.insert_document(&candidate, pos);
            state.docs[pos] = candidate.clone();
            updated.push(candidate);

            if !options.multi {
                break;
            }
        }

        if updated.is_empty() && options.upsert {
            let doc = update.apply(&Document::new());
            updated.push(self.insert(doc)?);
            debug!(target: "shelfdb::store", "Upserted document");
        } else {
            debug!(target: "shelfdb::store", count = updated.len(), "Updated documents");
        }
        Ok(updated)
    }

    /// Remove every document matching `query`
    ///
    /// Matches are removed back to front. Each removal then gets its own
    /// renumbering pass over the indexes, in removal order.
    pub fn remove(&mut self, query: &Query) -> usize {
        let state = &mut *self.state;
        let mut removed = Vec::new();
        for pos in (0..state.docs.len()).rev() {
            if matcher::matches_all(&state.docs[pos], query, &self.config.fulltext) {
                state.indexes.remove_position(pos);
                state.docs.remove(pos);
                removed.push(pos);
            }
        }
        for &pos in &removed {
            state.indexes.shift_down_from(pos);
        }
        debug!(target: "shelfdb::store", count = removed.len(), "Removed documents");
        removed.len()
    }

    /// Declare an index on `field`, built from the current documents
    ///
    /// # Errors
    ///
    /// - `IndexExists` if `field` is already indexed
    /// - `UniqueViolation` / `MissingRequiredField` if existing documents
    ///   break the requested constraint
    ///
    /// Nothing is created on error.
    pub fn index(&mut self, field: &str, unique: bool, required_field: bool) -> Result<()> {
        let state = &mut *self.state;
        if state.indexes.contains(field) {
            return Err(Error::IndexExists(field.to_string()));
        }
        let index = Index::build(field, unique, required_field, &state.docs)?;
        let keys = index.key_count();
        state.indexes.declare(field, index)?;
        info!(
            target: "shelfdb::store",
            field,
            unique,
            required_field,
            keys,
            "Declared index"
        );
        Ok(())
    }

    /// Drop the index on `field`; a no-op if there is none
    pub fn remove_index(&mut self, field: &str) {
        if self.state.indexes.drop_index(field).is_some() {
            info!(target: "shelfdb::store", field, "Dropped index");
        }
    }

    /// Sorted copies of `docs`
    pub fn sort(&self, spec: &SortSpec, docs: &[Document]) -> Vec<Document> {
        sort::sort(spec, docs)
    }

    /// First `n` of `docs`
    pub fn limit(&self, n: usize, docs: &[Document]) -> Vec<Document> {
        sort::limit(n, docs)
    }

    /// `docs` without the first `n`
    pub fn skip(&self, n: usize, docs: &[Document]) -> Vec<Document> {
        sort::skip(n, docs)
    }

    /// Write a snapshot to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        snapshot::save(
            path.as_ref(),
            &self.state.docs,
            &self.state.indexes,
            self.config.snapshot.pretty,
        )
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.state.docs.len()
    }

    /// True if the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.state.docs.is_empty()
    }

    /// Copies of every stored document
    pub fn documents(&self) -> Vec<Document> {
        self.state.docs.clone()
    }

    /// Copy of the index on `field`
    pub fn index_info(&self, field: &str) -> Option<Index> {
        self.state.indexes.get(field).cloned()
    }

    /// Indexed field names
    pub fn index_fields(&self) -> Vec<String> {
        self.state.indexes.fields().cloned().collect()
    }

    /// True if every index agrees with the document sequence
    pub fn verify_indexes(&self) -> bool {
        self.state.indexes.is_consistent_with(&self.state.docs)
    }

    /// Active settings
    pub fn config(&self) -> &StoreConfig {
        self.config
    }
}
