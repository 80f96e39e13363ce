//! Secondary indexes
//!
//! An [`Index`] maps each distinct value of one field to the positions of the
//! documents that hold it. A position is the document's offset in the store's
//! sequence, so it is unstable across removals: every mutation in the store
//! must keep the buckets in step with the document vector.
//!
//! # Invariants
//!
//! - For every bucket `(value, positions)` and every `p` in `positions`,
//!   `docs[p][field]` loosely equals `value`.
//! - The union of all positions for a field is exactly the set of documents
//!   holding that field.
//! - A unique index never records two positions for one value.
//! - A required_field index implies every stored document has the field.
//! - Positions within a bucket are sorted ascending; buckets are never empty.

use serde::{Deserialize, Serialize};
use shelfdb_core::{Document, Error, Result, Value};
use std::collections::BTreeMap;

/// Offset of a document in the store's sequence
pub type Position = usize;

// ============================================================================
// IndexEntry
// ============================================================================

/// One bucket of an index: a value and the documents holding it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    value: Value,
    positions: Vec<Position>,
}

impl IndexEntry {
    /// The indexed value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Sorted positions of documents holding the value
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    fn insert_position(&mut self, pos: Position) {
        if let Err(at) = self.positions.binary_search(&pos) {
            self.positions.insert(at, pos);
        }
    }
}

// ============================================================================
// Index
// ============================================================================

/// Value → positions structure for a single field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Index {
    unique: bool,
    required_field: bool,
    values: Vec<IndexEntry>,
}

impl Index {
    /// Create an empty index
    pub fn new(unique: bool, required_field: bool) -> Self {
        Self {
            unique,
            required_field,
            values: Vec::new(),
        }
    }

    /// Build an index over existing documents in a single scan
    ///
    /// # Errors
    ///
    /// - `UniqueViolation` on the first duplicate value of a unique index
    /// - `MissingRequiredField` on the first document lacking a required field
    pub fn build(
        field: &str,
        unique: bool,
        required_field: bool,
        docs: &[Document],
    ) -> Result<Self> {
        let mut index = Self::new(unique, required_field);
        for (pos, doc) in docs.iter().enumerate() {
            match doc.get(field) {
                Some(value) => {
                    if unique && index.bucket(value).is_some() {
                        return Err(Error::UniqueViolation {
                            field: field.to_string(),
                            value: value.to_string(),
                        });
                    }
                    index.add_position(value, pos);
                }
                None if required_field => {
                    return Err(Error::MissingRequiredField {
                        field: field.to_string(),
                    });
                }
                None => {}
            }
        }
        Ok(index)
    }

    /// True if the index rejects duplicate values
    pub fn unique(&self) -> bool {
        self.unique
    }

    /// True if every document must carry the field
    pub fn required_field(&self) -> bool {
        self.required_field
    }

    /// Buckets in creation order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.values
    }

    /// Number of distinct values
    pub fn key_count(&self) -> usize {
        self.values.len()
    }

    /// Bucket holding `value`, if any
    pub fn bucket(&self, value: &Value) -> Option<&IndexEntry> {
        self.values.iter().find(|entry| entry.value.loose_eq(value))
    }

    /// Positions recorded for `value`
    pub fn lookup(&self, value: &Value) -> &[Position] {
        self.bucket(value).map(IndexEntry::positions).unwrap_or(&[])
    }

    /// Record `pos` under `value`, creating the bucket if needed
    pub fn add_position(&mut self, value: &Value, pos: Position) {
        match self.values.iter_mut().find(|e| e.value.loose_eq(value)) {
            Some(entry) => entry.insert_position(pos),
            None => self.values.push(IndexEntry {
                value: value.clone(),
                positions: vec![pos],
            }),
        }
    }

    /// Drop `pos` from every bucket, pruning buckets left empty
    pub fn remove_position(&mut self, pos: Position) {
        for entry in &mut self.values {
            entry.positions.retain(|p| *p != pos);
        }
        self.values.retain(|entry| !entry.positions.is_empty());
    }

    /// One renumbering pass: decrement every position `>= removed`
    pub fn shift_down_from(&mut self, removed: Position) {
        for entry in &mut self.values {
            for p in entry.positions.iter_mut() {
                if *p >= removed {
                    *p -= 1;
                }
            }
        }
    }

    /// Validate a candidate document against this index's constraints
    ///
    /// `own_pos` is the position of the document being replaced, if any;
    /// a unique bucket that only contains it is not a collision.
    pub fn check_candidate(
        &self,
        field: &str,
        doc: &Document,
        own_pos: Option<Position>,
    ) -> Result<()> {
        match doc.get(field) {
            None if self.required_field => Err(Error::MissingRequiredField {
                field: field.to_string(),
            }),
            Some(value) if self.unique => {
                let collides = self
                    .lookup(value)
                    .iter()
                    .any(|p| Some(*p) != own_pos);
                if collides {
                    Err(Error::UniqueViolation {
                        field: field.to_string(),
                        value: value.to_string(),
                    })
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// IndexSet
// ============================================================================

/// All indexes of a store, keyed by field name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexSet {
    indexes: BTreeMap<String, Index>,
}

impl IndexSet {
    /// Create an empty index set
    pub fn new() -> Self {
        Self::default()
    }

    /// Index declared on `field`
    pub fn get(&self, field: &str) -> Option<&Index> {
        self.indexes.get(field)
    }

    /// True if `field` has an index
    pub fn contains(&self, field: &str) -> bool {
        self.indexes.contains_key(field)
    }

    /// Indexed field names in order
    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.indexes.keys()
    }

    /// Number of indexes
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// True if no index is declared
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Install a freshly built index
    ///
    /// # Errors
    ///
    /// Returns `IndexExists` if the field already has one.
    pub fn declare(&mut self, field: &str, index: Index) -> Result<()> {
        if self.indexes.contains_key(field) {
            return Err(Error::IndexExists(field.to_string()));
        }
        self.indexes.insert(field.to_string(), index);
        Ok(())
    }

    /// Remove the index on `field`
    pub fn drop_index(&mut self, field: &str) -> Option<Index> {
        self.indexes.remove(field)
    }

    /// Validate a candidate document against every index
    ///
    /// Required fields are checked across all indexes before uniqueness.
    pub fn validate(&self, doc: &Document, own_pos: Option<Position>) -> Result<()> {
        for (field, index) in &self.indexes {
            if index.required_field && !doc.contains(field) {
                return Err(Error::MissingRequiredField {
                    field: field.clone(),
                });
            }
        }
        for (field, index) in &self.indexes {
            index.check_candidate(field, doc, own_pos)?;
        }
        Ok(())
    }

    /// Record `pos` under every indexed field the document holds
    pub fn insert_document(&mut self, doc: &Document, pos: Position) {
        for (field, index) in self.indexes.iter_mut() {
            if let Some(value) = doc.get(field) {
                index.add_position(value, pos);
            }
        }
    }

    /// Purge `pos` from every index
    pub fn remove_position(&mut self, pos: Position) {
        for index in self.indexes.values_mut() {
            index.remove_position(pos);
        }
    }

    /// Renumber every index after the document at `removed` was spliced out
    pub fn shift_down_from(&mut self, removed: Position) {
        for index in self.indexes.values_mut() {
            index.shift_down_from(removed);
        }
    }

    /// Check every invariant against the document sequence
    pub fn is_consistent_with(&self, docs: &[Document]) -> bool {
        self.indexes.iter().all(|(field, index)| {
            let mut seen = vec![false; docs.len()];
            for entry in &index.values {
                if entry.positions.is_empty() {
                    return false;
                }
                if index.unique && entry.positions.len() > 1 {
                    return false;
                }
                if !entry.positions.windows(2).all(|w| w[0] < w[1]) {
                    return false;
                }
                for &p in &entry.positions {
                    let holds = docs
                        .get(p)
                        .and_then(|doc| doc.get(field))
                        .map_or(false, |v| v.loose_eq(&entry.value));
                    if !holds || seen[p] {
                        return false;
                    }
                    seen[p] = true;
                }
            }
            docs.iter()
                .zip(&seen)
                .all(|(doc, indexed)| doc.contains(field) == *indexed)
                && (!index.required_field || docs.iter().all(|d| d.contains(field)))
        })
    }
}
