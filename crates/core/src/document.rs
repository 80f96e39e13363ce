//! Document types
//!
//! A [`Document`] is an ordered map of field name to [`Value`]. The store
//! assigns the identifier under [`ID_FIELD`] at insert time; query results
//! additionally carry a relevance score that is never persisted.
//!
//! Field names starting with [`RESERVED_PREFIX`] belong to the store and
//! are rejected in user content.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// First character of store-owned field names
pub const RESERVED_PREFIX: char = '_';

/// Field holding the generated document identifier
pub const ID_FIELD: &str = "_id";

/// Field name under which query results expose their relevance
pub const RELEVANCE_FIELD: &str = "_relevance";

/// Generated, immutable document identifier
///
/// Forty lowercase hex characters. Identifiers are unique across a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::String(id.0)
    }
}

/// A document in the store
///
/// Cloning a document is a deep copy; the store only ever hands out clones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
    #[serde(
        rename = "_relevance",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    relevance: Option<f64>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from a field map
    pub fn from_fields(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields,
            relevance: None,
        }
    }

    /// Create a document from a JSON object
    ///
    /// # Errors
    ///
    /// Returns `Error::SerializationError` if `json` is not an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(Error::SerializationError(format!(
                "a document must be an object, got {}",
                other.type_name()
            ))),
        }
    }

    /// Convert to JSON, including `_relevance` when present
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
            .collect();
        if let Some(relevance) = self.relevance {
            if let Some(n) = serde_json::Number::from_f64(relevance) {
                obj.insert(RELEVANCE_FIELD.to_string(), serde_json::Value::Number(n));
            }
        }
        serde_json::Value::Object(obj)
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// The identifier, once the store has assigned one
    pub fn id(&self) -> Option<DocumentId> {
        self.fields
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .map(DocumentId::new)
    }

    /// Pin the identifier field
    pub fn set_id(&mut self, id: &DocumentId) {
        self.fields
            .insert(ID_FIELD.to_string(), Value::String(id.as_str().to_string()));
    }

    /// Relevance score; only present on query results
    pub fn relevance(&self) -> Option<f64> {
        self.relevance
    }

    /// Set or clear the relevance score
    pub fn set_relevance(&mut self, relevance: Option<f64>) {
        self.relevance = relevance;
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Check if a field exists
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Set a field value, returning the previous one
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Iterate over fields in key order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Borrow the underlying field map
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Number of fields, including `_id` once assigned
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of fields that use the reserved prefix
    pub fn reserved_fields(&self) -> Vec<&str> {
        self.fields
            .keys()
            .filter(|k| is_reserved(k))
            .map(String::as_str)
            .collect()
    }

    /// Reject documents that carry store-owned field names
    ///
    /// # Errors
    ///
    /// Returns `Error::ReservedField` naming the first offending field.
    pub fn validate_user_fields(&self) -> Result<()> {
        match self.fields.keys().find(|k| is_reserved(k)) {
            Some(field) => Err(Error::ReservedField(field.clone())),
            None => Ok(()),
        }
    }
}

/// True if `field` starts with the reserved prefix
pub fn is_reserved(field: &str) -> bool {
    field.starts_with(RESERVED_PREFIX)
}

impl From<BTreeMap<String, Value>> for Document {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

impl TryFrom<serde_json::Value> for Document {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        Self::from_json(json)
    }
}
