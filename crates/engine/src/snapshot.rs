//! JSON snapshots of a store
//!
//! A snapshot is a single JSON object:
//!
//! ```text
//! {
//!   "docs":    [ { "_id": "...", ... }, ... ],
//!   "indexes": { "<field>": { "unique": bool, "required_field": bool,
//!                              "values": [ { "value": ..., "positions": [..] } ] } }
//! }
//! ```
//!
//! Saving writes a temp file, syncs it, then renames it over the target.

use crate::index::IndexSet;
use serde::{Deserialize, Serialize};
use shelfdb_core::{Document, Result};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Owned snapshot contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Documents in store order
    #[serde(default)]
    pub docs: Vec<Document>,
    /// Indexes keyed by field
    #[serde(default)]
    pub indexes: IndexSet,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    docs: &'a [Document],
    indexes: &'a IndexSet,
}

/// Read a snapshot file
///
/// Any stray `_relevance` values are dropped. Indexes that disagree with the
/// documents are loaded as-is and reported with a warning.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be read and `SerializationError` if
/// it is not a valid snapshot.
pub fn load(path: &Path) -> Result<Snapshot> {
    let bytes = std::fs::read(path)?;
    let mut snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    for doc in &mut snapshot.docs {
        doc.set_relevance(None);
    }
    if !snapshot.indexes.is_consistent_with(&snapshot.docs) {
        warn!(
            target: "shelfdb::snapshot",
            path = %path.display(),
            "Snapshot indexes do not match its documents"
        );
    }
    debug!(
        target: "shelfdb::snapshot",
        path = %path.display(),
        docs = snapshot.docs.len(),
        indexes = snapshot.indexes.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

/// Write a snapshot atomically (temp + fsync + rename)
pub fn save(path: &Path, docs: &[Document], indexes: &IndexSet, pretty: bool) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let view = SnapshotRef { docs, indexes };
    let payload = if pretty {
        serde_json::to_vec_pretty(&view)?
    } else {
        serde_json::to_vec(&view)?
    };

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(&payload)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;

    debug!(
        target: "shelfdb::snapshot",
        path = %path.display(),
        docs = docs.len(),
        bytes = payload.len(),
        "Saved snapshot"
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
