//! Document identifier generation
//!
//! Format: hex(SHA256(uuid_v4 || timestamp_nanos))[..40]
//!
//! The hash only has to be collision resistant; nothing else in the engine
//! depends on its structure.

use sha2::{Digest, Sha256};
use shelfdb_core::DocumentId;
use uuid::Uuid;

/// Number of hash bytes kept in an identifier (40 hex characters)
const ID_BYTES: usize = 20;

/// Generate a fresh document identifier
pub fn generate_id() -> DocumentId {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    hasher.update(nanos.to_le_bytes());
    let digest = hasher.finalize();

    let hex: String = digest[..ID_BYTES]
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect();
    DocumentId::new(hex)
}
