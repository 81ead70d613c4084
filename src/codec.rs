//! Wire codec for per-visit record blobs.
//!
//! Each visit is stored under `visit_<id>` as a JSON object with camelCase
//! field names: `{path, duration, timestamp, visitor, audioGuide}`. The id
//! itself is carried by the key, not the blob.

use crate::error::{Result, SyncError};
use crate::types::{AccountId, Ciphertext, Timestamp, Visit, VisitId};
use serde::{Deserialize, Serialize};

/// Key prefix for per-visit records.
pub const RECORD_KEY_PREFIX: &str = "visit_";

/// Ledger key for a visit id.
pub fn record_key(id: &VisitId) -> String {
    format!("{}{}", RECORD_KEY_PREFIX, id)
}

/// Guide label assumed for records written before guides existed.
fn legacy_audio_guide() -> String {
    "Custom Tour".to_string()
}

/// On-ledger layout of one visit record.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisitRecord {
    path: String,
    duration: u32,
    timestamp: i64,
    visitor: String,
    #[serde(default = "legacy_audio_guide")]
    audio_guide: String,
}

/// Serialize a visit into its record blob.
pub fn encode(visit: &Visit) -> Result<Vec<u8>> {
    let record = VisitRecord {
        path: visit.encrypted_path.as_str().to_string(),
        duration: visit.duration,
        timestamp: visit.timestamp.0,
        visitor: visit.visitor.as_str().to_string(),
        audio_guide: visit.audio_guide.clone(),
    };
    Ok(serde_json::to_vec(&record)?)
}

/// Decode a record blob fetched under `id`.
///
/// A malformed blob is a [`SyncError::Parse`]; the caller decides whether
/// that aborts the operation or just skips this one record.
pub fn decode(id: &VisitId, bytes: &[u8]) -> Result<Visit> {
    let record: VisitRecord = serde_json::from_slice(bytes)
        .map_err(|e| SyncError::Parse(format!("record {}: {}", id, e)))?;

    Ok(Visit {
        id: id.clone(),
        encrypted_path: Ciphertext::from_raw(record.path),
        duration: record.duration,
        timestamp: Timestamp(record.timestamp),
        visitor: AccountId(record.visitor),
        audio_guide: record.audio_guide,
    })
}
