//! Remote key-value ledger boundary.
//!
//! The ledger offers independent get/set on opaque byte blobs keyed by
//! string, with no listing and no multi-key transactions. Enumeration is
//! built on top via the key registry.

use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Contract required of the remote ledger.
///
/// Absent keys yield empty bytes, not an error. `set_data` failures carry a
/// human-readable reason; one recognized case is rejection by the acting
/// identity (see [`crate::SyncError::commit`]).
pub trait RecordLedger: Send + Sync {
    /// Whether the ledger currently accepts requests.
    fn is_available(&self) -> bool;

    /// Fetch the blob under `key`. Empty bytes signal "absent".
    fn get_data(&self, key: &str) -> Result<Vec<u8>>;

    /// Commit `value` under `key`.
    fn set_data(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// In-process ledger used by tests, benches, and local development.
///
/// A plain string→bytes dictionary under a lock; mirrors the remote
/// contract including the empty-bytes-means-absent convention.
pub struct MemoryLedger {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    available: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Flip availability, e.g. to simulate an unreachable ledger.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordLedger for MemoryLedger {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        Ok(self.entries.read().get(key).cloned().unwrap_or_default())
    }

    fn set_data(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
