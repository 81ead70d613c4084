//! Sync engine tying ledger, registry, and codec together.
//!
//! Owns the in-memory visit set and rebuilds it wholesale on every load;
//! nothing mutates the set incrementally between loads. The create path is
//! a two-phase, non-transactional write: record blob first, registry append
//! second. A failed append leaves an orphan record that no enumeration will
//! ever reach; that risk is accepted.

use crate::codec;
use crate::error::{Result, SyncError};
use crate::fhe;
use crate::ledger::RecordLedger;
use crate::registry::{KeyRegistry, REGISTRY_KEY};
use crate::types::{AccountId, Timestamp, Visit, VisitDraft, VisitId, DEFAULT_AUDIO_GUIDE};
use parking_lot::RwLock;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Key the id registry is stored under.
    pub registry_key: String,

    /// Label given to freshly created visits before a guide is generated.
    pub default_audio_guide: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            registry_key: REGISTRY_KEY.to_string(),
            default_audio_guide: DEFAULT_AUDIO_GUIDE.to_string(),
        }
    }
}

/// Resolves, creates, and updates visit records against the ledger.
pub struct SyncEngine {
    ledger: Arc<dyn RecordLedger>,
    registry: KeyRegistry,
    config: SyncConfig,

    /// In-memory visit set, most recent first. Replaced wholesale by
    /// `load_all`; never mutated elsewhere.
    visits: RwLock<Vec<Visit>>,

    /// Advisory re-entrancy guard for `load_all`. Does not serialize
    /// writers against readers.
    refreshing: AtomicBool,
}

impl SyncEngine {
    pub fn new(ledger: Arc<dyn RecordLedger>) -> Self {
        Self::with_config(ledger, SyncConfig::default())
    }

    pub fn with_config(ledger: Arc<dyn RecordLedger>, config: SyncConfig) -> Self {
        let registry = KeyRegistry::with_key(Arc::clone(&ledger), config.registry_key.clone());
        Self {
            ledger,
            registry,
            config,
            visits: RwLock::new(Vec::new()),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Snapshot of the currently resolved visit set.
    pub fn visits(&self) -> Vec<Visit> {
        self.visits.read().clone()
    }

    /// Resolve the full visit set, most recent first.
    ///
    /// Fetches are sequential in registry order; a bad key never blocks the
    /// rest. Empty blobs are skipped, malformed blobs and per-key fetch
    /// errors are logged and skipped. If a load is already in flight the
    /// call returns the current snapshot unchanged.
    pub fn load_all(&self) -> Result<Vec<Visit>> {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            debug!("load already in flight, returning current snapshot");
            return Ok(self.visits());
        }
        let result = self.load_all_inner();
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    fn load_all_inner(&self) -> Result<Vec<Visit>> {
        if !self.ledger.is_available() {
            debug!("ledger unavailable, aborting load");
            return Err(SyncError::Unavailable);
        }

        let ids = self.registry.load()?;

        let mut resolved = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.fetch_visit(id) {
                Ok(Some(visit)) => resolved.push(visit),
                Ok(None) => {}
                Err(e) => warn!(id = %id, error = %e, "skipping unresolvable visit"),
            }
        }

        // Stable sort: ties keep registry order.
        resolved.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        *self.visits.write() = resolved.clone();
        Ok(resolved)
    }

    /// Fetch and decode one record. `None` means the key resolved to an
    /// empty blob (absent record).
    fn fetch_visit(&self, id: &VisitId) -> Result<Option<Visit>> {
        let bytes = self.ledger.get_data(&codec::record_key(id))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        codec::decode(id, &bytes).map(Some)
    }

    /// Record a new visit and return its id.
    ///
    /// The record commit and the registry append are independent commits.
    /// A record-commit failure aborts with the registry untouched; an
    /// append failure leaves the record orphaned (stored but never
    /// enumerable). The in-memory view is refreshed best-effort before
    /// returning.
    pub fn create(&self, draft: &VisitDraft, visitor: &AccountId) -> Result<VisitId> {
        let encrypted_path = fhe::seal(&draft.path, &draft.preferences);
        let id = VisitId::generate();

        let visit = Visit {
            id: id.clone(),
            encrypted_path,
            duration: draft.duration_minutes(),
            timestamp: Timestamp::now(),
            visitor: visitor.clone(),
            audio_guide: self.config.default_audio_guide.clone(),
        };

        let bytes = codec::encode(&visit)?;
        self.ledger.set_data(&codec::record_key(&id), &bytes)?;

        self.registry.append(&id)?;

        self.refresh_after_write();
        Ok(id)
    }

    /// Generate a fresh audio-guide label for an existing visit.
    ///
    /// Overwrites the record in place; the registry already references the
    /// key, so it is untouched.
    pub fn generate_guide(&self, id: &VisitId) -> Result<()> {
        let bytes = self.ledger.get_data(&codec::record_key(id))?;
        if bytes.is_empty() {
            return Err(SyncError::NotFound(id.clone()));
        }

        let mut visit = codec::decode(id, &bytes)?;
        visit.audio_guide = generate_guide_label();

        let updated = codec::encode(&visit)?;
        self.ledger.set_data(&codec::record_key(id), &updated)?;

        self.refresh_after_write();
        Ok(())
    }

    fn refresh_after_write(&self) {
        if let Err(e) = self.load_all() {
            debug!(error = %e, "post-write refresh failed");
        }
    }
}

fn generate_guide_label() -> String {
    format!("FHE-Generated Guide #{}", rand::thread_rng().gen_range(0..1000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    fn engine() -> (Arc<MemoryLedger>, SyncEngine) {
        let ledger = Arc::new(MemoryLedger::new());
        let engine = SyncEngine::new(ledger.clone() as Arc<dyn RecordLedger>);
        (ledger, engine)
    }

    #[test]
    fn test_empty_registry_yields_empty_set() {
        let (_ledger, engine) = engine();
        assert!(engine.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_create_then_enumerate() {
        let (_ledger, engine) = engine();
        let visitor = AccountId::from("0xAlice");
        let draft = VisitDraft::new("rodin, then the west wing", "50", "sculpture");

        let id = engine.create(&draft, &visitor).unwrap();

        let visits = engine.load_all().unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].id, id);
        assert_eq!(visits[0].duration, 50);
        assert_eq!(visits[0].visitor, visitor);
        assert_eq!(visits[0].audio_guide, DEFAULT_AUDIO_GUIDE);
        assert!(visits[0].encrypted_path.is_tagged());
    }

    #[test]
    fn test_unavailable_ledger_aborts_load() {
        let (ledger, engine) = engine();
        ledger.set_available(false);
        assert!(matches!(engine.load_all(), Err(SyncError::Unavailable)));
    }

    #[test]
    fn test_guard_returns_snapshot_while_refreshing() {
        let (_ledger, engine) = engine();
        engine
            .create(&VisitDraft::new("a", "10", ""), &AccountId::from("0xa"))
            .unwrap();

        engine.refreshing.store(true, Ordering::SeqCst);
        let snapshot = engine.load_all().unwrap();
        assert_eq!(snapshot, engine.visits());
        engine.refreshing.store(false, Ordering::SeqCst);
    }

    #[test]
    fn test_generate_guide_missing_record() {
        let (_ledger, engine) = engine();
        let result = engine.generate_guide(&VisitId::from("nope"));
        assert!(matches!(result, Err(SyncError::NotFound(_))));
    }

    #[test]
    fn test_generate_guide_overwrites_label_only() {
        let (_ledger, engine) = engine();
        let id = engine
            .create(&VisitDraft::new("the long gallery", "40", "dutch masters"), &AccountId::from("0xa"))
            .unwrap();
        let before = engine.visits()[0].clone();

        engine.generate_guide(&id).unwrap();

        let after = engine.visits()[0].clone();
        assert!(after.audio_guide.starts_with("FHE-Generated Guide #"));
        assert_eq!(after.encrypted_path, before.encrypted_path);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.visitor, before.visitor);
        assert_eq!(after.duration, before.duration);
    }
}
