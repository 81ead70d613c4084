//! Append-only key registry.
//!
//! The ledger has no native listing, so the ordered set of all visit ids is
//! kept as a single JSON blob under a well-known key. Appending is a
//! read-modify-write over the whole list; two concurrent appends can race
//! and one addition can be lost. That limitation is accepted here (callers
//! wanting more must serialize registry writers themselves).

use crate::error::Result;
use crate::ledger::RecordLedger;
use crate::types::VisitId;
use std::sync::Arc;
use tracing::warn;

/// Well-known key the id list lives under.
pub const REGISTRY_KEY: &str = "visit_keys";

/// Ordered registry of visit ids, persisted as one JSON array.
pub struct KeyRegistry {
    ledger: Arc<dyn RecordLedger>,
    key: String,
}

impl KeyRegistry {
    pub fn new(ledger: Arc<dyn RecordLedger>) -> Self {
        Self::with_key(ledger, REGISTRY_KEY)
    }

    pub fn with_key(ledger: Arc<dyn RecordLedger>, key: impl Into<String>) -> Self {
        Self {
            ledger,
            key: key.into(),
        }
    }

    /// Load the full id sequence.
    ///
    /// Absent or empty blob is an empty sequence, not an error. A present
    /// but malformed blob also degrades to empty: the registry then reads
    /// as "no visits" instead of failing loudly. Fetch errors propagate.
    pub fn load(&self) -> Result<Vec<VisitId>> {
        let bytes = self.ledger.get_data(&self.key)?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(ids) => Ok(ids.into_iter().map(VisitId).collect()),
            Err(e) => {
                warn!(key = %self.key, error = %e, "malformed key registry, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Append one id and persist the whole list back.
    ///
    /// Not atomic: a concurrent append that read the same prior state will
    /// overwrite this one (lost update). A malformed prior blob was already
    /// degraded to empty by `load`, so the rewrite drops it entirely.
    pub fn append(&self, id: &VisitId) -> Result<()> {
        let mut ids = self.load()?;
        ids.push(id.clone());

        let raw: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        let bytes = serde_json::to_vec(&raw)?;
        self.ledger.set_data(&self.key, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    fn registry() -> (Arc<MemoryLedger>, KeyRegistry) {
        let ledger = Arc::new(MemoryLedger::new());
        let registry = KeyRegistry::new(ledger.clone() as Arc<dyn RecordLedger>);
        (ledger, registry)
    }

    #[test]
    fn test_empty_registry_loads_empty() {
        let (_ledger, registry) = registry();
        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let (_ledger, registry) = registry();
        registry.append(&VisitId::from("a")).unwrap();
        registry.append(&VisitId::from("b")).unwrap();
        registry.append(&VisitId::from("c")).unwrap();

        let ids = registry.load().unwrap();
        assert_eq!(ids, vec!["a".into(), "b".into(), "c".into()]);
    }

    #[test]
    fn test_malformed_registry_degrades_to_empty() {
        let (ledger, registry) = registry();
        ledger.set_data(REGISTRY_KEY, b"not json at all").unwrap();
        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_over_malformed_registry_rewrites_it() {
        let (ledger, registry) = registry();
        ledger.set_data(REGISTRY_KEY, b"{{{{").unwrap();

        registry.append(&VisitId::from("fresh")).unwrap();

        let ids = registry.load().unwrap();
        assert_eq!(ids, vec!["fresh".into()]);
    }
}
