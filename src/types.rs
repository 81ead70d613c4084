//! Core types for the visit ledger.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Minutes assumed for a visit whose duration input does not parse.
pub const DEFAULT_DURATION_MIN: u32 = 30;

/// Placeholder guide label assigned at creation, before a guide is generated.
pub const DEFAULT_AUDIO_GUIDE: &str = "Generated with FHE";

/// Unique identifier for a visit.
///
/// Client-generated as `<creation-epoch-ms>-<random-suffix>`; unique by
/// construction and never reused.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitId(pub String);

impl VisitId {
    /// Generate a fresh id from the current time and a random suffix.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis();
        let suffix: [u8; 4] = rand::thread_rng().gen();
        VisitId(format!("{}-{}", millis, hex::encode(suffix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for display labels.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..self.0.len().min(len)]
    }
}

impl fmt::Debug for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VisitId({})", self.0)
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VisitId {
    fn from(s: &str) -> Self {
        VisitId(s.to_string())
    }
}

/// Account identifier of the acting identity.
///
/// Ownership comparisons are case-insensitive, matching how ledger
/// addresses are displayed in mixed case but compared canonically.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive identity comparison.
    pub fn same_as(&self, other: &AccountId) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_string())
    }
}

/// Seconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Timestamp(duration.as_secs() as i64)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// Opaque ciphertext produced by the external encryption capability.
///
/// Tagged with a scheme marker; the content is never interpreted by this
/// crate. Only the real encryption service may decode it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(pub(crate) String);

impl Ciphertext {
    /// Scheme marker identifying the encryption version.
    pub const SCHEME_TAG: &'static str = "FHE-";

    /// Wrap an already-tagged blob (e.g. read back from the ledger).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Ciphertext(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the blob carries the current scheme marker.
    pub fn is_tagged(&self) -> bool {
        self.0.starts_with(Self::SCHEME_TAG)
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Opaque by contract: show the tag, redact the payload.
        write!(f, "Ciphertext({}...)", &self.0[..self.0.len().min(8)])
    }
}

/// A record of one museum visit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    /// Unique identifier (client-assigned).
    pub id: VisitId,

    /// Opaque ciphertext of the visit path; never decoded here.
    pub encrypted_path: Ciphertext,

    /// Stay duration in minutes.
    pub duration: u32,

    /// When the visit was recorded. Immutable after creation.
    pub timestamp: Timestamp,

    /// Account that created the record. Immutable after creation.
    pub visitor: AccountId,

    /// Audio guide label; overwritten by the generate-guide path.
    pub audio_guide: String,
}

/// Input for recording a new visit (before id/timestamp are assigned).
#[derive(Clone, Debug, Default)]
pub struct VisitDraft {
    /// Plaintext description of the exhibits visited, in order.
    pub path: String,

    /// Raw duration input; parsed leniently at creation time.
    pub duration: String,

    /// Free-form visitor preferences fed to the encryption stub.
    pub preferences: String,
}

impl VisitDraft {
    pub fn new(
        path: impl Into<String>,
        duration: impl Into<String>,
        preferences: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            duration: duration.into(),
            preferences: preferences.into(),
        }
    }

    /// Duration in minutes, falling back to the default when the raw
    /// input does not parse as a positive integer.
    pub fn duration_minutes(&self) -> u32 {
        match self.duration.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => DEFAULT_DURATION_MIN,
        }
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.duration.clear();
        self.preferences.clear();
    }
}
