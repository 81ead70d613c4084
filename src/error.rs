//! Error types for the sync engine.

use crate::types::VisitId;
use thiserror::Error;

/// Substring a ledger puts in a commit reason when the acting identity
/// declined the write.
pub const USER_REJECTION_MARKER: &str = "user rejected transaction";

/// Main error type for sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("ledger unavailable")]
    Unavailable,

    #[error("parse failure: {0}")]
    Parse(String),

    #[error("transaction rejected: {0}")]
    CommitRejected(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("visit not found: {0}")]
    NotFound(VisitId),

    #[error("no account connected")]
    NoAccount,

    #[error("ledger io: {0}")]
    Io(String),
}

impl SyncError {
    /// Classify a commit failure by its human-readable reason.
    ///
    /// Reasons carrying the user-rejection marker become `CommitRejected`;
    /// everything else is a generic `CommitFailed`.
    pub fn commit(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason.contains(USER_REJECTION_MARKER) {
            SyncError::CommitRejected(reason)
        } else {
            SyncError::CommitFailed(reason)
        }
    }

    /// True when the acting identity declined the write.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, SyncError::CommitRejected(_))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Parse(e.to_string())
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
