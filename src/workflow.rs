//! Transaction progress reporting.
//!
//! A single workflow instance covers every long-running, user-visible
//! operation. Starting a new operation while another result is still
//! displayed overwrites the visible state; nothing queues. The success and
//! error states auto-reset to idle after a fixed delay, modeled as a stored
//! deadline that [`TransactionWorkflow::poll_at`] applies; a superseding
//! `start` cancels any armed reset.

use crate::error::SyncError;
use std::time::{Duration, Instant};
use tracing::warn;

/// How long a success result stays visible.
pub const SUCCESS_VISIBLE: Duration = Duration::from_millis(2000);

/// How long an error result stays visible.
pub const ERROR_VISIBLE: Duration = Duration::from_millis(3000);

/// Canonical message surfaced when the acting identity declines a write.
pub const REJECTED_MESSAGE: &str = "Transaction rejected by user";

/// User-visible state of the current (or last) operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    Idle,
    Pending(String),
    Success(String),
    Error(String),
}

impl TransactionStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, TransactionStatus::Idle)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            TransactionStatus::Idle => None,
            TransactionStatus::Pending(m)
            | TransactionStatus::Success(m)
            | TransactionStatus::Error(m) => Some(m),
        }
    }
}

/// Finite-state progress reporter with timed auto-reset.
pub struct TransactionWorkflow {
    status: TransactionStatus,
    reset_at: Option<Instant>,
}

impl TransactionWorkflow {
    pub fn new() -> Self {
        Self {
            status: TransactionStatus::Idle,
            reset_at: None,
        }
    }

    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    /// Begin reporting a new operation. Valid from any state; cancels a
    /// pending auto-reset and overwrites whatever was displayed.
    pub fn start(&mut self, message: impl Into<String>) {
        self.status = TransactionStatus::Pending(message.into());
        self.reset_at = None;
    }

    /// Report success for the pending operation; resets to idle after
    /// [`SUCCESS_VISIBLE`].
    pub fn succeed(&mut self, message: impl Into<String>) {
        self.finish(TransactionStatus::Success(message.into()), SUCCESS_VISIBLE);
    }

    /// Report failure for the pending operation; resets to idle after
    /// [`ERROR_VISIBLE`].
    pub fn fail(&mut self, message: impl Into<String>) {
        self.finish(TransactionStatus::Error(message.into()), ERROR_VISIBLE);
    }

    /// Report failure, deriving the message from the underlying error: a
    /// user rejection surfaces the canonical rejection string, anything
    /// else a `<context>: <reason>` string.
    pub fn fail_with(&mut self, context: &str, error: &SyncError) {
        let message = if error.is_user_rejection() {
            REJECTED_MESSAGE.to_string()
        } else {
            format!("{}: {}", context, error)
        };
        self.fail(message);
    }

    fn finish(&mut self, status: TransactionStatus, visible_for: Duration) {
        if !matches!(self.status, TransactionStatus::Pending(_)) {
            warn!(?status, "transaction result without a pending operation, ignoring");
            return;
        }
        self.status = status;
        self.reset_at = Some(Instant::now() + visible_for);
    }

    /// Apply a due auto-reset. Returns true if the workflow transitioned
    /// back to idle on this call.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Apply a due auto-reset as of `now`.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.reset_at {
            Some(deadline) if now >= deadline => {
                self.status = TransactionStatus::Idle;
                self.reset_at = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for TransactionWorkflow {
    fn default() -> Self {
        Self::new()
    }
}
