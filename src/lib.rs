//! # Docent
//!
//! A client-side sync engine for encrypted museum-visit records held
//! behind a remote key-value ledger.
//!
//! The ledger offers only independent get/set on opaque byte blobs, with
//! no listing and no multi-key transactions, so enumeration rides on an
//! append-only key registry, and every write is a best-effort pair of
//! independent commits. A single transaction workflow reports progress,
//! success, and failure for the user-visible operations.
//!
//! ## Core Concepts
//!
//! - **Records**: per-visit JSON blobs under `visit_<id>`, opaque to the ledger
//! - **Registry**: the ordered id list under `visit_keys`, the sole enumeration path
//! - **Engine**: resolves the full visit set and drives the create/update writes
//! - **Workflow**: `Idle → Pending → Success/Error` with timed auto-reset
//!
//! ## Example
//!
//! ```ignore
//! use docent::{AppState, MemoryLedger, SyncEngine, VisitDraft};
//! use std::sync::Arc;
//!
//! let ledger = Arc::new(MemoryLedger::new());
//! let app = AppState::new(Arc::new(SyncEngine::new(ledger)));
//!
//! app.connect(&wallet)?;
//! app.update_draft(VisitDraft::new("rodin, then the west wing", "50", "sculpture"));
//! let id = app.submit_visit()?;
//!
//! for visit in app.search("guide") {
//!     println!("{}: {} min", visit.id, visit.duration);
//! }
//! ```

pub mod account;
pub mod app;
pub mod codec;
pub mod engine;
pub mod error;
pub mod fhe;
pub mod ledger;
pub mod registry;
pub mod types;
pub mod views;
pub mod workflow;

// Re-exports
pub use account::{AccountProvider, StaticAccounts};
pub use app::{AppEvent, AppState};
pub use engine::{SyncConfig, SyncEngine};
pub use error::{Result, SyncError, USER_REJECTION_MARKER};
pub use ledger::{MemoryLedger, RecordLedger};
pub use registry::{KeyRegistry, REGISTRY_KEY};
pub use types::*;
pub use views::{aggregate, duration_chart, filter, ChartBar, VisitStats};
pub use workflow::{TransactionStatus, TransactionWorkflow};
