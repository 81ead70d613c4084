//! Owned application state with an update/subscribe contract.
//!
//! Composes the sync engine, the transaction workflow, the active account,
//! and the in-progress creation draft behind one object; no ambient
//! globals. Interested parties subscribe for [`AppEvent`]s over bounded
//! channels; slow subscribers are dropped rather than blocking updates.

use crate::account::AccountProvider;
use crate::engine::SyncEngine;
use crate::error::{Result, SyncError};
use crate::types::{AccountId, Visit, VisitDraft, VisitId};
use crate::views::{self, VisitStats};
use crate::workflow::{TransactionStatus, TransactionWorkflow};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Pending-status message shown while a visit is being submitted.
pub const SUBMIT_PENDING: &str = "Encrypting museum path with Zama FHE...";

/// Status message shown once a visit submission commits.
pub const SUBMIT_SUCCESS: &str = "Encrypted visit submitted securely!";

/// Pending-status message shown while a guide is generated.
pub const GUIDE_PENDING: &str = "Generating personalized audio guide with FHE...";

/// Status message shown once a guide lands.
pub const GUIDE_SUCCESS: &str = "Personalized audio guide generated with FHE!";

/// Default per-subscriber event buffer.
const DEFAULT_BUFFER_SIZE: usize = 64;

/// Events broadcast to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    /// Active account changed (`None` = disconnected).
    AccountChanged(Option<AccountId>),

    /// The visit set was re-resolved from the ledger.
    VisitsRefreshed { count: usize },

    /// The transaction status changed.
    Transaction(TransactionStatus),
}

/// Application state: account, visit set, draft, and transaction status.
pub struct AppState {
    engine: Arc<SyncEngine>,
    workflow: Mutex<TransactionWorkflow>,
    account: RwLock<Option<AccountId>>,
    draft: Mutex<VisitDraft>,
    account_changes: Mutex<Option<Receiver<AccountId>>>,
    subscribers: Mutex<Vec<Sender<AppEvent>>>,
}

impl AppState {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            workflow: Mutex::new(TransactionWorkflow::new()),
            account: RwLock::new(None),
            draft: Mutex::new(VisitDraft::default()),
            account_changes: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    // --- Subscriptions ---

    /// Subscribe to state updates. A subscriber whose buffer overflows is
    /// silently dropped on the next broadcast.
    pub fn subscribe(&self) -> Receiver<AppEvent> {
        let (sender, receiver) = bounded(DEFAULT_BUFFER_SIZE);
        self.subscribers.lock().push(sender);
        receiver
    }

    fn broadcast(&self, event: AppEvent) {
        self.subscribers
            .lock()
            .retain(|sender| sender.try_send(event.clone()).is_ok());
    }

    // --- Account ---

    /// Connect through an identity provider: adopt its first account (or
    /// none) and retain its change stream for `poll` to drain.
    pub fn connect(&self, provider: &dyn AccountProvider) -> Result<()> {
        let accounts = provider.request_accounts()?;
        let active = accounts.into_iter().next().filter(|a| !a.is_empty());

        *self.account.write() = active.clone();
        *self.account_changes.lock() = Some(provider.subscribe_changes());

        self.broadcast(AppEvent::AccountChanged(active));
        Ok(())
    }

    pub fn disconnect(&self) {
        *self.account.write() = None;
        *self.account_changes.lock() = None;
        self.broadcast(AppEvent::AccountChanged(None));
    }

    pub fn account(&self) -> Option<AccountId> {
        self.account.read().clone()
    }

    /// Whether the active account created the given visit.
    pub fn is_owner(&self, visit: &Visit) -> bool {
        self.account
            .read()
            .as_ref()
            .map(|a| a.same_as(&visit.visitor))
            .unwrap_or(false)
    }

    // --- Draft ---

    pub fn draft(&self) -> VisitDraft {
        self.draft.lock().clone()
    }

    pub fn update_draft(&self, draft: VisitDraft) {
        *self.draft.lock() = draft;
    }

    // --- Operations ---

    /// Re-resolve the visit set. An unavailable ledger is swallowed
    /// silently and the previous set stays visible.
    pub fn refresh(&self) {
        match self.engine.load_all() {
            Ok(visits) => self.broadcast(AppEvent::VisitsRefreshed {
                count: visits.len(),
            }),
            Err(e) => debug!(error = %e, "refresh failed"),
        }
    }

    /// Submit the current draft as a new visit, reporting progress through
    /// the transaction workflow.
    pub fn submit_visit(&self) -> Result<VisitId> {
        let visitor = self.account().ok_or(SyncError::NoAccount)?;
        let draft = self.draft();

        self.transition(|w| w.start(SUBMIT_PENDING));

        match self.engine.create(&draft, &visitor) {
            Ok(id) => {
                self.transition(|w| w.succeed(SUBMIT_SUCCESS));
                self.broadcast(AppEvent::VisitsRefreshed {
                    count: self.engine.visits().len(),
                });
                Ok(id)
            }
            Err(e) => {
                self.transition(|w| w.fail_with("Submission failed", &e));
                Err(e)
            }
        }
    }

    /// Generate a fresh audio guide for a visit, reporting progress
    /// through the transaction workflow.
    pub fn generate_guide(&self, id: &VisitId) -> Result<()> {
        if self.account().is_none() {
            return Err(SyncError::NoAccount);
        }

        self.transition(|w| w.start(GUIDE_PENDING));

        match self.engine.generate_guide(id) {
            Ok(()) => {
                self.transition(|w| w.succeed(GUIDE_SUCCESS));
                self.broadcast(AppEvent::VisitsRefreshed {
                    count: self.engine.visits().len(),
                });
                Ok(())
            }
            Err(e) => {
                self.transition(|w| w.fail_with("Generation failed", &e));
                Err(e)
            }
        }
    }

    pub fn transaction_status(&self) -> TransactionStatus {
        self.workflow.lock().status().clone()
    }

    fn transition(&self, f: impl FnOnce(&mut TransactionWorkflow)) {
        let mut workflow = self.workflow.lock();
        f(&mut workflow);
        let status = workflow.status().clone();
        drop(workflow);
        self.broadcast(AppEvent::Transaction(status));
    }

    // --- Ticking ---

    /// Drive time-based behavior: drain pending account changes and fire a
    /// due transaction auto-reset. Call from the UI loop.
    pub fn poll(&self) {
        self.poll_at(Instant::now());
    }

    /// As `poll`, with an explicit clock reading.
    pub fn poll_at(&self, now: Instant) {
        self.drain_account_changes();

        let mut workflow = self.workflow.lock();
        let was_success = matches!(workflow.status(), TransactionStatus::Success(_));
        if workflow.poll_at(now) {
            drop(workflow);
            // A successful submission's form state is cleared once its
            // result stops being displayed.
            if was_success {
                self.draft.lock().clear();
            }
            self.broadcast(AppEvent::Transaction(TransactionStatus::Idle));
        }
    }

    fn drain_account_changes(&self) {
        let changes = self.account_changes.lock();
        let Some(receiver) = changes.as_ref() else {
            return;
        };

        let mut latest = None;
        while let Ok(account) = receiver.try_recv() {
            latest = Some(account);
        }
        drop(changes);

        if let Some(account) = latest {
            let active = Some(account).filter(|a| !a.is_empty());
            *self.account.write() = active.clone();
            self.broadcast(AppEvent::AccountChanged(active));
        }
    }

    // --- Views ---

    pub fn stats(&self) -> VisitStats {
        views::aggregate(&self.engine.visits())
    }

    pub fn search(&self, term: &str) -> Vec<Visit> {
        let visits = self.engine.visits();
        views::filter(&visits, term).into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::StaticAccounts;
    use crate::ledger::{MemoryLedger, RecordLedger};
    use crate::workflow::SUCCESS_VISIBLE;

    fn app() -> AppState {
        let ledger = Arc::new(MemoryLedger::new());
        AppState::new(Arc::new(SyncEngine::new(ledger as Arc<dyn RecordLedger>)))
    }

    #[test]
    fn test_submit_requires_account() {
        let app = app();
        app.update_draft(VisitDraft::new("path", "30", ""));
        assert!(matches!(app.submit_visit(), Err(SyncError::NoAccount)));
        assert!(app.transaction_status().is_idle());
    }

    #[test]
    fn test_connect_adopts_first_account() {
        let app = app();
        let provider = StaticAccounts::new(vec![AccountId::from("0xA"), AccountId::from("0xB")]);
        app.connect(&provider).unwrap();
        assert_eq!(app.account(), Some(AccountId::from("0xA")));
    }

    #[test]
    fn test_connect_with_no_accounts_stays_disconnected() {
        let app = app();
        let provider = StaticAccounts::new(vec![]);
        app.connect(&provider).unwrap();
        assert_eq!(app.account(), None);
    }

    #[test]
    fn test_account_change_stream_updates_active() {
        let app = app();
        let provider = StaticAccounts::single("0xA");
        app.connect(&provider).unwrap();

        provider.switch_to("0xB");
        app.poll();
        assert_eq!(app.account(), Some(AccountId::from("0xB")));
    }

    #[test]
    fn test_submit_reports_success_and_clears_draft_on_reset() {
        let app = app();
        app.connect(&StaticAccounts::single("0xA")).unwrap();
        app.update_draft(VisitDraft::new("marble court", "45", "antiquity"));

        app.submit_visit().unwrap();
        assert_eq!(
            app.transaction_status(),
            TransactionStatus::Success(SUBMIT_SUCCESS.into())
        );
        assert_eq!(app.draft().path, "marble court");

        app.poll_at(Instant::now() + SUCCESS_VISIBLE);
        assert!(app.transaction_status().is_idle());
        assert!(app.draft().path.is_empty());
    }

    #[test]
    fn test_subscriber_sees_events() {
        let app = app();
        let events = app.subscribe();
        app.connect(&StaticAccounts::single("0xA")).unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            AppEvent::AccountChanged(Some(AccountId::from("0xA")))
        );
    }

    #[test]
    fn test_slow_subscriber_is_dropped() {
        let app = app();
        let _events = app.subscribe();

        for _ in 0..DEFAULT_BUFFER_SIZE + 1 {
            app.broadcast(AppEvent::VisitsRefreshed { count: 0 });
        }
        assert!(app.subscribers.lock().is_empty());
    }

    #[test]
    fn test_is_owner_ignores_case() {
        let app = app();
        app.connect(&StaticAccounts::single("0xABCD")).unwrap();
        app.update_draft(VisitDraft::new("p", "30", ""));

        // Stored visitor keeps the connected account's casing.
        app.submit_visit().unwrap();
        app.refresh();

        let visit = app.engine().visits()[0].clone();
        assert!(app.is_owner(&visit));

        app.disconnect();
        assert!(!app.is_owner(&visit));
    }
}
