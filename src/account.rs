//! Identity provider boundary.
//!
//! The wallet/account selection UI lives outside this crate; what the core
//! needs is the ordered account list (first entry active) and a stream of
//! account-change notifications that can arrive at any time, independent of
//! in-flight operations.

use crate::error::Result;
use crate::types::AccountId;
use crossbeam_channel::Receiver;

/// Contract required of the identity provider.
pub trait AccountProvider: Send + Sync {
    /// Request the ordered account list. The first entry is the active
    /// account; an empty string means none.
    fn request_accounts(&self) -> Result<Vec<AccountId>>;

    /// Stream of active-account changes.
    fn subscribe_changes(&self) -> Receiver<AccountId>;
}

/// Fixed-account provider for tests and local development.
pub struct StaticAccounts {
    accounts: Vec<AccountId>,
    sender: crossbeam_channel::Sender<AccountId>,
    receiver: Receiver<AccountId>,
}

impl StaticAccounts {
    pub fn new(accounts: Vec<AccountId>) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(16);
        Self {
            accounts,
            sender,
            receiver,
        }
    }

    pub fn single(account: impl Into<AccountId>) -> Self {
        Self::new(vec![account.into()])
    }

    /// Push an account change into the stream, as a wallet switch would.
    pub fn switch_to(&self, account: impl Into<AccountId>) {
        let _ = self.sender.try_send(account.into());
    }
}

impl AccountProvider for StaticAccounts {
    fn request_accounts(&self) -> Result<Vec<AccountId>> {
        Ok(self.accounts.clone())
    }

    fn subscribe_changes(&self) -> Receiver<AccountId> {
        self.receiver.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_accounts_first_is_active() {
        let provider = StaticAccounts::new(vec![AccountId::from("0xa"), AccountId::from("0xb")]);
        let accounts = provider.request_accounts().unwrap();
        assert_eq!(accounts[0], AccountId::from("0xa"));
    }

    #[test]
    fn test_change_stream_delivers() {
        let provider = StaticAccounts::single("0xa");
        let changes = provider.subscribe_changes();
        provider.switch_to("0xb");
        assert_eq!(changes.try_recv().unwrap(), AccountId::from("0xb"));
    }
}
