use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::async_trait;

use crate::accounts::repo_types::{Account, Referral};

/// Seam to the account document store. The Postgres implementation lives in
/// `accounts::repo`; `MemoryAccountStore` below backs `AppState::fake()` and
/// unit tests.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// All accounts with the given email, regardless of provider.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Vec<Account>>;
    /// All accounts with the given (social id, provider) pair.
    async fn find_by_social_id(&self, social_id: &str, provider: &str)
        -> anyhow::Result<Vec<Account>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Account>>;
    async fn insert(&self, account: Account) -> anyhow::Result<Account>;
    /// Atomic list append on the referrer's `referrals` field. Must not be a
    /// read-modify-write of the whole document.
    async fn append_referral(&self, username: &str, referral: Referral) -> anyhow::Result<()>;
}

/// Seam to the reward-point ledger. The core only ever credits; ledger
/// internals are out of scope.
#[async_trait]
pub trait RewardNotifier: Send + Sync {
    async fn credit(&self, username: &str, amount: i64, reason: &str) -> anyhow::Result<()>;
}

/// In-memory account store. Mutex-guarded, so the referral append is atomic
/// the same way the jsonb concat is in Postgres.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    inserts: AtomicUsize,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `insert` calls so far.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Vec<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|a| a.email.as_deref() == Some(email))
            .cloned()
            .collect())
    }

    async fn find_by_social_id(
        &self,
        social_id: &str,
        provider: &str,
    ) -> anyhow::Result<Vec<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|a| a.social_id == social_id && a.provider == provider)
            .cloned()
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn insert(&self, account: Account) -> anyhow::Result<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        self.inserts.fetch_add(1, Ordering::SeqCst);
        accounts.push(account.clone());
        Ok(account)
    }

    async fn append_referral(&self, username: &str, referral: Referral) -> anyhow::Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.username == username) {
            account.referrals.0.push(referral);
        }
        Ok(())
    }
}

/// In-memory reward ledger recording every credit call.
#[derive(Default)]
pub struct MemoryRewardLedger {
    credits: Mutex<Vec<(String, i64, String)>>,
}

impl MemoryRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credits(&self) -> Vec<(String, i64, String)> {
        self.credits.lock().unwrap().clone()
    }
}

#[async_trait]
impl RewardNotifier for MemoryRewardLedger {
    async fn credit(&self, username: &str, amount: i64, reason: &str) -> anyhow::Result<()> {
        self.credits
            .lock()
            .unwrap()
            .push((username.to_string(), amount, reason.to_string()));
        Ok(())
    }
}
