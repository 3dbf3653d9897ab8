use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::accounts::repo_types::Referral;
use crate::store::{AccountStore, RewardNotifier};

pub const REFERRAL_REWARD_POINTS: i64 = 100;

/// Appends referral records to the referrer's account and credits reward
/// points. Runs detached from the resolution request; nothing here can fail
/// an account creation that already succeeded.
pub struct ReferralRecorder {
    store: Arc<dyn AccountStore>,
    rewards: Arc<dyn RewardNotifier>,
}

impl ReferralRecorder {
    pub fn new(store: Arc<dyn AccountStore>, rewards: Arc<dyn RewardNotifier>) -> Self {
        Self { store, rewards }
    }

    /// Spawn `record` on the runtime and return immediately. The caller
    /// never awaits the outcome.
    pub fn dispatch(self: &Arc<Self>, referrer: &str, new_username: &str) {
        let recorder = Arc::clone(self);
        let referrer = referrer.to_string();
        let new_username = new_username.to_string();
        tokio::spawn(async move {
            recorder.record(&referrer, &new_username).await;
        });
    }

    /// Best-effort: errors are logged and swallowed. Returns whether a
    /// referral was recorded.
    pub async fn record(&self, referrer: &str, new_username: &str) -> bool {
        match self.try_record(referrer, new_username).await {
            Ok(recorded) => recorded,
            Err(err) => {
                warn!(error = %err, referrer, new_username, "referral bookkeeping failed");
                false
            }
        }
    }

    async fn try_record(&self, referrer: &str, new_username: &str) -> anyhow::Result<bool> {
        // The client sends the literal string "null" when no referral code
        // was present. External contract quirk: an account actually named
        // "null" could never be credited.
        if referrer == "null" {
            return Ok(false);
        }

        let referral = Referral {
            username: new_username.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.store.append_referral(referrer, referral).await?;
        debug!(referrer, new_username, "referral recorded");

        let reason = format!("Credited for {new_username}'s Referral");
        self.rewards
            .credit(referrer, REFERRAL_REWARD_POINTS, &reason)
            .await?;
        Ok(true)
    }
}
