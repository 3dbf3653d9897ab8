use std::sync::Arc;

use serde_json::Value;
use sqlx::types::Json;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::accounts::credential::{Claims, CredentialIssuer};
use crate::accounts::dto::NormalizedProfile;
use crate::accounts::provider::Provider;
use crate::accounts::referral::ReferralRecorder;
use crate::accounts::repo_types::{seed_skills, seed_social, Account};
use crate::store::{AccountStore, RewardNotifier};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// A lookup miss. Valid branch during resolution; only an error at the
    /// plain read endpoints.
    #[error("account not found")]
    NotFound,
    #[error("storage error: {0}")]
    Persistence(#[from] anyhow::Error),
    #[error("credential signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Outcome of one resolution: the persisted account plus a freshly minted
/// credential.
pub struct Resolution {
    pub account: Account,
    pub token: String,
    pub claims: Claims,
    pub created: bool,
}

impl Resolution {
    /// Response body: account fields shallow-merged under the credential.
    /// Credential fields win conflicts.
    pub fn merged_body(&self) -> Result<Value, serde_json::Error> {
        let mut body = serde_json::to_value(&self.account)?;
        if let Value::Object(map) = &mut body {
            map.insert("username".into(), Value::String(self.claims.username.clone()));
            map.insert("admin".into(), Value::Bool(self.claims.admin));
            map.insert(
                "email".into(),
                match &self.claims.email {
                    Some(email) => Value::String(email.clone()),
                    None => Value::Null,
                },
            );
            map.insert("authToken".into(), Value::String(self.token.clone()));
        }
        Ok(body)
    }
}

/// Find-or-create orchestration for social logins.
pub struct AccountResolver {
    store: Arc<dyn AccountStore>,
    recorder: Arc<ReferralRecorder>,
    issuer: CredentialIssuer,
}

impl AccountResolver {
    pub fn new(
        store: Arc<dyn AccountStore>,
        rewards: Arc<dyn RewardNotifier>,
        issuer: CredentialIssuer,
    ) -> Self {
        let recorder = Arc::new(ReferralRecorder::new(store.clone(), rewards));
        Self {
            store,
            recorder,
            issuer,
        }
    }

    /// Resolve a social login to an account and a fresh credential.
    ///
    /// Accounts are matched by email across all providers when the provider
    /// supplied one, otherwise by the (social id, provider) pair. Two
    /// concurrent first-time logins for the same email can both miss and
    /// both insert; that race is accepted, the store is not locked.
    pub async fn resolve(
        &self,
        provider: Provider,
        profile: NormalizedProfile,
        social_id: &str,
        referral_code: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let matches = match &profile.email {
            Some(email) => self.store.find_by_email(email).await?,
            None => {
                self.store
                    .find_by_social_id(social_id, provider.as_str())
                    .await?
            }
        };

        // More than one match is possible (same email via two providers,
        // or the duplicate-signup race). The first document wins; the store
        // gives no ordering guarantee.
        if let Some(account) = matches.into_iter().next() {
            let claims = Claims {
                email: profile.email.clone(),
                username: account.username.clone(),
                admin: account.admin || profile.admin,
            };
            let token = self.issuer.issue(&claims)?;
            info!(username = %account.username, provider = provider.as_str(), "existing account resolved");
            return Ok(Resolution {
                account,
                token,
                claims,
                created: false,
            });
        }

        let username = generate_username(self.store.as_ref(), &profile.name).await?;
        let claims = Claims {
            email: profile.email.clone(),
            username: username.clone(),
            admin: profile.admin,
        };
        let token = self.issuer.issue(&claims)?;

        let account = new_account(&profile, username, provider, social_id);
        let account = self.store.insert(account).await?;
        info!(username = %account.username, provider = provider.as_str(), "account created");

        // Referral bookkeeping is detached: the client gets its response
        // whether or not the append or the credit succeed.
        if let Some(code) = referral_code {
            self.recorder.dispatch(code, &account.username);
        }

        Ok(Resolution {
            account,
            token,
            claims,
            created: true,
        })
    }
}

/// Derive a free username from a display name.
///
/// The base strips the first space only and lower-cases the result (a
/// literal space-strip, not a slugify: "Ada Mary Lovelace" keeps its second
/// space). On collision a numeric suffix counts up until a candidate is
/// free. The loop is unbounded in theory, bounded by account count in
/// practice.
pub async fn generate_username(store: &dyn AccountStore, name: &str) -> anyhow::Result<String> {
    let base = name.replacen(' ', "", 1).to_lowercase();
    let mut counter: u32 = 0;
    loop {
        let candidate = if counter == 0 {
            base.clone()
        } else {
            format!("{base}{counter}")
        };
        if store.find_by_username(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Fetch an account by username, treating a miss as `NotFound`.
pub async fn account_by_username(
    store: &dyn AccountStore,
    username: &str,
) -> Result<Account, ResolveError> {
    store
        .find_by_username(username)
        .await?
        .ok_or(ResolveError::NotFound)
}

fn new_account(
    profile: &NormalizedProfile,
    username: String,
    provider: Provider,
    social_id: &str,
) -> Account {
    Account {
        id: Uuid::new_v4(),
        name: profile.name.clone(),
        username,
        email: profile.email.clone(),
        profile_pic: profile.profile_pic.clone(),
        provider: provider.as_str().to_string(),
        social_id: social_id.to_string(),
        admin: profile.admin,
        category: "dev".to_string(),
        city: None,
        country: None,
        skills: Json(seed_skills()),
        social: Json(seed_social()),
        event_ids: Json(Vec::new()),
        referrals: Json(Vec::new()),
        created_at: OffsetDateTime::now_utc(),
    }
}
