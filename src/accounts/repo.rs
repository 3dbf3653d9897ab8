use axum::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::accounts::repo_types::{Account, Referral};
use crate::store::AccountStore;

const ACCOUNT_COLUMNS: &str = r#"id, name, username, email, profile_pic, provider, social_id, admin,
category, city, country, skills, social, event_ids, referrals, created_at"#;

/// Postgres-backed account store.
#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        Ok(accounts)
    }

    async fn find_by_social_id(
        &self,
        social_id: &str,
        provider: &str,
    ) -> anyhow::Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE social_id = $1 AND provider = $2"
        ))
        .bind(social_id)
        .bind(provider)
        .fetch_all(&self.db)
        .await?;
        Ok(accounts)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn insert(&self, account: Account) -> anyhow::Result<Account> {
        let inserted = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO users (id, name, username, email, profile_pic, provider, social_id,
                               admin, category, city, country, skills, social, event_ids,
                               referrals, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.profile_pic)
        .bind(&account.provider)
        .bind(&account.social_id)
        .bind(account.admin)
        .bind(&account.category)
        .bind(&account.city)
        .bind(&account.country)
        .bind(&account.skills)
        .bind(&account.social)
        .bind(&account.event_ids)
        .bind(&account.referrals)
        .bind(account.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(inserted)
    }

    async fn append_referral(&self, username: &str, referral: Referral) -> anyhow::Result<()> {
        // Single-statement jsonb concat: concurrent appends on the same
        // referrer cannot lose updates.
        sqlx::query(
            r#"
            UPDATE users
            SET referrals = referrals || jsonb_build_array($2::jsonb)
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(Json(referral))
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
