use axum::async_trait;
use sqlx::PgPool;

use crate::store::RewardNotifier;

/// Postgres-backed reward ledger: every credit appends one row.
#[derive(Clone)]
pub struct PgRewardLedger {
    db: PgPool,
}

impl PgRewardLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RewardNotifier for PgRewardLedger {
    async fn credit(&self, username: &str, amount: i64, reason: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reward_points (username, points, reason)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(username)
        .bind(amount)
        .bind(reason)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
