//! Credits ledger backed by SQLite.
//!
//! The decrement is a single atomic conditional update so concurrent
//! requests for the same user cannot race past the balance check.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{IdealensError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub plan_id: String,
    pub credits: i64,
    pub active: bool,
    pub last_renewed: i64, // unix seconds
}

#[derive(Clone)]
pub struct CreditStore {
    pool: SqlitePool,
}

impl CreditStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables if missing (idempotent).
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id           TEXT PRIMARY KEY,
                email        TEXT NOT NULL UNIQUE,
                plan_id      TEXT NOT NULL DEFAULT 'free',
                credits      INTEGER NOT NULL DEFAULT 0,
                active       INTEGER NOT NULL DEFAULT 1,
                last_renewed INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS usage_logs (
                id                TEXT PRIMARY KEY,
                user_id           TEXT NOT NULL,
                used_at           INTEGER NOT NULL,
                tokens_used       INTEGER NOT NULL DEFAULT 0,
                credits_remaining INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_usage_user ON usage_logs(user_id);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_or_create_user(&self, email: &str) -> Result<UserAccount> {
        if let Some(user) = self.find_by_email(email).await? {
            return Ok(user);
        }
        let user = UserAccount {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            plan_id: "free".to_string(),
            credits: 0,
            active: true,
            last_renewed: chrono::Utc::now().timestamp(),
        };
        sqlx::query(
            "INSERT INTO users (id, email, plan_id, credits, active, last_renewed) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.plan_id)
        .bind(user.credits)
        .bind(user.active)
        .bind(user.last_renewed)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query(
            "SELECT id, email, plan_id, credits, active, last_renewed FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| UserAccount {
            id: r.get("id"),
            email: r.get("email"),
            plan_id: r.get("plan_id"),
            credits: r.get("credits"),
            active: r.get::<i64, _>("active") != 0,
            last_renewed: r.get("last_renewed"),
        }))
    }

    pub async fn balance(&self, user_id: &str) -> Result<i64> {
        let row = sqlx::query("SELECT credits FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => Ok(r.get("credits")),
            None => Err(IdealensError::Validation {
                message: format!("unknown user '{}'", user_id),
            }),
        }
    }

    /// Consume one credit. The conditional update is the concurrency guard:
    /// zero rows affected means the balance was already below one.
    pub async fn consume_credit(&self, user_id: &str, tokens_used: i64) -> Result<i64> {
        let result =
            sqlx::query("UPDATE users SET credits = credits - 1 WHERE id = ? AND credits >= 1")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(IdealensError::InsufficientCredits {
                user_id: user_id.to_string(),
            });
        }

        let remaining = self.balance(user_id).await?;
        sqlx::query(
            "INSERT INTO usage_logs (id, user_id, used_at, tokens_used, credits_remaining) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(chrono::Utc::now().timestamp())
        .bind(tokens_used)
        .bind(remaining)
        .execute(&self.pool)
        .await?;

        Ok(remaining)
    }

    /// Credit a user after a verified payment. Creates the account if the
    /// checkout email has never been seen.
    pub async fn grant_credits(&self, email: &str, plan_id: &str, credits: i64) -> Result<i64> {
        let user = self.get_or_create_user(email).await?;
        sqlx::query(
            "UPDATE users SET credits = credits + ?, plan_id = ?, active = 1, last_renewed = ? \
             WHERE id = ?",
        )
        .bind(credits)
        .bind(plan_id)
        .bind(chrono::Utc::now().timestamp())
        .bind(&user.id)
        .execute(&self.pool)
        .await?;
        self.balance(&user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> CreditStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = CreditStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn consume_decrements_and_logs() {
        let store = memory_store().await;
        let balance = store.grant_credits("a@example.com", "starter", 2).await.unwrap();
        assert_eq!(balance, 2);

        let user = store.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(store.consume_credit(&user.id, 1200).await.unwrap(), 1);
        assert_eq!(store.consume_credit(&user.id, 900).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn consume_at_zero_is_insufficient_credits() {
        let store = memory_store().await;
        let user = store.get_or_create_user("b@example.com").await.unwrap();
        let err = store.consume_credit(&user.id, 0).await.unwrap_err();
        assert!(matches!(err, IdealensError::InsufficientCredits { .. }));
        // Balance untouched by the failed decrement.
        assert_eq!(store.balance(&user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn grant_upgrades_plan() {
        let store = memory_store().await;
        store.grant_credits("c@example.com", "pro", 50).await.unwrap();
        let user = store.find_by_email("c@example.com").await.unwrap().unwrap();
        assert_eq!(user.plan_id, "pro");
        assert_eq!(user.credits, 50);
    }
}
