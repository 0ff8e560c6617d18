//! Account and session repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use stay_core::Id;
use stay_models::{Account, NewAccount, Session, UserProfile};

use crate::repository::{IdentityStore, RepositoryError, RepositoryResult};

/// Account and session repository implementation
#[derive(Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository {
    async fn create_account(&self, input: NewAccount) -> RepositoryResult<(Account, UserProfile)> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Id::new_v4())
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::Duplicate(_) => RepositoryError::Duplicate(format!("Account {}", input.email)),
            other => other,
        })?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO profiles (user_id, name, email, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, name, email, avatar_url, bio, role, created_at
            "#,
        )
        .bind(account.id)
        .bind(&input.name)
        .bind(&account.email)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %account.id, "Account registered");
        Ok((account, profile))
    }

    async fn find_account_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, created_at FROM accounts WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_session(&self, session: Session) -> RepositoryResult<Session> {
        let row = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, expires_at, created_at
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_session(&self, id: Id) -> RepositoryResult<Option<Session>> {
        let row = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_session(&self, id: Id) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_sessions_for_user(&self, user_id: Id) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
