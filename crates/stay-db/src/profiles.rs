//! Profile repository

use async_trait::async_trait;
use sqlx::PgPool;
use stay_core::Id;
use stay_models::{ProfileChanges, UserProfile};

use crate::repository::{ProfileStore, RepositoryError, RepositoryResult};

/// Profile repository implementation
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_profile(&self, user_id: Id) -> RepositoryResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, name, email, avatar_url, bio, role, created_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_profile(&self, user_id: Id, changes: ProfileChanges) -> RepositoryResult<UserProfile> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE profiles SET
                name = COALESCE($2, name),
                avatar_url = COALESCE($3, avatar_url),
                bio = COALESCE($4, bio)
            WHERE user_id = $1
            RETURNING user_id, name, email, avatar_url, bio, role, created_at
            "#,
        )
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.avatar_url)
        .bind(&changes.bio)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found::<UserProfile>(user_id))?;

        Ok(row)
    }
}
