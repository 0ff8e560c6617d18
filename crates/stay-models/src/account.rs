//! Login accounts and refresh sessions
//!
//! Tables: accounts, sessions

use crate::Entity;
use chrono::{DateTime, Utc};
use stay_core::Id;

/// Credentials of a registered user. Never serialized into responses.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub id: Id,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Account {
    const TABLE_NAME: &'static str = "accounts";
    const TYPE_NAME: &'static str = "Account";
}

/// Input for registering an account together with its profile
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

/// A refresh-token session
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Session {
    pub id: Id,
    pub user_id: Id,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Session {
    const TABLE_NAME: &'static str = "sessions";
    const TYPE_NAME: &'static str = "Session";
}

impl Session {
    pub fn new(user_id: Id, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Id::new_v4(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
