//! Identity service
//!
//! Registration, password login, refresh-token rotation, and logout on top of
//! an [`IdentityStore`]. Each login opens a stored session; the refresh token
//! names that session, and refreshing replaces it with a new one.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use stay_core::Id;
use stay_db::{IdentityStore, ProfileStore, RepositoryError};
use stay_models::{NewAccount, Role, Session};
use thiserror::Error;

use crate::jwt::{JwtError, JwtService, TokenKind};
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::permissions::CurrentUser;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User already registered")]
    EmailTaken,
    #[error("Unable to refresh session")]
    RefreshFailed,
    #[error(transparent)]
    Store(#[from] RepositoryError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::Invalid(_) => Self::InvalidToken,
            JwtError::EncodingFailed(message) => Self::Internal(message),
        }
    }
}

/// Token lifetimes
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(30),
        }
    }
}

/// Public view of an authenticated user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthUser {
    pub id: Id,
    pub email: String,
    pub role: Role,
}

/// Issued token pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Result of register, login, and refresh
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub session: TokenPair,
}

/// Identity service
#[derive(Clone)]
pub struct IdentityService {
    identities: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    jwt: JwtService,
    settings: TokenSettings,
}

impl IdentityService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileStore>,
        jwt: JwtService,
        settings: TokenSettings,
    ) -> Self {
        Self {
            identities,
            profiles,
            jwt,
            settings,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Create an account with a guest profile and sign it in
    pub async fn register(&self, email: &str, password: &str, name: Option<String>) -> Result<AuthSession, AuthError> {
        let input = NewAccount {
            email: email.trim().to_string(),
            password_hash: hash_password_blocking(password.to_string()).await?,
            name,
        };

        let (account, profile) = match self.identities.create_account(input).await {
            Ok(created) => created,
            Err(RepositoryError::Duplicate(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        };

        let user = CurrentUser::new(account.id, account.email, profile.role);
        self.open_session(user).await
    }

    /// Check credentials and open a session
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let account = self
            .identities
            .find_account_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password_blocking(password.to_string(), account.password_hash.clone()).await? {
            tracing::debug!(user_id = %account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let role = self.role_of(account.id).await?;
        self.open_session(CurrentUser::new(account.id, account.email, role)).await
    }

    /// Exchange a refresh token for a new token pair, retiring its session
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let claims = self
            .jwt
            .validate_token(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::RefreshFailed)?;
        let user_id = claims.user_id().map_err(|_| AuthError::RefreshFailed)?;
        let session_id = claims.session_id().map_err(|_| AuthError::RefreshFailed)?;

        let session = self
            .identities
            .find_session(session_id)
            .await?
            .filter(|session| session.user_id == user_id && !session.is_expired())
            .ok_or(AuthError::RefreshFailed)?;

        // A session can only be redeemed once
        if !self.identities.delete_session(session.id).await? {
            return Err(AuthError::RefreshFailed);
        }

        let profile = self
            .profiles
            .find_profile(user_id)
            .await?
            .ok_or(AuthError::RefreshFailed)?;

        self.open_session(CurrentUser::new(user_id, profile.email, profile.role)).await
    }

    /// End every session of the user
    pub async fn logout(&self, user: &CurrentUser) -> Result<u64, AuthError> {
        let removed = self.identities.delete_sessions_for_user(user.id).await?;
        tracing::info!(user_id = %user.id, sessions = removed, "User logged out");
        Ok(removed)
    }

    /// Resolve the caller from an access token
    pub fn authenticate(&self, access_token: &str) -> Result<CurrentUser, AuthError> {
        Ok(self.jwt.current_user(access_token)?)
    }

    async fn role_of(&self, user_id: Id) -> Result<Role, AuthError> {
        Ok(self
            .profiles
            .find_profile(user_id)
            .await?
            .map(|profile| profile.role)
            .unwrap_or_default())
    }

    async fn open_session(&self, user: CurrentUser) -> Result<AuthSession, AuthError> {
        let now = Utc::now();
        let session = self
            .identities
            .create_session(Session::new(user.id, now + self.settings.refresh_ttl))
            .await?;

        let expires_at = now + self.settings.access_ttl;
        let access_token = self.jwt.create_access_token(&user, expires_at)?;
        let refresh_token = self
            .jwt
            .create_refresh_token(user.id, session.id, session.expires_at)?;

        Ok(AuthSession {
            user: AuthUser {
                id: user.id,
                email: user.email,
                role: user.role,
            },
            session: TokenPair {
                access_token,
                refresh_token,
                token_type: "Bearer",
                expires_in: self.settings.access_ttl.num_seconds(),
                expires_at,
            },
        })
    }
}
