//! JWT Authentication
//!
//! HS256 tokens. Access tokens carry the caller's identity and role; refresh
//! tokens carry the id of the stored session they were issued for.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stay_core::Id;
use stay_models::Role;
use thiserror::Error;

use crate::permissions::CurrentUser;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Session id, refresh tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Id, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid("Invalid user ID in token".to_string()))
    }

    pub fn session_id(&self) -> Result<Id, JwtError> {
        self.sid
            .as_deref()
            .and_then(|sid| sid.parse().ok())
            .ok_or_else(|| JwtError::Invalid("Missing session in token".to_string()))
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// JWT service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with the given secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Create an access token for `user`, valid until `expires_at`
    pub fn create_access_token(&self, user: &CurrentUser, expires_at: DateTime<Utc>) -> Result<String, JwtError> {
        self.encode(Claims {
            sub: user.id.to_string(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
            jti: Id::new_v4().to_string(),
            kind: TokenKind::Access,
            email: Some(user.email.clone()),
            role: Some(user.role),
            sid: None,
        })
    }

    /// Create a refresh token bound to a stored session
    pub fn create_refresh_token(
        &self,
        user_id: Id,
        session_id: Id,
        expires_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        self.encode(Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
            jti: Id::new_v4().to_string(),
            kind: TokenKind::Refresh,
            email: None,
            role: None,
            sid: Some(session_id.to_string()),
        })
    }

    fn encode(&self, claims: Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate and decode a token of the expected kind
    pub fn validate_token(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            }
        })?;

        if token_data.claims.kind != kind {
            return Err(JwtError::Invalid("Unexpected token kind".to_string()));
        }
        Ok(token_data.claims)
    }

    /// The user an access token was issued to
    pub fn current_user(&self, token: &str) -> Result<CurrentUser, JwtError> {
        let claims = self.validate_token(token, TokenKind::Access)?;
        Ok(CurrentUser {
            id: claims.user_id()?,
            email: claims.email.unwrap_or_default(),
            role: claims.role.unwrap_or_default(),
        })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn service() -> JwtService {
        JwtService::new(b"test-secret-key-at-least-32-bytes")
    }

    #[test]
    fn test_create_and_validate_access_token() {
        let user = CurrentUser::new(Id::new_v4(), "ana@example.com", Role::Host);
        let token = service()
            .create_access_token(&user, Utc::now() + Duration::hours(1))
            .unwrap();

        let decoded = service().current_user(&token).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let user_id = Id::new_v4();
        let session_id = Id::new_v4();
        let token = service()
            .create_refresh_token(user_id, session_id, Utc::now() + Duration::days(1))
            .unwrap();

        assert!(service().current_user(&token).is_err());
        let claims = service().validate_token(&token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.session_id().unwrap(), session_id);
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_expired_token() {
        let user = CurrentUser::new(Id::new_v4(), "ana@example.com", Role::Guest);
        let token = service()
            .create_access_token(&user, Utc::now() - Duration::minutes(5))
            .unwrap();
        assert!(matches!(service().current_user(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let user = CurrentUser::new(Id::new_v4(), "ana@example.com", Role::Guest);
        let token = JwtService::new(b"another-secret-key-of-32-bytes!!")
            .create_access_token(&user, Utc::now() + Duration::hours(1))
            .unwrap();
        assert!(matches!(service().current_user(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
