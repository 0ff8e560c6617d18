//! API error handling
//!
//! Validation failures answer `{"errors": [{path, message}]}`; every other
//! error answers `{"error": message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stay_auth::AuthError;
use stay_core::{ValidationErrors, ValidationIssue};
use stay_db::RepositoryError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ValidationBody<'a> {
    errors: &'a [ValidationIssue],
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Validation(errors) => {
                return (status, Json(ValidationBody { errors: errors.issues() })).into_response();
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                "Internal Server Error".to_string()
            }
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg) => msg,
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            RepositoryError::InvalidReference(_) => ApiError::BadRequest("Invalid reference".to_string()),
            RepositoryError::Duplicate(_) => ApiError::Conflict("Duplicate record".to_string()),
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            RepositoryError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Required => ApiError::Unauthorized("Authentication required".to_string()),
            AuthError::InvalidToken | AuthError::TokenExpired => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::InvalidCredentials => ApiError::BadRequest("Invalid credentials".to_string()),
            AuthError::EmailTaken => ApiError::BadRequest("User already registered".to_string()),
            AuthError::RefreshFailed => ApiError::Unauthorized("Unable to refresh session".to_string()),
            AuthError::Store(e) => e.into(),
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::InvalidReference("Property".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = RepositoryError::Duplicate("Property".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: ApiError = RepositoryError::NotFound("Booking".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: ApiError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg == "Invalid credentials"));

        let err: ApiError = AuthError::RefreshFailed.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
