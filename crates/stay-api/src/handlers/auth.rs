//! Authentication API handlers

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use stay_contracts::{Contract, LoginRequest, ProfileUpdateContract, ProfileUpdateRequest, RegisterContract, RegisterRequest};
use stay_db::RepositoryError;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, JsonBody};
use crate::handlers::Message;

const PROFILE_NOT_FOUND: &str = "User profile not found";

/// Refresh body
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// POST /auth/register
///
/// Registration signs the new user in straight away.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    RegisterContract.validate(&request)?;

    let email = request.email.as_deref().unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    let name = request.name.as_deref().map(|n| n.trim().to_string());

    let session = state.identity.register(email, password, name).await?;
    tracing::info!(user_id = %session.user.id, "User registered");
    Ok(Json(session))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Invalid credentials"));
    }

    let session = state.identity.login(&request.email, &request.password).await?;
    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok(Json(session))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let token = request
        .refresh_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("Unable to refresh session"))?;

    let session = state.identity.refresh(&token).await?;
    Ok(Json(session))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    state.identity.logout(&user).await?;
    Ok(Json(Message::new("Successfully logged out")))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profiles
        .find_profile(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))?;

    Ok(Json(profile))
}

/// PATCH /auth/me
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<ProfileUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let changes = ProfileUpdateContract.changes(&request)?;

    let profile = state.profiles.update_profile(user.id, changes).await.map_err(|e| match e {
        RepositoryError::NotFound(_) => ApiError::not_found(PROFILE_NOT_FOUND),
        other => other.into(),
    })?;

    tracing::debug!(user_id = %user.id, "Profile updated");
    Ok(Json(profile))
}
