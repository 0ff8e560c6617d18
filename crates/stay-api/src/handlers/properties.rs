//! Property API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use stay_contracts::{PropertyContract, PropertyDraft};
use stay_db::{PropertyListing, RepositoryError};
use stay_models::Property;
use stay_queries::{paginate_plan, ListPlan, TextFilter};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{path_id, AppState, AuthenticatedUser, JsonBody, ListParams};
use crate::handlers::Message;

const NOT_FOUND: &str = "Property not found";

/// GET /properties
///
/// Besides the list parameters, `location` narrows the listing to one exact
/// location.
pub async fn list_properties(
    State(state): State<AppState>,
    ListParams(query): ListParams,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<impl IntoResponse> {
    let mut plan = ListPlan::resolve(&query, &Property::LISTING.with_max_limit(state.listing.max_limit));
    let location = pairs
        .into_iter()
        .find(|(key, _)| key == "location")
        .map(|(_, value)| value.trim().to_string());
    if let Some(location) = location.filter(|l| !l.is_empty()) {
        plan = plan.with_filter(TextFilter::exact(location, "location"));
    }

    let (offset, limit) = (plan.offset, plan.limit);
    let result = paginate_plan(&PropertyListing::new(state.properties.as_ref()), plan).await;
    let page = state.listing.respond(result, offset, limit, "properties")?;

    tracing::debug!(count = ?page.count, returned = page.data.len(), "Listed properties");
    Ok(Json(page))
}

/// GET /properties/:id
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = path_id(&id, NOT_FOUND)?;
    let property = state
        .properties
        .find_property(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(property))
}

/// POST /properties
pub async fn create_property(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(draft): JsonBody<PropertyDraft>,
) -> ApiResult<impl IntoResponse> {
    let input = PropertyContract.build(&draft, user.id)?;

    let property = state.properties.create_property(input).await.map_err(|e| match e {
        RepositoryError::Duplicate(_) => ApiError::conflict("Duplicate property ID"),
        RepositoryError::InvalidReference(_) => ApiError::bad_request("Property could not be created"),
        other => other.into(),
    })?;

    tracing::info!(property_id = %property.id, user_id = %user.id, "Property created");
    Ok((StatusCode::CREATED, Json(property)))
}

/// PUT /properties/:id
pub async fn update_property(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(draft): JsonBody<PropertyDraft>,
) -> ApiResult<impl IntoResponse> {
    let id = path_id(&id, NOT_FOUND)?;
    let existing = state
        .properties
        .find_property(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    if !user.can_manage(existing.user_id) {
        return Err(ApiError::forbidden("Not allowed to update this property"));
    }

    let changes = PropertyContract.changes(&draft)?;
    let updated = state.properties.update_property(id, changes).await.map_err(|e| match e {
        RepositoryError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => other.into(),
    })?;

    Ok(Json(updated))
}

/// DELETE /properties/:id
pub async fn delete_property(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = path_id(&id, NOT_FOUND)?;
    let existing = state
        .properties
        .find_property(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    if !user.can_manage(existing.user_id) {
        return Err(ApiError::forbidden("Not allowed to delete this property"));
    }

    state.properties.delete_property(id).await.map_err(|e| match e {
        RepositoryError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => other.into(),
    })?;

    tracing::info!(property_id = %id, user_id = %user.id, "Property deleted");
    Ok(Json(Message::new("Property deleted successfully")))
}
