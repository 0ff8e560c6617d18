//! Booking API handlers
//!
//! Every booking route requires authentication. Guests see and change only
//! their own bookings; admins see and change all of them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use stay_contracts::{BookingCreateContract, BookingDraft, BookingUpdateContract, BookingUpdateDraft};
use stay_core::Id;
use stay_db::{BookingListing, RepositoryError};
use stay_models::BookingWithRelations;
use stay_queries::{paginate_plan, ListPlan};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{path_id, AppState, AuthenticatedUser, JsonBody, ListParams};
use crate::handlers::Message;

const NOT_FOUND: &str = "Booking not found";

async fn find_existing(state: &AppState, id: Id) -> ApiResult<BookingWithRelations> {
    state
        .bookings
        .find_booking(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// GET /bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ListParams(query): ListParams,
) -> ApiResult<impl IntoResponse> {
    let config = BookingWithRelations::LISTING.with_max_limit(state.listing.max_limit);
    let plan = ListPlan::resolve(&query, &config);
    let (offset, limit) = (plan.offset, plan.limit);

    let listing = if user.is_admin() {
        BookingListing::all(state.bookings.as_ref())
    } else {
        BookingListing::for_guest(state.bookings.as_ref(), user.id)
    };
    let result = paginate_plan(&listing, plan).await;
    let page = state.listing.respond(result, offset, limit, "bookings")?;

    tracing::debug!(user_id = %user.id, count = ?page.count, returned = page.data.len(), "Listed bookings");
    Ok(Json(page))
}

/// GET /bookings/:id
///
/// Bookings the caller may not see answer 404 like missing ones.
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = path_id(&id, NOT_FOUND)?;
    let booking = find_existing(&state, id).await?;

    if !user.can_manage(booking.booking.user_id) {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    Ok(Json(booking))
}

/// POST /bookings
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(draft): JsonBody<BookingDraft>,
) -> ApiResult<impl IntoResponse> {
    let input = BookingCreateContract.build(&draft, user.id)?;

    let booking = state.bookings.create_booking(input).await.map_err(|e| match e {
        RepositoryError::InvalidReference(_) => ApiError::bad_request("Invalid property or user reference"),
        RepositoryError::Conflict(msg) => ApiError::conflict(msg),
        other => other.into(),
    })?;

    tracing::info!(
        booking_id = %booking.id(),
        property_id = %booking.booking.property_id,
        user_id = %user.id,
        "Booking created"
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

/// PUT /bookings/:id
pub async fn update_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(draft): JsonBody<BookingUpdateDraft>,
) -> ApiResult<impl IntoResponse> {
    let id = path_id(&id, NOT_FOUND)?;
    let existing = find_existing(&state, id).await?;

    if !user.can_manage(existing.booking.user_id) {
        return Err(ApiError::forbidden("Not allowed to update this booking"));
    }

    let dates = BookingUpdateContract::new(existing.booking.dates()).resolve(&draft)?;
    let updated = state.bookings.update_booking_dates(id, dates).await.map_err(|e| match e {
        RepositoryError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => other.into(),
    })?;

    Ok(Json(updated))
}

/// DELETE /bookings/:id
pub async fn delete_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = path_id(&id, NOT_FOUND)?;
    let existing = find_existing(&state, id).await?;

    if !user.can_manage(existing.booking.user_id) {
        return Err(ApiError::forbidden("Not allowed to delete this booking"));
    }

    state.bookings.delete_booking(id).await.map_err(|e| match e {
        RepositoryError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => other.into(),
    })?;

    tracing::info!(booking_id = %id, user_id = %user.id, "Booking deleted");
    Ok(Json(Message::new("Booking deleted successfully")))
}
