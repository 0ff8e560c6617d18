//! API routes

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{auth, bookings, properties};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .nest("/properties", properties_router())
        .nest("/bookings", bookings_router())
        .nest("/auth", auth_router())
}

fn properties_router() -> Router<AppState> {
    Router::new()
        .route("/", get(properties::list_properties).post(properties::create_property))
        .route(
            "/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
}

fn bookings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(bookings::list_bookings).post(bookings::create_booking))
        .route(
            "/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).patch(auth::update_me))
}

async fn api_root() -> Json<ApiRoot> {
    Json(ApiRoot {
        name: "Staybook",
        version: env!("CARGO_PKG_VERSION"),
        resources: &["/properties", "/bookings", "/auth"],
    })
}

#[derive(Serialize)]
struct ApiRoot {
    name: &'static str,
    version: &'static str,
    resources: &'static [&'static str],
}
