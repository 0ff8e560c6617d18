//! # stay-api
//!
//! REST API for Staybook.
//!
//! Routes cover properties, bookings, and authentication. Handlers validate
//! input with `stay-contracts`, check ownership, and delegate storage to the
//! store traits held in [`AppState`].

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{AppState, ListingSettings, Stores};
pub use routes::router;
