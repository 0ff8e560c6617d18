//! # stay-contracts
//!
//! Input validation for Staybook.
//!
//! Request bodies arrive as loosely typed drafts. A contract checks a draft and
//! reports every problem at once as [`stay_core::ValidationErrors`]; a draft that
//! passes converts into the typed model input.

pub mod auth;
pub mod base;
pub mod bookings;
pub mod properties;

pub use auth::{LoginRequest, ProfileUpdateContract, ProfileUpdateRequest, RegisterContract, RegisterRequest};
pub use base::*;
pub use bookings::{BookingCreateContract, BookingDraft, BookingUpdateContract, BookingUpdateDraft};
pub use properties::{PropertyContract, PropertyDraft};
