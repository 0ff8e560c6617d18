//! # stay-models
//!
//! Domain models for Staybook.
//!
//! This crate contains the records stored in the database tables and the input
//! shapes used to create or change them. Listed records implement
//! [`stay_queries::Record`] so they can be filtered and sorted by field name.

pub use stay_core::Id;

pub mod account;
pub mod booking;
pub mod profile;
pub mod property;

// Re-exports for convenience
pub use account::{Account, NewAccount, Session};
pub use booking::{Booking, BookingDates, BookingWithRelations, NewBooking, PropertySummary, UserSummary};
pub use profile::{ProfileChanges, Role, UnknownRole, UserProfile};
pub use property::{NewProperty, Property, PropertyChanges};

/// Base trait for stored records
pub trait Entity {
    /// Database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name, used in messages
    const TYPE_NAME: &'static str;
}
