//! # stay-db
//!
//! Storage layer for Staybook.
//!
//! This crate provides:
//!
//! - Connection pool management and the embedded schema
//! - Store traits for properties, bookings, profiles, and identities
//! - PostgreSQL repositories implementing those traits with SQLx
//! - An in-memory store with the same behavior, for tests and local runs
//!
//! ## Example
//!
//! ```ignore
//! use stay_db::{Database, DatabaseConfig, PropertyRepository, PropertyStore};
//!
//! let db = Database::connect(&DatabaseConfig::with_url(url)).await?;
//! db.migrate().await?;
//!
//! let properties = PropertyRepository::new(db.pool().clone());
//! let property = properties.find_property(id).await?;
//! ```

pub mod bookings;
pub mod identity;
pub mod listing;
pub mod memory;
pub mod pool;
pub mod profiles;
pub mod properties;
pub mod repository;
pub mod schema;

// Re-exports
pub use bookings::BookingRepository;
pub use identity::IdentityRepository;
pub use memory::MemoryStore;
pub use pool::{Database, DatabaseConfig, PoolStats};
pub use profiles::ProfileRepository;
pub use properties::PropertyRepository;
pub use repository::{
    BookingListing, BookingStore, IdentityStore, ProfileStore, PropertyListing, PropertyStore,
    RepositoryError, RepositoryResult, StoreHealth,
};
