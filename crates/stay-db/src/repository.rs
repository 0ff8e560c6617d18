//! Store traits and repository errors
//!
//! Each resource is reached through an object-safe store trait. The PostgreSQL
//! repositories and the in-memory store both implement every trait, so the API
//! layer only ever holds `Arc<dyn ...Store>`.

use async_trait::async_trait;
use std::fmt::Display;
use stay_core::Id;
use stay_models::{
    Account, BookingDates, BookingWithRelations, Entity, NewAccount, NewBooking, NewProperty,
    ProfileChanges, Property, PropertyChanges, Session, UserProfile,
};
use stay_queries::{ListPlan, Page, PageSource};

/// PostgreSQL foreign key violation
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL unique constraint violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    /// A referenced row does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A unique key is already taken
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The write conflicts with the current state of the data
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl RepositoryError {
    pub fn not_found<E: Entity>(id: impl Display) -> Self {
        Self::NotFound(format!("{} {}", E::TYPE_NAME, id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => {
                    return Self::InvalidReference(db_err.message().to_string())
                }
                Some(UNIQUE_VIOLATION) => return Self::Duplicate(db_err.message().to_string()),
                _ => {}
            }
        }
        if let sqlx::Error::RowNotFound = err {
            return Self::NotFound("Record".to_string());
        }
        Self::Database(err)
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Property persistence
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn list_properties(&self, plan: &ListPlan) -> RepositoryResult<Page<Property>>;

    async fn find_property(&self, id: Id) -> RepositoryResult<Option<Property>>;

    /// Fails with `Duplicate` when a client-chosen id is taken
    async fn create_property(&self, input: NewProperty) -> RepositoryResult<Property>;

    async fn update_property(&self, id: Id, changes: PropertyChanges) -> RepositoryResult<Property>;

    async fn delete_property(&self, id: Id) -> RepositoryResult<()>;
}

/// Booking persistence; bookings are always returned with relations expanded
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// List bookings, restricted to one guest when `guest` is set
    async fn list_bookings(
        &self,
        plan: &ListPlan,
        guest: Option<Id>,
    ) -> RepositoryResult<Page<BookingWithRelations>>;

    async fn find_booking(&self, id: Id) -> RepositoryResult<Option<BookingWithRelations>>;

    /// Insert the booking and take the property off the market in one step.
    ///
    /// Fails with `Conflict` when the property is not available and with
    /// `InvalidReference` when it does not exist.
    async fn create_booking(&self, input: NewBooking) -> RepositoryResult<BookingWithRelations>;

    async fn update_booking_dates(
        &self,
        id: Id,
        dates: BookingDates,
    ) -> RepositoryResult<BookingWithRelations>;

    /// Remove the booking and put the property back on the market in one step
    async fn delete_booking(&self, id: Id) -> RepositoryResult<()>;
}

/// Profile persistence
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: Id) -> RepositoryResult<Option<UserProfile>>;

    async fn update_profile(&self, user_id: Id, changes: ProfileChanges) -> RepositoryResult<UserProfile>;
}

/// Accounts and refresh sessions
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create the account and its guest profile together
    async fn create_account(&self, input: NewAccount) -> RepositoryResult<(Account, UserProfile)>;

    /// Case-insensitive email lookup
    async fn find_account_by_email(&self, email: &str) -> RepositoryResult<Option<Account>>;

    async fn create_session(&self, session: Session) -> RepositoryResult<Session>;

    async fn find_session(&self, id: Id) -> RepositoryResult<Option<Session>>;

    /// Returns whether a session was removed
    async fn delete_session(&self, id: Id) -> RepositoryResult<bool>;

    /// Returns the number of sessions removed
    async fn delete_sessions_for_user(&self, user_id: Id) -> RepositoryResult<u64>;
}

/// Liveness of the backing store
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Short name of the backend, for health reports
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> RepositoryResult<()>;
}

/// Page source listing every property
pub struct PropertyListing<'a> {
    store: &'a dyn PropertyStore,
}

impl<'a> PropertyListing<'a> {
    pub fn new(store: &'a dyn PropertyStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<'a> PageSource<Property> for PropertyListing<'a> {
    type Error = RepositoryError;

    async fn fetch_page(&self, plan: &ListPlan) -> Result<Page<Property>, Self::Error> {
        self.store.list_properties(plan).await
    }
}

/// Page source listing bookings, optionally for a single guest
pub struct BookingListing<'a> {
    store: &'a dyn BookingStore,
    guest: Option<Id>,
}

impl<'a> BookingListing<'a> {
    /// Every booking
    pub fn all(store: &'a dyn BookingStore) -> Self {
        Self { store, guest: None }
    }

    /// Only bookings made by `guest`
    pub fn for_guest(store: &'a dyn BookingStore, guest: Id) -> Self {
        Self {
            store,
            guest: Some(guest),
        }
    }
}

#[async_trait]
impl<'a> PageSource<BookingWithRelations> for BookingListing<'a> {
    type Error = RepositoryError;

    async fn fetch_page(&self, plan: &ListPlan) -> Result<Page<BookingWithRelations>, Self::Error> {
        self.store.list_bookings(plan, self.guest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let id = Id::nil();
        let err = RepositoryError::not_found::<Property>(id);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), format!("Property {} not found", id));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: RepositoryError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }
}
