//! In-memory store
//!
//! Implements every store trait over hash maps behind one lock. Used when no
//! database is configured and by the API tests. Each operation holds the lock
//! for its whole duration, so multi-step writes are atomic. Reference and
//! uniqueness checks mirror the database constraints.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use stay_core::Id;
use stay_models::{
    Account, Booking, BookingDates, BookingWithRelations, Entity, NewAccount, NewBooking, NewProperty,
    ProfileChanges, Property, PropertyChanges, PropertySummary, Session, UserProfile, UserSummary,
};
use stay_queries::{apply_plan, ListPlan, Page};
use tokio::sync::RwLock;

use crate::repository::{
    BookingStore, IdentityStore, ProfileStore, PropertyStore, RepositoryError, RepositoryResult,
    StoreHealth,
};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Id, Account>,
    sessions: HashMap<Id, Session>,
    profiles: HashMap<Id, UserProfile>,
    properties: HashMap<Id, Property>,
    bookings: HashMap<Id, Booking>,
}

impl State {
    fn with_relations(&self, booking: &Booking) -> BookingWithRelations {
        let user = self.profiles.get(&booking.user_id).map(|profile| UserSummary {
            id: profile.user_id,
            name: profile.name.clone(),
            email: profile.email.clone(),
        });
        let property = self.properties.get(&booking.property_id).map(|property| PropertySummary {
            id: property.id,
            name: property.name.clone(),
            location: property.location.clone(),
            price_per_night: property.price_per_night,
        });

        BookingWithRelations {
            booking: booking.clone(),
            user,
            property,
        }
    }

    fn is_booked(&self, property_id: Id) -> bool {
        self.bookings.values().any(|booking| booking.property_id == property_id)
    }

    fn require_account(&self, user_id: Id) -> RepositoryResult<()> {
        if self.accounts.contains_key(&user_id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidReference(format!("{} {}", Account::TYPE_NAME, user_id)))
        }
    }
}

/// Store keeping all data in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn list_properties(&self, plan: &ListPlan) -> RepositoryResult<Page<Property>> {
        let state = self.state.read().await;
        Ok(apply_plan(state.properties.values().cloned(), plan))
    }

    async fn find_property(&self, id: Id) -> RepositoryResult<Option<Property>> {
        Ok(self.state.read().await.properties.get(&id).cloned())
    }

    async fn create_property(&self, input: NewProperty) -> RepositoryResult<Property> {
        let mut state = self.state.write().await;
        state.require_account(input.user_id)?;

        let property = input.into_property(Utc::now());
        if state.properties.contains_key(&property.id) {
            return Err(RepositoryError::Duplicate(format!("{} {}", Property::TYPE_NAME, property.id)));
        }

        state.properties.insert(property.id, property.clone());
        Ok(property)
    }

    async fn update_property(&self, id: Id, changes: PropertyChanges) -> RepositoryResult<Property> {
        let mut state = self.state.write().await;
        let booked = state.is_booked(id);
        let property = state
            .properties
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found::<Property>(id))?;

        property.apply(&changes);
        // A held property stays unavailable until its booking goes away
        if booked {
            property.availability = false;
        }
        Ok(property.clone())
    }

    async fn delete_property(&self, id: Id) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if state.properties.remove(&id).is_none() {
            return Err(RepositoryError::not_found::<Property>(id));
        }
        state.bookings.retain(|_, booking| booking.property_id != id);
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list_bookings(
        &self,
        plan: &ListPlan,
        guest: Option<Id>,
    ) -> RepositoryResult<Page<BookingWithRelations>> {
        let state = self.state.read().await;
        let bookings = state
            .bookings
            .values()
            .filter(|booking| guest.map_or(true, |user_id| booking.user_id == user_id))
            .map(|booking| state.with_relations(booking));

        Ok(apply_plan(bookings, plan))
    }

    async fn find_booking(&self, id: Id) -> RepositoryResult<Option<BookingWithRelations>> {
        let state = self.state.read().await;
        Ok(state.bookings.get(&id).map(|booking| state.with_relations(booking)))
    }

    async fn create_booking(&self, input: NewBooking) -> RepositoryResult<BookingWithRelations> {
        let mut state = self.state.write().await;
        state.require_account(input.user_id)?;

        let property = state.properties.get_mut(&input.property_id).ok_or_else(|| {
            RepositoryError::InvalidReference(format!("{} {}", Property::TYPE_NAME, input.property_id))
        })?;
        if !property.availability {
            return Err(RepositoryError::Conflict("Property is not available".to_string()));
        }
        property.availability = false;

        let total_price = input.resolve_total(property.price_per_night);
        let booking = input.into_booking(total_price, Utc::now());
        state.bookings.insert(booking.id, booking.clone());

        Ok(state.with_relations(&booking))
    }

    async fn update_booking_dates(
        &self,
        id: Id,
        dates: BookingDates,
    ) -> RepositoryResult<BookingWithRelations> {
        let mut state = self.state.write().await;
        let booking = state
            .bookings
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found::<Booking>(id))?;

        booking.check_in_date = dates.check_in_date;
        booking.check_out_date = dates.check_out_date;
        let booking = booking.clone();

        Ok(state.with_relations(&booking))
    }

    async fn delete_booking(&self, id: Id) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let booking = state
            .bookings
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found::<Booking>(id))?;

        if !state.is_booked(booking.property_id) {
            if let Some(property) = state.properties.get_mut(&booking.property_id) {
                property.availability = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, user_id: Id) -> RepositoryResult<Option<UserProfile>> {
        Ok(self.state.read().await.profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, user_id: Id, changes: ProfileChanges) -> RepositoryResult<UserProfile> {
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| RepositoryError::not_found::<UserProfile>(user_id))?;

        profile.apply(&changes);
        Ok(profile.clone())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_account(&self, input: NewAccount) -> RepositoryResult<(Account, UserProfile)> {
        let mut state = self.state.write().await;
        let taken = state
            .accounts
            .values()
            .any(|account| account.email.eq_ignore_ascii_case(&input.email));
        if taken {
            return Err(RepositoryError::Duplicate(format!("{} {}", Account::TYPE_NAME, input.email)));
        }

        let account = Account {
            id: Id::new_v4(),
            email: input.email,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        };
        let profile = UserProfile::new(account.id, account.email.clone(), input.name);

        state.accounts.insert(account.id, account.clone());
        state.profiles.insert(profile.user_id, profile.clone());
        Ok((account, profile))
    }

    async fn find_account_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_session(&self, session: Session) -> RepositoryResult<Session> {
        let mut state = self.state.write().await;
        state.require_account(session.user_id)?;
        state.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Id) -> RepositoryResult<Option<Session>> {
        Ok(self.state.read().await.sessions.get(&id).cloned())
    }

    async fn delete_session(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.state.write().await.sessions.remove(&id).is_some())
    }

    async fn delete_sessions_for_user(&self, user_id: Id) -> RepositoryResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, session| session.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
