//! Application state and axum extractors for API handlers

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use chrono::Duration;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use stay_auth::{extract_bearer_token, CurrentUser, IdentityService, JwtService, TokenSettings};
use stay_core::config::AppConfig;
use stay_core::{Id, ListQuery, PaginatedResult};
use stay_db::{
    BookingRepository, BookingStore, Database, IdentityRepository, IdentityStore, MemoryStore,
    ProfileRepository, ProfileStore, PropertyRepository, PropertyStore, RepositoryError, StoreHealth,
};

use crate::error::{ApiError, ApiResult};

/// Backing stores, one per resource
#[derive(Clone)]
pub struct Stores {
    pub properties: Arc<dyn PropertyStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub identities: Arc<dyn IdentityStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Every resource served from one in-memory store
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            properties: store.clone(),
            bookings: store.clone(),
            profiles: store.clone(),
            identities: store.clone(),
            health: store,
        }
    }

    /// PostgreSQL repositories sharing one pool
    pub fn postgres(db: &Database) -> Self {
        let pool = db.pool().clone();
        Self {
            properties: Arc::new(PropertyRepository::new(pool.clone())),
            bookings: Arc::new(BookingRepository::new(pool.clone())),
            profiles: Arc::new(ProfileRepository::new(pool.clone())),
            identities: Arc::new(IdentityRepository::new(pool)),
            health: Arc::new(db.clone()),
        }
    }
}

/// How list endpoints size pages and answer failures
#[derive(Debug, Clone, Copy)]
pub struct ListingSettings {
    pub max_limit: i64,
    pub degrade_on_error: bool,
}

impl ListingSettings {
    /// Turn a listing outcome into the response envelope.
    ///
    /// A failed listing answers an empty envelope with `count: null` when
    /// degrading is on, and a 500 otherwise.
    pub fn respond<T>(
        &self,
        result: Result<PaginatedResult<T>, RepositoryError>,
        offset: i64,
        limit: i64,
        resource: &'static str,
    ) -> ApiResult<PaginatedResult<T>> {
        match result {
            Ok(page) => Ok(page),
            Err(e) if self.degrade_on_error => {
                tracing::error!(resource, error = %e, "Listing failed, answering empty page");
                Ok(PaginatedResult::degraded(offset, limit))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub properties: Arc<dyn PropertyStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub health: Arc<dyn StoreHealth>,
    pub identity: IdentityService,
    pub listing: ListingSettings,
}

impl AppState {
    pub fn new(stores: Stores, config: &AppConfig) -> Self {
        let identity = IdentityService::new(
            stores.identities,
            stores.profiles.clone(),
            JwtService::new(config.auth.jwt_secret.as_bytes()),
            TokenSettings {
                access_ttl: Duration::seconds(config.auth.access_token_ttl_seconds),
                refresh_ttl: Duration::seconds(config.auth.refresh_token_ttl_seconds),
            },
        );

        Self {
            properties: stores.properties,
            bookings: stores.bookings,
            profiles: stores.profiles,
            health: stores.health,
            identity,
            listing: ListingSettings {
                max_limit: config.listing.max_limit,
                degrade_on_error: config.listing.degrade_on_error,
            },
        }
    }

    /// In-memory state with default configuration
    pub fn in_memory() -> Self {
        Self::new(Stores::memory(), &AppConfig::default())
    }
}

/// Authenticated user extractor
///
/// Requires `Authorization: Bearer <access token>`.
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user = app_state.identity.authenticate(token)?;
        Ok(AuthenticatedUser(user))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// List parameters; each malformed or repeated value falls back on its own
pub struct ListParams(pub ListQuery);

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|_| Query(Vec::new()));
        Ok(ListParams(ListQuery::from_pairs(pairs)))
    }
}

/// JSON body whose rejections answer 400 in the API's error shape
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// Parse a path id; ids that are not UUIDs cannot exist
pub fn path_id(raw: &str, not_found: &'static str) -> ApiResult<Id> {
    raw.parse().map_err(|_| ApiError::not_found(not_found))
}
