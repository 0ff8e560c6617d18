//! Booking repository
//!
//! Bookings are read with their guest profile and property joined in. Creating
//! and deleting a booking also flips the property's availability inside the
//! same transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, QueryBuilder};
use stay_core::Id;
use stay_models::{
    Booking, BookingDates, BookingWithRelations, Entity, NewBooking, Property, PropertySummary,
    UserSummary,
};
use stay_queries::{ListPlan, Page};

use crate::listing::ListingColumns;
use crate::repository::{BookingStore, RepositoryError, RepositoryResult};

const BOOKING_JOINS: &str = r#"
    FROM bookings b
    LEFT JOIN properties p ON p.id = b.property_id
    LEFT JOIN profiles u ON u.user_id = b.user_id"#;

const SELECT_BOOKING: &str = r#"
    SELECT b.id, b.property_id, b.user_id, b.check_in_date, b.check_out_date,
           b.total_price, b.created_at,
           u.user_id AS guest_id, u.name AS guest_name, u.email AS guest_email,
           p.id AS property_ref, p.name AS property_name,
           p.location AS property_location, p.price_per_night AS property_price"#;

/// One booking row with its joined relations
#[derive(Debug, Clone, FromRow)]
struct BookingRow {
    id: Id,
    property_id: Id,
    user_id: Id,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    total_price: Option<f64>,
    created_at: DateTime<Utc>,
    guest_id: Option<Id>,
    guest_name: Option<String>,
    guest_email: Option<String>,
    property_ref: Option<Id>,
    property_name: Option<String>,
    property_location: Option<String>,
    property_price: Option<f64>,
}

impl From<BookingRow> for BookingWithRelations {
    fn from(row: BookingRow) -> Self {
        let user = match (row.guest_id, row.guest_email) {
            (Some(id), Some(email)) => Some(UserSummary {
                id,
                name: row.guest_name,
                email,
            }),
            _ => None,
        };

        let property = match (row.property_ref, row.property_name, row.property_location, row.property_price) {
            (Some(id), Some(name), Some(location), Some(price_per_night)) => Some(PropertySummary {
                id,
                name,
                location,
                price_per_night,
            }),
            _ => None,
        };

        BookingWithRelations {
            booking: Booking {
                id: row.id,
                property_id: row.property_id,
                user_id: row.user_id,
                check_in_date: row.check_in_date,
                check_out_date: row.check_out_date,
                total_price: row.total_price,
                created_at: row.created_at,
            },
            user,
            property,
        }
    }
}

/// Booking repository implementation
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Id) -> RepositoryResult<Option<BookingWithRelations>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "{}{} WHERE b.id = $1",
            SELECT_BOOKING, BOOKING_JOINS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn fetch_existing(&self, id: Id) -> RepositoryResult<BookingWithRelations> {
        self.fetch(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found::<Booking>(id))
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn list_bookings(
        &self,
        plan: &ListPlan,
        guest: Option<Id>,
    ) -> RepositoryResult<Page<BookingWithRelations>> {
        let columns = ListingColumns::BOOKINGS;
        let scope = guest.map(|id| ("b.user_id", id));

        let mut count = QueryBuilder::new(format!("SELECT COUNT(*){}", BOOKING_JOINS));
        columns.push_where(&mut count, plan, scope);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(format!("{}{}", SELECT_BOOKING, BOOKING_JOINS));
        columns.push_where(&mut select, plan, scope);
        columns.push_order(&mut select, plan);
        columns.push_window(&mut select, plan);
        let rows = select.build_query_as::<BookingRow>().fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn find_booking(&self, id: Id) -> RepositoryResult<Option<BookingWithRelations>> {
        self.fetch(id).await
    }

    async fn create_booking(&self, input: NewBooking) -> RepositoryResult<BookingWithRelations> {
        let mut tx = self.pool.begin().await?;

        // Claim the property; only one booking can win it
        let price: Option<f64> = sqlx::query_scalar(
            r#"
            UPDATE properties SET availability = FALSE
            WHERE id = $1 AND availability = TRUE
            RETURNING price_per_night
            "#,
        )
        .bind(input.property_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(price_per_night) = price else {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM properties WHERE id = $1)")
                .bind(input.property_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if exists {
                RepositoryError::Conflict("Property is not available".to_string())
            } else {
                RepositoryError::InvalidReference(format!("{} {}", Property::TYPE_NAME, input.property_id))
            });
        };

        let total_price = input.resolve_total(price_per_night);
        let booking = input.into_booking(total_price, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO bookings (id, property_id, user_id, check_in_date, check_out_date,
                                  total_price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.property_id)
        .bind(booking.user_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.total_price)
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(booking_id = %booking.id, property_id = %booking.property_id, "Booking created");
        self.fetch_existing(booking.id).await
    }

    async fn update_booking_dates(
        &self,
        id: Id,
        dates: BookingDates,
    ) -> RepositoryResult<BookingWithRelations> {
        let result = sqlx::query(
            "UPDATE bookings SET check_in_date = $2, check_out_date = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(dates.check_in_date)
        .bind(dates.check_out_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found::<Booking>(id));
        }

        self.fetch_existing(id).await
    }

    async fn delete_booking(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let property_id: Id = sqlx::query_scalar("DELETE FROM bookings WHERE id = $1 RETURNING property_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::not_found::<Booking>(id))?;

        sqlx::query(
            r#"
            UPDATE properties SET availability = TRUE
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM bookings WHERE property_id = $1)
            "#,
        )
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(booking_id = %id, property_id = %property_id, "Booking deleted");
        Ok(())
    }
}
