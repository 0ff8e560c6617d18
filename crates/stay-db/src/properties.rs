//! Property repository
//!
//! Database operations for properties.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, QueryBuilder};
use stay_core::Id;
use stay_models::{NewProperty, Property, PropertyChanges};
use stay_queries::{ListPlan, Page};

use crate::listing::ListingColumns;
use crate::repository::{PropertyStore, RepositoryError, RepositoryResult};

const SELECT_PROPERTY: &str = r#"
    SELECT p.id, p.user_id, p.name, p.description, p.location,
           p.price_per_night, p.availability, p.created_at
    FROM properties p"#;

/// Property repository implementation
#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyStore for PropertyRepository {
    async fn list_properties(&self, plan: &ListPlan) -> RepositoryResult<Page<Property>> {
        let columns = ListingColumns::PROPERTIES;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM properties p");
        columns.push_where(&mut count, plan, None);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(SELECT_PROPERTY);
        columns.push_where(&mut select, plan, None);
        columns.push_order(&mut select, plan);
        columns.push_window(&mut select, plan);
        let items = select.build_query_as::<Property>().fetch_all(&self.pool).await?;

        Ok(Page { items, total })
    }

    async fn find_property(&self, id: Id) -> RepositoryResult<Option<Property>> {
        let row = sqlx::query_as::<_, Property>(&format!("{} WHERE p.id = $1", SELECT_PROPERTY))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create_property(&self, input: NewProperty) -> RepositoryResult<Property> {
        let property = input.into_property(Utc::now());

        let row = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (id, user_id, name, description, location,
                                    price_per_night, availability, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, name, description, location,
                      price_per_night, availability, created_at
            "#,
        )
        .bind(property.id)
        .bind(property.user_id)
        .bind(&property.name)
        .bind(&property.description)
        .bind(&property.location)
        .bind(property.price_per_night)
        .bind(property.availability)
        .bind(property.created_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(property_id = %row.id, "Property created");
        Ok(row)
    }

    async fn update_property(&self, id: Id, changes: PropertyChanges) -> RepositoryResult<Property> {
        let row = sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                price_per_night = COALESCE($5, price_per_night),
                availability = CASE
                    WHEN EXISTS (SELECT 1 FROM bookings b WHERE b.property_id = $1) THEN FALSE
                    ELSE COALESCE($6, availability)
                END
            WHERE id = $1
            RETURNING id, user_id, name, description, location,
                      price_per_night, availability, created_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.location)
        .bind(changes.price_per_night)
        .bind(changes.availability)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found::<Property>(id))?;

        Ok(row)
    }

    async fn delete_property(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found::<Property>(id));
        }

        tracing::debug!(property_id = %id, "Property deleted");
        Ok(())
    }
}
