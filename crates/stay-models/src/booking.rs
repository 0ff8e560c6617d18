//! Booking model
//!
//! Table: bookings

use crate::Entity;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stay_core::Id;
use stay_queries::{FieldValue, ListConfig, Record};

/// A guest's reservation of a property for a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Id,
    pub property_id: Id,
    /// Guest who made the booking
    pub user_id: Id,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Booking {
    const TABLE_NAME: &'static str = "bookings";
    const TYPE_NAME: &'static str = "Booking";
}

impl Booking {
    pub fn nights(&self) -> i64 {
        self.dates().nights()
    }

    pub fn dates(&self) -> BookingDates {
        BookingDates {
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
        }
    }
}

impl Record for Booking {
    fn record_id(&self) -> Id {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::owned(self.id.to_string()),
            "property_id" => FieldValue::owned(self.property_id.to_string()),
            "user_id" => FieldValue::owned(self.user_id.to_string()),
            "check_in_date" => FieldValue::owned(self.check_in_date.to_string()),
            "check_out_date" => FieldValue::owned(self.check_out_date.to_string()),
            "total_price" => FieldValue::optional(self.total_price, FieldValue::Number),
            "created_at" => FieldValue::owned(self.created_at.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }
}

/// Stay window of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDates {
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

impl BookingDates {
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

/// Input for creating a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub property_id: Id,
    pub user_id: Id,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    /// Computed from the property's nightly price when absent
    pub total_price: Option<f64>,
}

impl NewBooking {
    pub fn dates(&self) -> BookingDates {
        BookingDates {
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
        }
    }

    /// The requested total, or nights times the nightly price
    pub fn resolve_total(&self, price_per_night: f64) -> f64 {
        self.total_price
            .unwrap_or_else(|| self.dates().nights() as f64 * price_per_night)
    }

    pub fn into_booking(self, total_price: f64, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id: Id::new_v4(),
            property_id: self.property_id,
            user_id: self.user_id,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            total_price: Some(total_price),
            created_at,
        }
    }
}

/// Guest details attached to a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Id,
    pub name: Option<String>,
    pub email: String,
}

/// Property details attached to a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: Id,
    pub name: String,
    pub location: String,
    pub price_per_night: f64,
}

/// Booking with its guest and property expanded inline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingWithRelations {
    #[serde(flatten)]
    pub booking: Booking,
    pub user: Option<UserSummary>,
    pub property: Option<PropertySummary>,
}

impl BookingWithRelations {
    /// List configuration for `GET /bookings`
    pub const LISTING: ListConfig = ListConfig::new(&["check_in_date", "check_out_date", "created_at"], "created_at")
        .searching(&["property.name", "property.location"]);

    pub fn id(&self) -> Id {
        self.booking.id
    }

    pub fn is_owned_by(&self, user_id: Id) -> bool {
        self.booking.user_id == user_id
    }
}

impl Record for BookingWithRelations {
    fn record_id(&self) -> Id {
        self.booking.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name.split_once('.') {
            Some(("property", field)) => {
                let property = match &self.property {
                    Some(property) => property,
                    None => return Some(FieldValue::Null),
                };
                match field {
                    "id" => Some(FieldValue::owned(property.id.to_string())),
                    "name" => Some(FieldValue::text(&property.name)),
                    "location" => Some(FieldValue::text(&property.location)),
                    "price_per_night" => Some(FieldValue::Number(property.price_per_night)),
                    _ => None,
                }
            }
            Some(("user", field)) => {
                let user = match &self.user {
                    Some(user) => user,
                    None => return Some(FieldValue::Null),
                };
                match field {
                    "id" => Some(FieldValue::owned(user.id.to_string())),
                    "name" => Some(FieldValue::optional(user.name.as_deref(), FieldValue::text)),
                    "email" => Some(FieldValue::text(&user.email)),
                    _ => None,
                }
            }
            Some(_) => None,
            None => self.booking.field(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> BookingWithRelations {
        let property_id = Id::new_v4();
        BookingWithRelations {
            booking: Booking {
                id: Id::new_v4(),
                property_id,
                user_id: Id::new_v4(),
                check_in_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
                check_out_date: NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
                total_price: Some(300.0),
                created_at: Utc::now(),
            },
            user: None,
            property: Some(PropertySummary {
                id: property_id,
                name: "Harbour View".to_string(),
                location: "Lisbon".to_string(),
                price_per_night: 100.0,
            }),
        }
    }

    #[test]
    fn test_nights_and_default_total() {
        let b = booking();
        assert_eq!(b.booking.nights(), 3);

        let new = NewBooking {
            property_id: b.booking.property_id,
            user_id: b.booking.user_id,
            check_in_date: b.booking.check_in_date,
            check_out_date: b.booking.check_out_date,
            total_price: None,
        };
        assert_eq!(new.resolve_total(80.0), 240.0);
        assert_eq!(NewBooking { total_price: Some(10.0), ..new }.resolve_total(80.0), 10.0);
    }

    #[test]
    fn test_related_fields() {
        let b = booking();
        assert_eq!(b.field("property.location"), Some(FieldValue::text("Lisbon")));
        assert_eq!(b.field("user.email"), Some(FieldValue::Null));
        assert_eq!(b.field("check_in_date"), Some(FieldValue::owned("2024-05-10".to_string())));
        assert_eq!(b.field("owner.name"), None);
    }

    #[test]
    fn test_serializes_flat_with_relations() {
        let json = serde_json::to_value(booking()).unwrap();
        assert_eq!(json["check_in_date"], "2024-05-10");
        assert_eq!(json["property"]["name"], "Harbour View");
        assert!(json["user"].is_null());
    }
}
