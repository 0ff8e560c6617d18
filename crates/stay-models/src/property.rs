//! Property model
//!
//! Table: properties

use crate::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stay_core::Id;
use stay_queries::{FieldValue, ListConfig, Record};

/// A rentable listing owned by a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    pub id: Id,

    /// Owner of the listing
    pub user_id: Id,

    pub name: String,

    pub description: Option<String>,

    pub location: String,

    pub price_per_night: f64,

    /// False while a booking holds the property
    pub availability: bool,

    pub created_at: DateTime<Utc>,
}

impl Entity for Property {
    const TABLE_NAME: &'static str = "properties";
    const TYPE_NAME: &'static str = "Property";
}

impl Property {
    /// List configuration for `GET /properties`
    pub const LISTING: ListConfig = ListConfig::new(&["name", "price_per_night", "created_at"], "name")
        .searching(&["name", "description", "location"]);

    pub fn is_owned_by(&self, user_id: Id) -> bool {
        self.user_id == user_id
    }

    /// Apply a partial update
    pub fn apply(&mut self, changes: &PropertyChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(location) = &changes.location {
            self.location = location.clone();
        }
        if let Some(price) = changes.price_per_night {
            self.price_per_night = price;
        }
        if let Some(availability) = changes.availability {
            self.availability = availability;
        }
    }
}

impl Record for Property {
    fn record_id(&self) -> Id {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::owned(self.id.to_string()),
            "user_id" => FieldValue::owned(self.user_id.to_string()),
            "name" => FieldValue::text(&self.name),
            "description" => FieldValue::optional(self.description.as_deref(), FieldValue::text),
            "location" => FieldValue::text(&self.location),
            "price_per_night" => FieldValue::Number(self.price_per_night),
            "availability" => FieldValue::Bool(self.availability),
            "created_at" => FieldValue::owned(self.created_at.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }
}

/// Input for creating a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    /// Client-chosen id; generated when absent
    pub id: Option<Id>,
    pub user_id: Id,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub price_per_night: f64,
    pub availability: bool,
}

impl NewProperty {
    /// Materialize the stored record
    pub fn into_property(self, created_at: DateTime<Utc>) -> Property {
        Property {
            id: self.id.unwrap_or_else(Id::new_v4),
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            location: self.location,
            price_per_night: self.price_per_night,
            availability: self.availability,
            created_at,
        }
    }
}

/// Partial update of a property; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<f64>,
    pub availability: Option<bool>,
}

impl PropertyChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.price_per_night.is_none()
            && self.availability.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property() -> Property {
        NewProperty {
            id: None,
            user_id: Id::new_v4(),
            name: "Harbour View".to_string(),
            description: None,
            location: "Lisbon".to_string(),
            price_per_night: 95.0,
            availability: true,
        }
        .into_property(Utc::now())
    }

    #[test]
    fn test_fields_by_name() {
        let p = property();
        assert_eq!(p.field("name"), Some(FieldValue::text("Harbour View")));
        assert_eq!(p.field("price_per_night"), Some(FieldValue::Number(95.0)));
        assert_eq!(p.field("description"), Some(FieldValue::Null));
        assert_eq!(p.field("nope"), None);
    }

    #[test]
    fn test_apply_changes() {
        let mut p = property();
        p.apply(&PropertyChanges {
            price_per_night: Some(120.0),
            availability: Some(false),
            ..Default::default()
        });
        assert_eq!(p.price_per_night, 120.0);
        assert!(!p.availability);
        assert_eq!(p.name, "Harbour View");
    }

    #[test]
    fn test_listing_configuration() {
        assert_eq!(Property::LISTING.sort_field(Some("nonexistent_field")), "name");
        assert_eq!(Property::LISTING.sort_field(Some("price_per_night")), "price_per_night");
    }
}
