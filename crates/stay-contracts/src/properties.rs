//! Property contracts
//!
//! Creation and update share one contract: an update replaces the listing's
//! name, location, and price, so it carries the same required fields.

use serde::Deserialize;
use stay_core::{Id, ValidationErrors};
use stay_models::{NewProperty, PropertyChanges};

use crate::base::{check_length, parse_id, require_text, Contract, ValidationResult};

/// Property body as sent by a client
///
/// A `user_id` in the body is ignored; listings belong to the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<f64>,
    pub availability: Option<bool>,
}

struct Checked {
    id: Option<Id>,
    name: String,
    location: String,
    price_per_night: f64,
}

/// Contract for creating or replacing a property
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyContract;

impl PropertyContract {
    fn check(&self, draft: &PropertyDraft) -> Result<Checked, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let id = parse_id(draft.id.as_deref(), "id", &mut errors);
        require_text(draft.name.as_deref(), "name", "Name is required", &mut errors);
        check_length(draft.name.as_deref(), "name", 255, &mut errors);
        require_text(draft.location.as_deref(), "location", "Location is required", &mut errors);
        check_length(draft.location.as_deref(), "location", 255, &mut errors);

        match draft.price_per_night {
            None => errors.add("price_per_night", "Price per night is required"),
            Some(price) if !price.is_finite() || price <= 0.0 => {
                errors.add("price_per_night", "Price per night must be positive")
            }
            Some(_) => {}
        }

        errors.into_result()?;

        Ok(Checked {
            id,
            name: draft.name.as_deref().unwrap_or_default().trim().to_string(),
            location: draft.location.as_deref().unwrap_or_default().trim().to_string(),
            price_per_night: draft.price_per_night.unwrap_or_default(),
        })
    }

    /// Validate `draft` and build a new listing owned by `user_id`
    pub fn build(&self, draft: &PropertyDraft, user_id: Id) -> Result<NewProperty, ValidationErrors> {
        let checked = self.check(draft)?;
        Ok(NewProperty {
            id: checked.id,
            user_id,
            name: checked.name,
            description: draft.description.clone(),
            location: checked.location,
            price_per_night: checked.price_per_night,
            availability: draft.availability.unwrap_or(true),
        })
    }

    /// Validate `draft` as a replacement of an existing listing
    ///
    /// The id and owner never change; availability is kept unless sent, and
    /// stores keep a property with bookings unavailable regardless.
    pub fn changes(&self, draft: &PropertyDraft) -> Result<PropertyChanges, ValidationErrors> {
        let checked = self.check(draft)?;
        Ok(PropertyChanges {
            name: Some(checked.name),
            description: draft.description.clone(),
            location: Some(checked.location),
            price_per_night: Some(checked.price_per_night),
            availability: draft.availability,
        })
    }
}

impl Contract<PropertyDraft> for PropertyContract {
    fn validate(&self, draft: &PropertyDraft) -> ValidationResult {
        self.check(draft).map(|_| ())
    }
}
