//! Booking contracts

use serde::Deserialize;
use stay_core::{Id, ValidationErrors};
use stay_models::{BookingDates, NewBooking};

use crate::base::{parse_date, parse_id, Contract, ValidationResult};

const CHECK_OUT_AFTER_CHECK_IN: &str = "Check-out date must be after check-in date";

/// Booking creation body as sent by a client
///
/// A `user_id` in the body is ignored; the booking always belongs to the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingDraft {
    pub property_id: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub total_price: Option<f64>,
}

/// Booking update body; either date may be omitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingUpdateDraft {
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
}

/// Contract for creating a booking
#[derive(Debug, Default, Clone, Copy)]
pub struct BookingCreateContract;

impl BookingCreateContract {
    /// Validate `draft` and build the booking input for `user_id`
    pub fn build(&self, draft: &BookingDraft, user_id: Id) -> Result<NewBooking, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if draft.property_id.is_none() {
            errors.add("property_id", "Property ID is required");
        }
        if draft.check_in_date.is_none() {
            errors.add("check_in_date", "Check-in date is required");
        }
        if draft.check_out_date.is_none() {
            errors.add("check_out_date", "Check-out date is required");
        }

        let property_id = parse_id(draft.property_id.as_deref(), "property_id", &mut errors);
        let check_in = parse_date(draft.check_in_date.as_deref(), "check_in_date", &mut errors);
        let check_out = parse_date(draft.check_out_date.as_deref(), "check_out_date", &mut errors);

        if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
            if check_out <= check_in {
                errors.add("check_out_date", CHECK_OUT_AFTER_CHECK_IN);
            }
        }

        if let Some(total) = draft.total_price {
            if !total.is_finite() || total < 0.0 {
                errors.add("total_price", "Total price must not be negative");
            }
        }

        match (property_id, check_in, check_out) {
            (Some(property_id), Some(check_in_date), Some(check_out_date)) if errors.is_empty() => {
                Ok(NewBooking {
                    property_id,
                    user_id,
                    check_in_date,
                    check_out_date,
                    total_price: draft.total_price,
                })
            }
            _ => Err(errors),
        }
    }
}

impl Contract<BookingDraft> for BookingCreateContract {
    fn validate(&self, draft: &BookingDraft) -> ValidationResult {
        self.build(draft, Id::nil()).map(|_| ())
    }
}

/// Contract for changing the dates of an existing booking
#[derive(Debug, Clone, Copy)]
pub struct BookingUpdateContract {
    existing: BookingDates,
}

impl BookingUpdateContract {
    pub fn new(existing: BookingDates) -> Self {
        Self { existing }
    }

    /// Validate `draft` and merge it over the current dates
    pub fn resolve(&self, draft: &BookingUpdateDraft) -> Result<BookingDates, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let check_in = parse_date(draft.check_in_date.as_deref(), "check_in_date", &mut errors);
        let check_out = parse_date(draft.check_out_date.as_deref(), "check_out_date", &mut errors);
        errors.into_result()?;

        let dates = BookingDates {
            check_in_date: check_in.unwrap_or(self.existing.check_in_date),
            check_out_date: check_out.unwrap_or(self.existing.check_out_date),
        };

        let mut errors = ValidationErrors::new();
        if dates.check_out_date <= dates.check_in_date {
            errors.add("check_out_date", CHECK_OUT_AFTER_CHECK_IN);
        }
        errors.into_result().map(|_| dates)
    }
}

impl Contract<BookingUpdateDraft> for BookingUpdateContract {
    fn validate(&self, draft: &BookingUpdateDraft) -> ValidationResult {
        self.resolve(draft).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft(check_in: &str, check_out: &str) -> BookingDraft {
        BookingDraft {
            property_id: Some(Id::new_v4().to_string()),
            check_in_date: Some(check_in.to_string()),
            check_out_date: Some(check_out.to_string()),
            total_price: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_valid_booking() {
        let user_id = Id::new_v4();
        let booking = BookingCreateContract.build(&draft("2024-05-10", "2024-05-12"), user_id).unwrap();
        assert_eq!(booking.user_id, user_id);
        assert_eq!(booking.dates().nights(), 2);
    }

    #[test]
    fn test_check_out_before_check_in() {
        let errors = BookingCreateContract
            .validate(&draft("2024-05-10", "2024-05-09"))
            .unwrap_err();
        assert_eq!(errors.get("check_out_date"), vec![CHECK_OUT_AFTER_CHECK_IN]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_same_day_is_rejected() {
        assert!(BookingCreateContract.validate(&draft("2024-05-10", "2024-05-10")).is_err());
    }

    #[test]
    fn test_missing_fields() {
        let errors = BookingCreateContract.validate(&BookingDraft::default()).unwrap_err();
        assert_eq!(errors.get("property_id"), vec!["Property ID is required"]);
        assert_eq!(errors.get("check_in_date"), vec!["Check-in date is required"]);
        assert_eq!(errors.get("check_out_date"), vec!["Check-out date is required"]);
    }

    #[test]
    fn test_body_user_id_is_ignored() {
        let body = serde_json::json!({
            "property_id": Id::new_v4(),
            "user_id": "someone-else",
            "check_in_date": "2024-05-10",
            "check_out_date": "2024-05-11"
        });
        let draft: BookingDraft = serde_json::from_value(body).unwrap();
        let me = Id::new_v4();
        assert_eq!(BookingCreateContract.build(&draft, me).unwrap().user_id, me);
    }

    #[test]
    fn test_update_merges_with_existing_dates() {
        let contract = BookingUpdateContract::new(BookingDates {
            check_in_date: date("2024-05-10"),
            check_out_date: date("2024-05-15"),
        });

        let moved = contract
            .resolve(&BookingUpdateDraft {
                check_in_date: Some("2024-05-12".to_string()),
                check_out_date: None,
            })
            .unwrap();
        assert_eq!(moved.check_in_date, date("2024-05-12"));
        assert_eq!(moved.check_out_date, date("2024-05-15"));

        let errors = contract
            .validate(&BookingUpdateDraft {
                check_in_date: Some("2024-05-20".to_string()),
                check_out_date: None,
            })
            .unwrap_err();
        assert!(errors.has_error("check_out_date"));
    }
}
