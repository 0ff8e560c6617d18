//! Base contract system

use chrono::NaiveDate;
use stay_core::{parse_calendar_date, Id, ValidationErrors};

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the draft
    fn validate(&self, draft: &T) -> ValidationResult;
}

/// Record `message` unless `value` holds non-blank text
pub fn require_text(value: Option<&str>, field: &str, message: &str, errors: &mut ValidationErrors) {
    if value.map(str::trim).unwrap_or_default().is_empty() {
        errors.add(field, message);
    }
}

/// Parse an optional UUID field, recording an issue when it is malformed
pub fn parse_id(value: Option<&str>, field: &str, errors: &mut ValidationErrors) -> Option<Id> {
    let raw = value?;
    match Id::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, "Must be a valid UUID");
            None
        }
    }
}

/// Parse an optional calendar date field, recording an issue when it is malformed
pub fn parse_date(value: Option<&str>, field: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let raw = value?;
    match parse_calendar_date(raw) {
        Some(date) => Some(date),
        None => {
            errors.add(field, "Must be a valid date (YYYY-MM-DD)");
            None
        }
    }
}

/// Record an issue when `value` is longer than `max` characters
pub fn check_length(value: Option<&str>, field: &str, max: usize, errors: &mut ValidationErrors) {
    if let Some(value) = value {
        if value.chars().count() > max {
            errors.add(field, format!("Is too long (maximum is {} characters)", max));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        let mut errors = ValidationErrors::new();
        require_text(Some("  "), "name", "Name is required", &mut errors);
        require_text(None, "location", "Location is required", &mut errors);
        require_text(Some("Lisbon"), "city", "City is required", &mut errors);
        assert_eq!(errors.len(), 2);
        assert!(!errors.has_error("city"));
    }

    #[test]
    fn test_parse_helpers() {
        let mut errors = ValidationErrors::new();
        assert!(parse_id(Some("not-a-uuid"), "property_id", &mut errors).is_none());
        assert!(parse_id(None, "id", &mut errors).is_none());
        assert!(parse_date(Some("2024-02-30"), "check_in_date", &mut errors).is_none());
        assert!(parse_date(Some("2024-02-28"), "check_out_date", &mut errors).is_some());
        assert_eq!(errors.len(), 2);
        assert!(errors.has_error("property_id"));
        assert!(errors.has_error("check_in_date"));
    }
}
