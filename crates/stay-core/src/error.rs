//! Validation error types
//!
//! Validation failures are reported as a flat list of issues, each pointing at the
//! request field it concerns.

use serde::Serialize;
use std::fmt;

/// A single validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path to the offending field (empty for whole-request issues)
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.into()],
            message: message.into(),
        }
    }

    /// The top-level field this issue refers to, if any
    pub fn field(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

/// Collection of validation issues
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(field, message));
    }

    /// Add an issue that is not tied to a specific field
    pub fn add_base(&mut self, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: vec![],
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field() == Some(field))
    }

    /// Messages recorded for a specific field
    pub fn get(&self, field: &str) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.field() == Some(field))
            .map(|i| i.message.as_str())
            .collect()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.issues.extend(other.issues);
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|i| match i.field() {
                Some(field) => format!("{}: {}", field, i.message),
                None => i.message.clone(),
            })
            .collect()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_query() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("check_out_date", "Check-out date must be after check-in date");
        errors.add_base("Request is invalid");

        assert_eq!(errors.len(), 2);
        assert!(errors.has_error("check_out_date"));
        assert!(!errors.has_error("check_in_date"));
        assert_eq!(
            errors.get("check_out_date"),
            vec!["Check-out date must be after check-in date"]
        );
    }

    #[test]
    fn test_serializes_as_issue_list() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name is required");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "path": ["name"], "message": "Name is required" }])
        );
    }

    #[test]
    fn test_merge_and_into_result() {
        let mut a = ValidationErrors::new();
        a.add("name", "Name is required");
        let mut b = ValidationErrors::new();
        b.add("location", "Location is required");

        a.merge(b);
        assert_eq!(a.full_messages(), vec!["name: Name is required", "location: Location is required"]);
        assert!(a.into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
