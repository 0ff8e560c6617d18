//! Registration and profile contracts

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use stay_core::ValidationErrors;
use stay_models::ProfileChanges;

use crate::base::{check_length, Contract, ValidationResult};

/// Valid email pattern
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static LETTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]").unwrap());

static DIGIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").unwrap());

/// Absolute http(s) URL
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap());

/// Minimum password length
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Registration body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Login body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Contract for self-registration
#[derive(Debug, Default, Clone, Copy)]
pub struct RegisterContract;

impl RegisterContract {
    pub fn validate_email(&self, email: Option<&str>, errors: &mut ValidationErrors) {
        match email.map(str::trim) {
            Some(email) if EMAIL_PATTERN.is_match(email) => {}
            _ => errors.add("email", "Valid email is required"),
        }
    }

    pub fn validate_password(&self, password: Option<&str>, errors: &mut ValidationErrors) {
        let password = password.unwrap_or_default();
        if password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add("password", "Password must be at least 6 characters long");
        }
        if !LETTER_PATTERN.is_match(password) {
            errors.add("password", "Password must contain a letter");
        }
        if !DIGIT_PATTERN.is_match(password) {
            errors.add("password", "Password must contain a number");
        }
    }
}

impl Contract<RegisterRequest> for RegisterContract {
    fn validate(&self, request: &RegisterRequest) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_email(request.email.as_deref(), &mut errors);
        self.validate_password(request.password.as_deref(), &mut errors);
        if request.name.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            errors.add("name", "Name is required");
        }
        check_length(request.name.as_deref(), "name", 255, &mut errors);

        errors.into_result()
    }
}

/// Profile update body
///
/// Only these fields are self-editable; anything else in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// Contract for `PATCH /auth/me`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileUpdateContract;

impl ProfileUpdateContract {
    pub fn changes(&self, request: &ProfileUpdateRequest) -> Result<ProfileChanges, ValidationErrors> {
        self.validate(request)?;
        Ok(ProfileChanges {
            name: request.name.as_deref().map(|n| n.trim().to_string()),
            avatar_url: request.avatar_url.clone(),
            bio: request.bio.clone(),
        })
    }
}

impl Contract<ProfileUpdateRequest> for ProfileUpdateContract {
    fn validate(&self, request: &ProfileUpdateRequest) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                errors.add("name", "Name can't be blank");
            }
        }
        check_length(request.name.as_deref(), "name", 255, &mut errors);

        if let Some(url) = &request.avatar_url {
            if !URL_PATTERN.is_match(url) {
                errors.add("avatar_url", "Avatar URL must be an http(s) URL");
            }
        }
        check_length(request.avatar_url.as_deref(), "avatar_url", 2048, &mut errors);
        check_length(request.bio.as_deref(), "bio", 1000, &mut errors);

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(RegisterContract.validate(&register("ana@example.com", "secret1", "Ana")).is_ok());
    }

    #[test]
    fn test_password_rules() {
        let errors = RegisterContract
            .validate(&register("ana@example.com", "abc", "Ana"))
            .unwrap_err();
        assert_eq!(
            errors.get("password"),
            vec!["Password must be at least 6 characters long", "Password must contain a number"]
        );

        let errors = RegisterContract
            .validate(&register("ana@example.com", "1234567", "Ana"))
            .unwrap_err();
        assert_eq!(errors.get("password"), vec!["Password must contain a letter"]);
    }

    #[test]
    fn test_email_and_name_required() {
        let errors = RegisterContract.validate(&register("not-an-email", "secret1", " ")).unwrap_err();
        assert_eq!(errors.get("email"), vec!["Valid email is required"]);
        assert_eq!(errors.get("name"), vec!["Name is required"]);
    }

    #[test]
    fn test_profile_update_ignores_role() {
        let body = serde_json::json!({ "bio": "Surfer", "role": "admin" });
        let request: ProfileUpdateRequest = serde_json::from_value(body).unwrap();
        let changes = ProfileUpdateContract.changes(&request).unwrap();
        assert_eq!(changes.bio.as_deref(), Some("Surfer"));
        assert!(changes.name.is_none());
    }

    #[test]
    fn test_profile_update_rejects_bad_values() {
        let errors = ProfileUpdateContract
            .validate(&ProfileUpdateRequest {
                name: Some("".to_string()),
                avatar_url: Some("javascript:alert(1)".to_string()),
                bio: None,
            })
            .unwrap_err();
        assert!(errors.has_error("name"));
        assert!(errors.has_error("avatar_url"));
    }
}
