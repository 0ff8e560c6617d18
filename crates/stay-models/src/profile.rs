//! User profile model
//!
//! Table: profiles

use crate::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stay_core::Id;
use stay_queries::{FieldValue, Record};

/// Marketplace role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Host,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Host => "host",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role name that is not guest, host, or admin
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "host" => Ok(Self::Host),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Public profile of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub user_id: Id,
    pub name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Entity for UserProfile {
    const TABLE_NAME: &'static str = "profiles";
    const TYPE_NAME: &'static str = "Profile";
}

impl UserProfile {
    pub fn new(user_id: Id, email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            user_id,
            name,
            email: email.into(),
            avatar_url: None,
            bio: None,
            role: Role::Guest,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, changes: &ProfileChanges) {
        if let Some(name) = &changes.name {
            self.name = Some(name.clone());
        }
        if let Some(avatar_url) = &changes.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
        if let Some(bio) = &changes.bio {
            self.bio = Some(bio.clone());
        }
    }
}

impl Record for UserProfile {
    fn record_id(&self) -> Id {
        self.user_id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "user_id" => FieldValue::owned(self.user_id.to_string()),
            "name" => FieldValue::optional(self.name.as_deref(), FieldValue::text),
            "email" => FieldValue::text(&self.email),
            "avatar_url" => FieldValue::optional(self.avatar_url.as_deref(), FieldValue::text),
            "bio" => FieldValue::optional(self.bio.as_deref(), FieldValue::text),
            "role" => FieldValue::text(self.role.as_str()),
            "created_at" => FieldValue::owned(self.created_at.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }
}

/// Self-service profile update; role and email are not editable here
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar_url.is_none() && self.bio.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(Role::try_from("host".to_string()), Ok(Role::Host));
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Guest);
    }

    #[test]
    fn test_profile_changes() {
        let mut profile = UserProfile::new(Id::new_v4(), "ana@example.com", None);
        profile.apply(&ProfileChanges {
            bio: Some("Surfer".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.bio.as_deref(), Some("Surfer"));
        assert!(profile.name.is_none());
        assert_eq!(profile.field("role"), Some(FieldValue::text("guest")));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let profile = UserProfile::new(Id::new_v4(), "ana@example.com", Some("Ana".to_string()));
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "guest");
    }
}
