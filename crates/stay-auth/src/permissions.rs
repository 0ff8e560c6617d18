//! Caller identity and ownership rules
//!
//! A resource may be changed by its owner or by an admin. Nothing else is
//! role-gated.

use stay_core::Id;
use stay_models::Role;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Id,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: Id, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// May this user change a resource owned by `owner_id`?
    pub fn can_manage(&self, owner_id: Id) -> bool {
        self.is_admin() || self.id == owner_id
    }
}
