//! Principals as seen by the authority.

use scholaris_shared::types::{SchoolId, UserId};

use super::Role;

/// A login-capable account together with the state of its school.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Principal ID.
    pub id: UserId,
    /// Lower-cased login email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// The single role this principal holds.
    pub role: Role,
    /// Owning school; `None` only for super admins.
    pub school_id: Option<SchoolId>,
    /// Account flag.
    pub is_active: bool,
    /// Flag of the owning school; `true` when there is no school.
    pub school_active: bool,
}

impl Principal {
    /// A principal is suspended when either its account or its school is inactive.
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        !self.is_active || !self.school_active
    }
}

/// Normalizes an email for lookup and storage.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
