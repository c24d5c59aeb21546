//! Authentication, sessions and role checks.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Opaque session tokens stored only as SHA-256 digests
//! - The session authority (login, resolve, authorize, logout)
//! - The append-only authentication audit trail

mod authority;
mod error;
mod event;
mod password;
mod policy;
mod principal;
mod session;
mod store;
mod token;

#[cfg(test)]
mod authority_tests;
#[cfg(test)]
mod policy_props;

pub use authority::SessionAuthority;
pub use error::{AuthenticationError, AuthorizationError};
pub use event::{AuthEvent, AuthEventKind, MAX_EMAIL_LENGTH, MAX_IP_LENGTH, clip};
pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, check_password_policy, hash_password, verify_password,
};
pub use policy::{authorize, authorize_any};
pub use principal::{Principal, normalize_email};
pub use session::{ClientInfo, Session, SessionPolicy};
pub use store::{AuditLog, PrincipalDirectory, SessionStore};
pub use token::SessionToken;

use serde::{Deserialize, Serialize};

/// Roles a principal can hold. Each principal holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator; not bound to any school.
    SuperAdmin,
    /// Runs one school: users, students, fees and payments.
    SchoolAdmin,
    /// Staff member of one school.
    Teacher,
    /// Student (or guardian) login bound to a student record.
    Student,
}

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Self; 4] = [Self::SuperAdmin, Self::SchoolAdmin, Self::Teacher, Self::Student];

    /// Wire and storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::SchoolAdmin => "school_admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// Returns true if principals with this role belong to a school.
    #[must_use]
    pub const fn is_school_scoped(self) -> bool {
        !matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}
