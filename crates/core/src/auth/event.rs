//! Authentication audit events.

use chrono::{DateTime, Utc};
use scholaris_shared::types::{AuthEventId, SchoolId, UserId};
use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    /// Credentials accepted and a session opened.
    LoginSucceeded,
    /// Unknown email or wrong password.
    LoginFailed,
    /// Correct password for a suspended principal.
    LoginSuspended,
    /// A live session was terminated.
    Logout,
}

impl AuthEventKind {
    /// Storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoginSucceeded => "login_succeeded",
            Self::LoginFailed => "login_failed",
            Self::LoginSuspended => "login_suspended",
            Self::Logout => "logout",
        }
    }
}

/// One append-only audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    /// Entry ID.
    pub id: AuthEventId,
    /// Principal, when the email matched one.
    pub user_id: Option<UserId>,
    /// Email as presented (normalized).
    pub email: String,
    /// School of the principal, when known.
    pub school_id: Option<SchoolId>,
    /// Event kind.
    pub kind: AuthEventKind,
    /// Remote address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
}

/// Longest email an audit entry (or a principal) can hold.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Longest remote address an audit entry keeps.
pub const MAX_IP_LENGTH: usize = 45;

/// Cuts `value` to at most `max` characters.
#[must_use]
pub fn clip(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}
