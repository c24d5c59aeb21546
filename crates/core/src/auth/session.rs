//! Sessions and their lifetime rules.

use chrono::{DateTime, Duration, Utc};
use scholaris_shared::config::SessionConfig;
use scholaris_shared::types::{SchoolId, SessionId, UserId};

use super::Role;

/// An authenticated context. Role and school are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session ID.
    pub id: SessionId,
    /// SHA-256 hex digest of the token.
    pub token_hash: String,
    /// Principal that logged in.
    pub user_id: UserId,
    /// Role copied from the principal.
    pub role: Role,
    /// School copied from the principal.
    pub school_id: Option<SchoolId>,
    /// Login time.
    pub created_at: DateTime<Utc>,
    /// Last successful resolve.
    pub last_seen_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Request metadata recorded in the audit trail.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Remote address.
    pub ip_address: Option<String>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
}

/// Idle and absolute timeouts.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Inactivity window, slid forward on every resolve.
    pub idle_timeout: Duration,
    /// Hard cap measured from login.
    pub absolute_timeout: Duration,
}

impl SessionPolicy {
    /// Builds a policy from configuration seconds.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            idle_timeout: seconds(config.idle_timeout_secs),
            absolute_timeout: seconds(config.absolute_timeout_secs),
        }
    }

    /// Absolute expiry for a session opened at `now`.
    #[must_use]
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.absolute_timeout
    }

    /// True once either timeout has elapsed.
    #[must_use]
    pub fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now >= session.expires_at || now >= session.last_seen_at + self.idle_timeout
    }
}

fn seconds(secs: u64) -> Duration {
    // Out-of-range values saturate to roughly a century.
    Duration::seconds(i64::try_from(secs).map_or(3_155_760_000, |s| s.min(3_155_760_000)))
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(now: DateTime<Utc>, policy: &SessionPolicy) -> Session {
        Session {
            id: SessionId::new(),
            token_hash: "h".into(),
            user_id: UserId::new(),
            role: Role::Teacher,
            school_id: Some(SchoolId::new()),
            created_at: now,
            last_seen_at: now,
            expires_at: policy.expiry_from(now),
        }
    }

    #[test]
    fn test_default_policy_matches_config_defaults() {
        let policy = SessionPolicy::default();
        assert_eq!(policy.idle_timeout, Duration::minutes(30));
        assert_eq!(policy.absolute_timeout, Duration::hours(24));
    }

    #[test]
    fn test_idle_expiry() {
        let policy = SessionPolicy::default();
        let now = Utc::now();
        let session = session_at(now, &policy);

        assert!(!policy.is_expired(&session, now + Duration::minutes(29)));
        assert!(policy.is_expired(&session, now + Duration::minutes(30)));
    }

    #[test]
    fn test_absolute_expiry_wins_over_activity() {
        let policy = SessionPolicy::default();
        let now = Utc::now();
        let mut session = session_at(now, &policy);
        session.last_seen_at = now + Duration::hours(24) - Duration::minutes(1);

        assert!(!policy.is_expired(&session, now + Duration::hours(24) - Duration::seconds(1)));
        assert!(policy.is_expired(&session, now + Duration::hours(24)));
    }
}
