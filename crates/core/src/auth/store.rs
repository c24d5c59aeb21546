//! Persistence seams used by the session authority.

use scholaris_shared::types::UserId;

use super::{AuthEvent, Principal, Session};
use crate::StoreError;

/// Looks up principals.
#[async_trait::async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Finds a principal by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;

    /// Finds a principal by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<Principal>, StoreError>;
}

/// Stores live sessions keyed by token digest.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session.
    async fn insert(&self, session: &Session) -> Result<(), StoreError>;

    /// Loads a session by token digest.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, StoreError>;

    /// Moves `last_seen_at` forward.
    async fn touch(
        &self,
        token_hash: &str,
        last_seen_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError>;

    /// Deletes one session. Returns whether a row was removed.
    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Deletes every session of a principal. Returns the number removed.
    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, StoreError>;
}

/// Append-only authentication audit trail.
#[async_trait::async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends one event.
    async fn append(&self, event: &AuthEvent) -> Result<(), StoreError>;
}
