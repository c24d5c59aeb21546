//! Append-only authentication audit trail.

use scholaris_core::StoreError;
use scholaris_core::auth::{AuditLog, AuthEvent};
use scholaris_shared::types::{SchoolId, UserId};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use super::error::store_error;
use crate::entities::{auth_events, sea_orm_active_enums::AuthEventKindDb};

/// Auth event repository implementing [`AuditLog`].
#[derive(Debug, Clone)]
pub struct AuthEventRepository {
    db: DatabaseConnection,
}

impl AuthEventRepository {
    /// Creates a new auth event repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl AuditLog for AuthEventRepository {
    async fn append(&self, event: &AuthEvent) -> Result<(), StoreError> {
        let model = auth_events::ActiveModel {
            id: Set(event.id.into_inner()),
            user_id: Set(event.user_id.map(UserId::into_inner)),
            email: Set(event.email.clone()),
            school_id: Set(event.school_id.map(SchoolId::into_inner)),
            kind: Set(AuthEventKindDb::from(event.kind)),
            ip_address: Set(event.ip_address.clone()),
            user_agent: Set(event.user_agent.clone()),
            occurred_at: Set(event.occurred_at.into()),
        };

        model.insert(&self.db).await.map_err(store_error)?;
        Ok(())
    }
}
