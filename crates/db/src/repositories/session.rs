//! Session repository for database operations.

use chrono::{DateTime, Utc};
use scholaris_core::StoreError;
use scholaris_core::auth::{Session, SessionPolicy, SessionStore};
use scholaris_shared::types::{SchoolId, SessionId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use super::error::store_error;
use crate::entities::{sea_orm_active_enums::UserRole, sessions};

/// Session repository implementing [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Deletes sessions that `policy` considers expired at `now`, whether by
    /// absolute expiry or by idling. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn purge_expired(
        &self,
        policy: &SessionPolicy,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sessions::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(sessions::Column::ExpiresAt.lte(now))
                    .add(sessions::Column::LastSeenAt.lte(now - policy.idle_timeout)),
            )
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected)
    }
}

fn to_session(model: sessions::Model) -> Session {
    Session {
        id: SessionId::from_uuid(model.id),
        token_hash: model.token_hash,
        user_id: UserId::from_uuid(model.user_id),
        role: model.role.into(),
        school_id: model.school_id.map(SchoolId::from_uuid),
        created_at: model.created_at.to_utc(),
        last_seen_at: model.last_seen_at.to_utc(),
        expires_at: model.expires_at.to_utc(),
    }
}

#[async_trait::async_trait]
impl SessionStore for SessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let model = sessions::ActiveModel {
            id: Set(session.id.into_inner()),
            token_hash: Set(session.token_hash.clone()),
            user_id: Set(session.user_id.into_inner()),
            role: Set(UserRole::from(session.role)),
            school_id: Set(session.school_id.map(SchoolId::into_inner)),
            created_at: Set(session.created_at.into()),
            last_seen_at: Set(session.last_seen_at.into()),
            expires_at: Set(session.expires_at.into()),
        };

        model.insert(&self.db).await.map_err(store_error)?;
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let model = sessions::Entity::find()
            .filter(sessions::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(model.map(to_session))
    }

    async fn touch(&self, token_hash: &str, last_seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        let last_seen: sea_orm::prelude::DateTimeWithTimeZone = last_seen_at.into();
        sessions::Entity::update_many()
            .col_expr(sessions::Column::LastSeenAt, Expr::value(last_seen))
            .filter(sessions::Column::TokenHash.eq(token_hash))
            // Concurrent requests may race; the clock only moves forward.
            .filter(sessions::Column::LastSeenAt.lt(last_seen))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool, StoreError> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::UserId.eq(user_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected)
    }
}
