//! Principal lookups backing the session authority.

use scholaris_core::StoreError;
use scholaris_core::auth::{Principal, PrincipalDirectory};
use scholaris_shared::types::{SchoolId, UserId};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::error::store_error;
use crate::entities::{schools, users};

/// User repository implementing [`PrincipalDirectory`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Builds a principal from a user row and its school, if it has one.
pub(crate) fn to_principal(user: users::Model, school: Option<&schools::Model>) -> Principal {
    Principal {
        id: UserId::from_uuid(user.id),
        email: user.email,
        password_hash: user.password_hash,
        full_name: user.full_name,
        role: user.role.into(),
        school_id: user.school_id.map(SchoolId::from_uuid),
        is_active: user.is_active,
        school_active: school.is_none_or(|s| s.is_active),
    }
}

#[async_trait::async_trait]
impl PrincipalDirectory for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let row = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .find_also_related(schools::Entity)
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(row.map(|(user, school)| to_principal(user, school.as_ref())))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Principal>, StoreError> {
        let row = users::Entity::find_by_id(id.into_inner())
            .find_also_related(schools::Entity)
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(row.map(|(user, school)| to_principal(user, school.as_ref())))
    }
}
