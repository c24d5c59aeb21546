//! Who may create and deactivate whom.

use scholaris_shared::types::SchoolId;

use crate::auth::{AuthorizationError, Principal, Role, Session};

/// Super admins create school admins, teachers and students anywhere; school
/// admins create teachers and students in their own school. Nobody creates a
/// super admin.
pub fn can_create_role(
    actor: &Session,
    role: Role,
    school_id: SchoolId,
) -> Result<(), AuthorizationError> {
    if role == Role::SuperAdmin {
        return Err(AuthorizationError::Forbidden(
            "Super admins cannot be created".into(),
        ));
    }
    match actor.role {
        Role::SuperAdmin => Ok(()),
        Role::SchoolAdmin
            if actor.school_id == Some(school_id)
                && matches!(role, Role::Teacher | Role::Student) =>
        {
            Ok(())
        }
        _ => Err(AuthorizationError::forbidden()),
    }
}

/// Nobody deactivates themselves or a super admin. Super admins deactivate
/// anyone else; school admins deactivate teachers and students of their own
/// school.
pub fn can_deactivate(actor: &Session, target: &Principal) -> Result<(), AuthorizationError> {
    if actor.user_id == target.id {
        return Err(AuthorizationError::Forbidden(
            "You cannot deactivate your own account".into(),
        ));
    }
    if target.role == Role::SuperAdmin {
        return Err(AuthorizationError::forbidden());
    }
    match actor.role {
        Role::SuperAdmin => Ok(()),
        Role::SchoolAdmin
            if actor.school_id.is_some()
                && target.school_id == actor.school_id
                && matches!(target.role, Role::Teacher | Role::Student) =>
        {
            Ok(())
        }
        _ => Err(AuthorizationError::forbidden()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use scholaris_shared::types::{SessionId, UserId};
    use uuid::Uuid;

    fn school(n: u128) -> SchoolId {
        SchoolId::from_uuid(Uuid::from_u128(n))
    }

    fn session(role: Role, school_id: Option<SchoolId>) -> Session {
        let now = Utc::now();
        Session {
            id: SessionId::new(),
            token_hash: String::new(),
            user_id: UserId::new(),
            role,
            school_id,
            created_at: now,
            last_seen_at: now,
            expires_at: now,
        }
    }

    fn principal(role: Role, school_id: Option<SchoolId>) -> Principal {
        Principal {
            id: UserId::new(),
            email: "p@school.test".into(),
            password_hash: String::new(),
            full_name: "P".into(),
            role,
            school_id,
            is_active: true,
            school_active: true,
        }
    }

    #[rstest]
    #[case(Role::SuperAdmin, None, Role::SchoolAdmin, 1, true)]
    #[case(Role::SuperAdmin, None, Role::Student, 2, true)]
    #[case(Role::SuperAdmin, None, Role::SuperAdmin, 1, false)]
    #[case(Role::SchoolAdmin, Some(1), Role::Teacher, 1, true)]
    #[case(Role::SchoolAdmin, Some(1), Role::Student, 1, true)]
    #[case(Role::SchoolAdmin, Some(1), Role::SchoolAdmin, 1, false)]
    #[case(Role::SchoolAdmin, Some(1), Role::Teacher, 2, false)]
    #[case(Role::Teacher, Some(1), Role::Student, 1, false)]
    #[case(Role::Student, Some(1), Role::Student, 1, false)]
    fn test_can_create_role(
        #[case] actor_role: Role,
        #[case] actor_school: Option<u128>,
        #[case] role: Role,
        #[case] target_school: u128,
        #[case] allowed: bool,
    ) {
        let actor = session(actor_role, actor_school.map(school));
        assert_eq!(
            can_create_role(&actor, role, school(target_school)).is_ok(),
            allowed
        );
    }

    #[rstest]
    #[case(Role::SuperAdmin, None, Role::SchoolAdmin, Some(1), true)]
    #[case(Role::SuperAdmin, None, Role::SuperAdmin, None, false)]
    #[case(Role::SchoolAdmin, Some(1), Role::Teacher, Some(1), true)]
    #[case(Role::SchoolAdmin, Some(1), Role::Student, Some(2), false)]
    #[case(Role::SchoolAdmin, Some(1), Role::SchoolAdmin, Some(1), false)]
    #[case(Role::Teacher, Some(1), Role::Student, Some(1), false)]
    fn test_can_deactivate(
        #[case] actor_role: Role,
        #[case] actor_school: Option<u128>,
        #[case] target_role: Role,
        #[case] target_school: Option<u128>,
        #[case] allowed: bool,
    ) {
        let actor = session(actor_role, actor_school.map(school));
        let target = principal(target_role, target_school.map(school));
        assert_eq!(can_deactivate(&actor, &target).is_ok(), allowed);
    }

    #[test]
    fn test_cannot_deactivate_self() {
        let actor = session(Role::SuperAdmin, None);
        let mut target = principal(Role::SchoolAdmin, Some(school(1)));
        target.id = actor.user_id;
        assert!(can_deactivate(&actor, &target).is_err());
    }
}
