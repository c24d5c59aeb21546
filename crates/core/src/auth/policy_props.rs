//! Property-based tests for role checks.
//!
//! - authorize(session, r, s) succeeds iff the role matches and either the
//!   role is super admin, no school is required, or the schools match.
//! - authorize_any is the disjunction of authorize over its roles.

use chrono::Utc;
use proptest::prelude::*;
use scholaris_shared::types::{SchoolId, SessionId, UserId};
use uuid::Uuid;

use super::{Role, Session, authorize, authorize_any};

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::SuperAdmin),
        Just(Role::SchoolAdmin),
        Just(Role::Teacher),
        Just(Role::Student),
    ]
}

/// Picks from a pool of three schools so that matches happen often.
fn school_strategy() -> impl Strategy<Value = Option<SchoolId>> {
    prop_oneof![
        Just(None),
        (1u128..=3).prop_map(|n| Some(SchoolId::from_uuid(Uuid::from_u128(n)))),
    ]
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

proptest! {
    #[test]
    fn prop_authorize_iff(
        held in role_strategy(),
        held_school in school_strategy(),
        required in role_strategy(),
        required_school in school_strategy(),
    ) {
        let s = session(held, held_school);
        let expected = held == required
            && (required == Role::SuperAdmin
                || required_school.is_none()
                || required_school == held_school);

        prop_assert_eq!(authorize(&s, required, required_school).is_ok(), expected);
    }

    #[test]
    fn prop_authorize_any_is_disjunction(
        held in role_strategy(),
        held_school in school_strategy(),
        roles in proptest::collection::vec(role_strategy(), 0..4),
        required_school in school_strategy(),
    ) {
        let s = session(held, held_school);
        let expected = roles.iter().any(|&r| authorize(&s, r, required_school).is_ok());

        prop_assert_eq!(authorize_any(&s, &roles, required_school).is_ok(), expected);
    }
}
