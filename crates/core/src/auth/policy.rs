//! Role and school scope checks over an explicitly passed session.

use scholaris_shared::types::SchoolId;

use super::{AuthorizationError, Role, Session};

/// Allows the operation iff the session holds `required_role` and, unless the
/// role is super admin or no school is required, the session's school equals
/// `required_school`.
pub fn authorize(
    session: &Session,
    required_role: Role,
    required_school: Option<SchoolId>,
) -> Result<(), AuthorizationError> {
    if session.role != required_role {
        return Err(AuthorizationError::forbidden());
    }
    match required_school {
        _ if required_role == Role::SuperAdmin => Ok(()),
        None => Ok(()),
        Some(school) if session.school_id == Some(school) => Ok(()),
        Some(_) => Err(AuthorizationError::Forbidden(
            "This resource belongs to another school".into(),
        )),
    }
}

/// Succeeds if `authorize` succeeds for any of `roles`.
pub fn authorize_any(
    session: &Session,
    roles: &[Role],
    required_school: Option<SchoolId>,
) -> Result<(), AuthorizationError> {
    let mut last = AuthorizationError::forbidden();
    for &role in roles {
        match authorize(session, role, required_school) {
            Ok(()) => return Ok(()),
            Err(err) => last = err,
        }
    }
    Err(last)
}
