//! Request and response payloads for authentication and provisioning.
//!
//! Role names travel as strings on the wire and are parsed in `scholaris-core`.

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::types::{ClassId, SchoolId, StudentId, UserId};

/// Minimum password length accepted when a principal is created.
/// Mirrored by the `length` rules on the request payloads below.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Login request payload.
///
/// Deliberately not validated beyond deserialization: a malformed email is
/// just another failed login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque session token. Also set as the session cookie.
    pub token: String,
    /// Role bound to the session.
    pub role: String,
    /// School bound to the session (`None` for super admins).
    pub school_id: Option<SchoolId>,
    /// Absolute expiry of the session.
    pub expires_at: DateTime<Utc>,
}

/// Current session as returned by `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Principal owning the session.
    pub user_id: UserId,
    /// Role bound to the session.
    pub role: String,
    /// School bound to the session.
    pub school_id: Option<SchoolId>,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Registers a school together with its first administrator.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterSchoolRequest {
    /// School display name.
    #[garde(length(min = 1, max = 200))]
    pub name: String,
    /// School contact email.
    #[garde(email, length(max = 255))]
    pub email: String,
    /// Login email of the first school admin.
    #[garde(email, length(max = 255))]
    pub admin_email: String,
    /// Full name of the first school admin.
    #[garde(length(min = 1, max = 200))]
    pub admin_name: String,
    /// Initial password of the first school admin.
    #[garde(length(min = 8, max = 128))]
    pub admin_password: String,
}

/// Creates a principal inside a school.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePrincipalRequest {
    /// Login email.
    #[garde(email, length(max = 255))]
    pub email: String,
    /// Display name.
    #[garde(length(min = 1, max = 200))]
    pub full_name: String,
    /// Initial password.
    #[garde(length(min = 8, max = 128))]
    pub password: String,
    /// One of `school_admin`, `teacher`, `student`.
    #[garde(length(min = 1))]
    pub role: String,
}

/// Enrolls a student record in a school.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnrollStudentRequest {
    /// Admission number, unique per school.
    #[garde(length(min = 1, max = 50))]
    pub admission_no: String,
    /// Student name as printed on receipts.
    #[garde(length(min = 1, max = 200))]
    pub full_name: String,
    /// Student principal allowed to view this record's fee data.
    #[garde(skip)]
    pub user_id: Option<UserId>,
    /// Class to place the student in.
    #[garde(skip)]
    pub class_id: Option<ClassId>,
}

/// Created principal or school admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalResponse {
    /// Principal ID.
    pub id: UserId,
    /// Login email (lower-cased).
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role name.
    pub role: String,
    /// Owning school.
    pub school_id: Option<SchoolId>,
    /// Whether the principal may log in.
    pub is_active: bool,
}

/// Registered school with its first administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolResponse {
    /// School ID.
    pub id: SchoolId,
    /// Numeric code used in receipt numbers.
    pub code: i32,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// The school admin created with the school.
    pub admin: PrincipalResponse,
}

/// Enrolled student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    /// Student ID.
    pub id: StudentId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Linked student principal.
    pub user_id: Option<UserId>,
    /// Class the student is in.
    pub class_id: Option<ClassId>,
    /// Admission number.
    pub admission_no: String,
    /// Student name.
    pub full_name: String,
    /// Whether payments may be recorded.
    pub is_active: bool,
}
