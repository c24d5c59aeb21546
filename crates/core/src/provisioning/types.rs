//! Provisioning domain types.

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_shared::auth::{PrincipalResponse, SchoolResponse, StudentResponse};
use scholaris_shared::fees::{ClassFeeStructureResponse, ClassResponse, FeeComponents};
use scholaris_shared::types::{
    ClassFeeStructureId, ClassId, FeeStructureId, Money, SchoolId, StudentId, UserId,
};

use crate::auth::{Principal, Role};
use crate::fees::Student;

/// A school (tenant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct School {
    /// School ID.
    pub id: SchoolId,
    /// Receipt code, allocated by the store at registration.
    pub code: i32,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Inactive schools suspend all of their principals.
    pub is_active: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A school to register. The store assigns `code`.
#[derive(Debug, Clone)]
pub struct NewSchool {
    /// Pre-allocated ID.
    pub id: SchoolId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// A principal to insert, password already hashed.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    /// Pre-allocated ID.
    pub id: UserId,
    /// Normalized email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// Role.
    pub role: Role,
    /// Owning school.
    pub school_id: Option<SchoolId>,
}

/// A student record to insert.
#[derive(Debug, Clone)]
pub struct NewStudent {
    /// Pre-allocated ID.
    pub id: StudentId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Linked student principal.
    pub user_id: Option<UserId>,
    /// Class, already checked to belong to the school.
    pub class_id: Option<ClassId>,
    /// Admission number.
    pub admission_no: String,
    /// Name.
    pub full_name: String,
}

/// A fee assignment. The store picks the version and retires the previous one.
#[derive(Debug, Clone)]
pub struct NewFeeStructure {
    /// Pre-allocated ID.
    pub id: FeeStructureId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Student.
    pub student_id: StudentId,
    /// Academic year label.
    pub academic_year: String,
    /// Total fee due.
    pub total_fee: Money,
    /// Installment due dates, ascending and distinct.
    pub due_dates: Vec<NaiveDate>,
    /// Class fee this assignment comes from.
    pub class_fee_structure_id: Option<ClassFeeStructureId>,
}

/// A class (grade and section) of a school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolClass {
    /// Class ID.
    pub id: ClassId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Name, e.g. `Grade 5`.
    pub name: String,
    /// Section, e.g. `A`.
    pub section: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A class to insert. Name and section are unique per school.
#[derive(Debug, Clone)]
pub struct NewClass {
    /// Pre-allocated ID.
    pub id: ClassId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Trimmed name.
    pub name: String,
    /// Trimmed section, `None` when blank.
    pub section: Option<String>,
}

/// The fee of a class for one academic year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFeeStructure {
    /// Class fee ID.
    pub id: ClassFeeStructureId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Class.
    pub class_id: ClassId,
    /// Academic year label.
    pub academic_year: String,
    /// Breakdown.
    pub components: FeeComponents,
    /// Sum of the components.
    pub total_fee: Money,
    /// Installment due dates, ascending.
    pub due_dates: Vec<NaiveDate>,
    /// First set.
    pub created_at: DateTime<Utc>,
    /// Last replaced. The most recently updated fee of a class is the one
    /// newly enrolled students receive.
    pub updated_at: DateTime<Utc>,
}

impl ClassFeeStructure {
    /// The per-student assignment this class fee implies.
    #[must_use]
    pub fn assignment_for(&self, student_id: StudentId) -> NewFeeStructure {
        NewFeeStructure {
            id: FeeStructureId::new(),
            school_id: self.school_id,
            student_id,
            academic_year: self.academic_year.clone(),
            total_fee: self.total_fee,
            due_dates: self.due_dates.clone(),
            class_fee_structure_id: Some(self.id),
        }
    }

    /// Builds the API response.
    #[must_use]
    pub fn into_response(self, students_assigned: u32) -> ClassFeeStructureResponse {
        ClassFeeStructureResponse {
            id: self.id,
            class_id: self.class_id,
            academic_year: self.academic_year,
            components: self.components,
            total_fee: self.total_fee,
            due_dates: self.due_dates,
            students_assigned,
        }
    }
}

/// A class fee to set. The store keeps one row per class and academic
/// year, replacing its breakdown when set again.
#[derive(Debug, Clone)]
pub struct NewClassFeeStructure {
    /// ID used if no fee exists yet for the class and year.
    pub id: ClassFeeStructureId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Class.
    pub class_id: ClassId,
    /// Academic year label.
    pub academic_year: String,
    /// Checked breakdown.
    pub components: FeeComponents,
    /// Installment due dates, ascending and distinct.
    pub due_dates: Vec<NaiveDate>,
}

impl From<SchoolClass> for ClassResponse {
    fn from(c: SchoolClass) -> Self {
        Self {
            id: c.id,
            school_id: c.school_id,
            name: c.name,
            section: c.section,
        }
    }
}

impl From<Principal> for PrincipalResponse {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            email: p.email,
            full_name: p.full_name,
            role: p.role.as_str().to_string(),
            school_id: p.school_id,
            is_active: p.is_active,
        }
    }
}

impl From<Student> for StudentResponse {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            school_id: s.school_id,
            user_id: s.user_id,
            class_id: s.class_id,
            admission_no: s.admission_no,
            full_name: s.full_name,
            is_active: s.is_active,
        }
    }
}

impl School {
    /// Builds the registration response.
    #[must_use]
    pub fn into_response(self, admin: Principal) -> SchoolResponse {
        SchoolResponse {
            id: self.id,
            code: self.code,
            name: self.name,
            email: self.email,
            admin: admin.into(),
        }
    }
}
