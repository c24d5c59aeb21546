//! Persistence seam for provisioning.

use scholaris_shared::types::{ClassId, SchoolId, StudentId, UserId};

use super::{
    ClassFeeStructure, NewClass, NewClassFeeStructure, NewFeeStructure, NewPrincipal, NewSchool,
    NewStudent, School, SchoolClass,
};
use crate::StoreError;
use crate::auth::Principal;
use crate::fees::{FeeStructure, Student};

/// Writes behind the provisioning cascade. Duplicates surface as
/// `StoreError::Conflict`.
#[async_trait::async_trait]
pub trait ProvisioningStore: Send + Sync {
    /// Finds a school.
    async fn find_school(&self, id: SchoolId) -> Result<Option<School>, StoreError>;

    /// Inserts a school and its first admin in one unit of work, allocating
    /// the next school code.
    async fn register_school(
        &self,
        school: NewSchool,
        admin: NewPrincipal,
    ) -> Result<(School, Principal), StoreError>;

    /// Inserts a principal.
    async fn insert_principal(&self, principal: NewPrincipal) -> Result<Principal, StoreError>;

    /// Flips a principal's active flag. Deactivating also deletes the
    /// principal's sessions in the same write.
    ///
    /// Returns the number of sessions deleted, or `None` if no such principal.
    async fn set_principal_active(
        &self,
        id: UserId,
        active: bool,
    ) -> Result<Option<u64>, StoreError>;

    /// Inserts a student record. If the student's class has a fee, the
    /// class's current fee is assigned as version 1 in the same unit of work.
    async fn insert_student(&self, student: NewStudent) -> Result<Student, StoreError>;

    /// Finds a student record.
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// Inserts the next fee structure version for the student and
    /// deactivates the previous one, in one unit of work.
    async fn assign_fee_structure(
        &self,
        fee: NewFeeStructure,
    ) -> Result<FeeStructure, StoreError>;

    /// Inserts a class.
    async fn insert_class(&self, class: NewClass) -> Result<SchoolClass, StoreError>;

    /// Finds a class.
    async fn find_class(&self, id: ClassId) -> Result<Option<SchoolClass>, StoreError>;

    /// Creates or replaces the class fee for `(class_id, academic_year)` and
    /// assigns a new fee structure version derived from it to every active
    /// student of the class, all in one unit of work.
    ///
    /// Returns the stored class fee and the number of students assigned.
    async fn set_class_fee_structure(
        &self,
        fee: NewClassFeeStructure,
    ) -> Result<(ClassFeeStructure, u32), StoreError>;
}
