//! Provisioning service.

use std::sync::Arc;

use chrono::NaiveDate;
use scholaris_shared::auth::{CreatePrincipalRequest, EnrollStudentRequest, RegisterSchoolRequest};
use scholaris_shared::fees::{
    AssignFeeStructureRequest, CreateClassRequest, FeeComponents, MAX_INSTALLMENTS,
    SetClassFeeStructureRequest,
};
use scholaris_shared::types::{
    ClassFeeStructureId, ClassId, FeeStructureId, Money, SchoolId, StudentId, UserId,
};
use tracing::info;

use super::{
    ClassFeeStructure, NewClass, NewClassFeeStructure, NewFeeStructure, NewPrincipal, NewSchool,
    NewStudent, ProvisioningError, ProvisioningStore, School, SchoolClass, can_create_role,
    can_deactivate,
};
use crate::auth::{
    MAX_EMAIL_LENGTH, Principal, PrincipalDirectory, Role, Session, authorize,
    check_password_policy, hash_password, normalize_email,
};
use crate::fees::{FeeStructure, Student, normalize_due_dates};

/// Creates and retires schools, principals, students and fee structures.
#[derive(Clone)]
pub struct Provisioner {
    store: Arc<dyn ProvisioningStore>,
    principals: Arc<dyn PrincipalDirectory>,
}

impl Provisioner {
    /// Creates a provisioner.
    pub fn new(store: Arc<dyn ProvisioningStore>, principals: Arc<dyn PrincipalDirectory>) -> Self {
        Self { store, principals }
    }

    /// Registers a school with its first school admin. Super admins only.
    pub async fn register_school(
        &self,
        actor: &Session,
        request: RegisterSchoolRequest,
    ) -> Result<(School, Principal), ProvisioningError> {
        authorize(actor, Role::SuperAdmin, None)?;

        let school_id = SchoolId::new();
        let admin = new_principal(
            &request.admin_email,
            &request.admin_name,
            &request.admin_password,
            Role::SchoolAdmin,
            Some(school_id),
        )
        .map_err(admin_field)?;
        let school = NewSchool {
            id: school_id,
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
        };

        let (school, admin) = self.store.register_school(school, admin).await?;
        info!(
            school_id = %school.id,
            code = school.code,
            admin_id = %admin.id,
            registered_by = %actor.user_id,
            "School registered"
        );
        Ok((school, admin))
    }

    /// Creates a school admin, teacher or student in a school.
    pub async fn create_principal(
        &self,
        actor: &Session,
        school_id: SchoolId,
        request: CreatePrincipalRequest,
    ) -> Result<Principal, ProvisioningError> {
        let role: Role = request
            .role
            .parse()
            .map_err(|msg| ProvisioningError::invalid("role", msg))?;
        can_create_role(actor, role, school_id)?;
        self.existing_school(school_id).await?;

        let principal = new_principal(
            &request.email,
            &request.full_name,
            &request.password,
            role,
            Some(school_id),
        )?;
        let principal = self.store.insert_principal(principal).await?;
        info!(
            user_id = %principal.id,
            role = %principal.role,
            school_id = %school_id,
            created_by = %actor.user_id,
            "Principal created"
        );
        Ok(principal)
    }

    /// Deactivates a principal and revokes its sessions.
    pub async fn deactivate_principal(
        &self,
        actor: &Session,
        user_id: UserId,
    ) -> Result<(), ProvisioningError> {
        let target = self
            .principals
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ProvisioningError::NotFound(format!("User not found: {user_id}")))?;
        can_deactivate(actor, &target)?;

        let revoked = self
            .store
            .set_principal_active(user_id, false)
            .await?
            .ok_or_else(|| ProvisioningError::NotFound(format!("User not found: {user_id}")))?;
        info!(
            user_id = %user_id,
            deactivated_by = %actor.user_id,
            revoked,
            "Principal deactivated"
        );
        Ok(())
    }

    /// Enrolls a student record. School admin of that school only.
    ///
    /// A linked `user_id` must be a student principal of the same school,
    /// and a `class_id` a class of the same school. A student placed in a
    /// class that has a fee starts with that fee.
    pub async fn enroll_student(
        &self,
        actor: &Session,
        school_id: SchoolId,
        request: EnrollStudentRequest,
    ) -> Result<Student, ProvisioningError> {
        authorize(actor, Role::SchoolAdmin, Some(school_id))?;
        self.existing_school(school_id).await?;

        if let Some(user_id) = request.user_id {
            let linked = self.principals.find_by_id(user_id).await?;
            if !linked.is_some_and(|p| p.role == Role::Student && p.school_id == Some(school_id)) {
                return Err(ProvisioningError::invalid(
                    "user_id",
                    "Linked user must be a student of this school",
                ));
            }
        }
        if let Some(class_id) = request.class_id {
            let class = self.store.find_class(class_id).await?;
            if !class.is_some_and(|c| c.school_id == school_id) {
                return Err(ProvisioningError::invalid(
                    "class_id",
                    "Class must belong to this school",
                ));
            }
        }

        let student = self
            .store
            .insert_student(NewStudent {
                id: StudentId::new(),
                school_id,
                user_id: request.user_id,
                class_id: request.class_id,
                admission_no: request.admission_no.trim().to_string(),
                full_name: request.full_name.trim().to_string(),
            })
            .await?;
        info!(student_id = %student.id, school_id = %school_id, "Student enrolled");
        Ok(student)
    }

    /// Assigns a new fee structure version to a student.
    pub async fn assign_fee_structure(
        &self,
        actor: &Session,
        student_id: StudentId,
        request: AssignFeeStructureRequest,
    ) -> Result<FeeStructure, ProvisioningError> {
        let student = self
            .store
            .find_student(student_id)
            .await?
            .ok_or_else(|| ProvisioningError::NotFound(format!("Student not found: {student_id}")))?;
        authorize(actor, Role::SchoolAdmin, Some(student.school_id))?;

        check_total_fee(request.total_fee)?;
        let due_dates = check_due_dates(request.due_dates)?;

        let fee = self
            .store
            .assign_fee_structure(NewFeeStructure {
                id: FeeStructureId::new(),
                school_id: student.school_id,
                student_id,
                academic_year: request.academic_year.trim().to_string(),
                total_fee: request.total_fee,
                due_dates,
                class_fee_structure_id: None,
            })
            .await?;
        info!(
            student_id = %student_id,
            fee_structure_id = %fee.id,
            version = fee.version,
            total_fee = %fee.total_fee,
            "Fee structure assigned"
        );
        Ok(fee)
    }

    /// Creates a class in a school. School admin of that school only.
    pub async fn create_class(
        &self,
        actor: &Session,
        school_id: SchoolId,
        request: CreateClassRequest,
    ) -> Result<SchoolClass, ProvisioningError> {
        authorize(actor, Role::SchoolAdmin, Some(school_id))?;
        self.existing_school(school_id).await?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ProvisioningError::invalid("name", "Class name is required"));
        }
        let class = self
            .store
            .insert_class(NewClass {
                id: ClassId::new(),
                school_id,
                name,
                section: request
                    .section
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            })
            .await?;
        info!(class_id = %class.id, school_id = %school_id, name = %class.name, "Class created");
        Ok(class)
    }

    /// Sets the fee of a class for an academic year and applies it to every
    /// active student of the class. School admin of the class's school only.
    ///
    /// Returns the class fee and the number of students that received a
    /// new fee structure version.
    pub async fn set_class_fee_structure(
        &self,
        actor: &Session,
        class_id: ClassId,
        request: SetClassFeeStructureRequest,
    ) -> Result<(ClassFeeStructure, u32), ProvisioningError> {
        let class = self
            .store
            .find_class(class_id)
            .await?
            .ok_or_else(|| ProvisioningError::NotFound(format!("Class not found: {class_id}")))?;
        authorize(actor, Role::SchoolAdmin, Some(class.school_id))?;

        check_components(&request.components)?;
        check_total_fee(request.components.total())?;
        let due_dates = check_due_dates(request.due_dates)?;

        let (fee, assigned) = self
            .store
            .set_class_fee_structure(NewClassFeeStructure {
                id: ClassFeeStructureId::new(),
                school_id: class.school_id,
                class_id,
                academic_year: request.academic_year.trim().to_string(),
                components: request.components,
                due_dates,
            })
            .await?;
        info!(
            class_id = %class_id,
            class_fee_structure_id = %fee.id,
            total_fee = %fee.total_fee,
            students_assigned = assigned,
            "Class fee structure set"
        );
        Ok((fee, assigned))
    }

    async fn existing_school(&self, school_id: SchoolId) -> Result<School, ProvisioningError> {
        self.store
            .find_school(school_id)
            .await?
            .ok_or_else(|| ProvisioningError::NotFound(format!("School not found: {school_id}")))
    }
}

fn new_principal(
    email: &str,
    full_name: &str,
    password: &str,
    role: Role,
    school_id: Option<SchoolId>,
) -> Result<NewPrincipal, ProvisioningError> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') || email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ProvisioningError::invalid("email", "A valid email is required"));
    }
    check_password_policy(password)
        .map_err(|err| ProvisioningError::invalid("password", err.to_string()))?;

    Ok(NewPrincipal {
        id: UserId::new(),
        email,
        password_hash: hash_password(password)?,
        full_name: full_name.trim().to_string(),
        role,
        school_id,
    })
}

fn check_total_fee(total: Money) -> Result<(), ProvisioningError> {
    if total.is_positive() && total.has_valid_scale() && total.is_within_limit() {
        return Ok(());
    }
    Err(ProvisioningError::invalid(
        "total_fee",
        format!(
            "Total fee must be positive, at most {}, with at most two decimal places",
            Money::MAX
        ),
    ))
}

fn check_components(components: &FeeComponents) -> Result<(), ProvisioningError> {
    for (name, amount) in components.named() {
        if amount < Money::ZERO || !amount.has_valid_scale() || !amount.is_within_limit() {
            return Err(ProvisioningError::invalid(
                "components",
                format!(
                    "Fee component {name} must be between 0 and {} with at most two decimal places",
                    Money::MAX
                ),
            ));
        }
    }
    Ok(())
}

fn check_due_dates(due_dates: Vec<NaiveDate>) -> Result<Vec<NaiveDate>, ProvisioningError> {
    if due_dates.len() > MAX_INSTALLMENTS {
        return Err(ProvisioningError::invalid(
            "due_dates",
            format!("At most {MAX_INSTALLMENTS} due dates are allowed"),
        ));
    }
    normalize_due_dates(due_dates)
        .ok_or_else(|| ProvisioningError::invalid("due_dates", "Due dates must be distinct"))
}

/// Maps principal field names onto the school registration payload.
fn admin_field(err: ProvisioningError) -> ProvisioningError {
    match err {
        ProvisioningError::Validation { field, message } => ProvisioningError::Validation {
            field: match field {
                "email" => "admin_email",
                "password" => "admin_password",
                other => other,
            },
            message,
        },
        other => other,
    }
}
