//! Provisioning writes: schools, principals, classes, students and fee
//! structures.

use chrono::Utc;
use scholaris_core::StoreError;
use scholaris_core::auth::Principal;
use scholaris_core::fees::{FeeStructure, Student};
use scholaris_core::provisioning::{
    ClassFeeStructure, NewClass, NewClassFeeStructure, NewFeeStructure, NewPrincipal, NewSchool,
    NewStudent, ProvisioningStore, School, SchoolClass,
};
use scholaris_shared::fees::FeeComponents;
use scholaris_shared::types::{
    ClassFeeStructureId, ClassId, Money, SchoolId, StudentId, UserId,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};

use super::error::{conflict_as, race_error, store_error};
use super::payment::{
    due_dates_from_json, due_dates_to_json, load_student, refresh_fee_status, to_fee_structure,
    to_student,
};
use super::user::to_principal;
use crate::entities::{
    class_fee_structures, classes, fee_structures, schools, sea_orm_active_enums::UserRole,
    sessions, students, users,
};

const EMAIL_TAKEN: &str = "Email already registered";
const CLASS_TAKEN: &str = "Class already exists";

/// School repository implementing [`ProvisioningStore`].
#[derive(Debug, Clone)]
pub struct SchoolRepository {
    db: DatabaseConnection,
}

impl SchoolRepository {
    /// Creates a new school repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Activates or suspends a whole school. Returns false if no such school.
    ///
    /// Suspending also deletes every live session of the school, and its
    /// principals cannot log in until it is reactivated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_school_active(&self, id: SchoolId, active: bool) -> Result<bool, StoreError> {
        let txn = self.db.begin().await.map_err(store_error)?;

        let result = schools::Entity::update_many()
            .col_expr(schools::Column::IsActive, Expr::value(active))
            .col_expr(
                schools::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(schools::Column::Id.eq(id.into_inner()))
            .exec(&txn)
            .await
            .map_err(store_error)?;

        if !active {
            let revoked = sessions::Entity::delete_many()
                .filter(sessions::Column::SchoolId.eq(id.into_inner()))
                .exec(&txn)
                .await
                .map_err(store_error)?;
            tracing::info!(school_id = %id, revoked = revoked.rows_affected, "school suspended");
        }

        txn.commit().await.map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }
}

fn to_school(model: schools::Model) -> School {
    School {
        id: SchoolId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        email: model.email,
        is_active: model.is_active,
        created_at: model.created_at.to_utc(),
    }
}

async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    principal: NewPrincipal,
) -> Result<users::Model, DbErr> {
    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(principal.id.into_inner()),
        email: Set(principal.email),
        password_hash: Set(principal.password_hash),
        full_name: Set(principal.full_name),
        role: Set(UserRole::from(principal.role)),
        school_id: Set(principal.school_id.map(SchoolId::into_inner)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user.insert(conn).await
}

/// Conflict message for a rejected student insert.
fn student_conflict(err: DbErr) -> StoreError {
    match store_error(err) {
        StoreError::Conflict(detail) if detail.contains("uq_students_user") => {
            StoreError::Conflict("User is already linked to a student record".into())
        }
        StoreError::Conflict(_) => StoreError::Conflict("Admission number already in use".into()),
        other => other,
    }
}

fn to_class(model: classes::Model) -> SchoolClass {
    SchoolClass {
        id: ClassId::from_uuid(model.id),
        school_id: SchoolId::from_uuid(model.school_id),
        name: model.name,
        section: model.section,
        created_at: model.created_at.to_utc(),
    }
}

fn to_class_fee(model: class_fee_structures::Model) -> Result<ClassFeeStructure, StoreError> {
    let components = FeeComponents {
        tuition: Money::new(model.tuition_fee),
        admission: Money::new(model.admission_fee),
        development: Money::new(model.development_fee),
        transport: Money::new(model.transport_fee),
        library: Money::new(model.library_fee),
        lab: Money::new(model.lab_fee),
        sports: Money::new(model.sports_fee),
        other: Money::new(model.other_fee),
    };
    Ok(ClassFeeStructure {
        id: ClassFeeStructureId::from_uuid(model.id),
        school_id: SchoolId::from_uuid(model.school_id),
        class_id: ClassId::from_uuid(model.class_id),
        academic_year: model.academic_year,
        components,
        total_fee: Money::new(model.total_fee),
        due_dates: due_dates_from_json(model.due_dates)?,
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
    })
}

/// The most recently set fee of a class.
async fn current_class_fee<C: ConnectionTrait>(
    conn: &C,
    class_id: ClassId,
) -> Result<Option<ClassFeeStructure>, StoreError> {
    class_fee_structures::Entity::find()
        .filter(class_fee_structures::Column::ClassId.eq(class_id.into_inner()))
        .order_by_desc(class_fee_structures::Column::UpdatedAt)
        .one(conn)
        .await
        .map_err(store_error)?
        .map(to_class_fee)
        .transpose()
}

/// Inserts the next fee structure version of a student and retires the
/// previous one.
///
/// Must run inside a transaction; the student row stays locked until commit.
async fn assign_in<C: ConnectionTrait>(
    txn: &C,
    fee: NewFeeStructure,
) -> Result<FeeStructure, StoreError> {
    let student_id = fee.student_id.into_inner();

    // Serializes concurrent amendments of the same student.
    students::Entity::find_by_id(student_id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(store_error)?
        .ok_or_else(|| StoreError::Backend(format!("student {student_id} not found")))?;

    let latest = fee_structures::Entity::find()
        .filter(fee_structures::Column::StudentId.eq(student_id))
        .order_by_desc(fee_structures::Column::Version)
        .one(txn)
        .await
        .map_err(store_error)?;
    let version = latest.map_or(1, |f| f.version + 1);

    fee_structures::Entity::update_many()
        .col_expr(fee_structures::Column::IsActive, Expr::value(false))
        .filter(fee_structures::Column::StudentId.eq(student_id))
        .filter(fee_structures::Column::IsActive.eq(true))
        .exec(txn)
        .await
        .map_err(store_error)?;

    let row = fee_structures::ActiveModel {
        id: Set(fee.id.into_inner()),
        school_id: Set(fee.school_id.into_inner()),
        student_id: Set(student_id),
        academic_year: Set(fee.academic_year),
        total_fee: Set(fee.total_fee.amount()),
        due_dates: Set(due_dates_to_json(&fee.due_dates)),
        class_fee_structure_id: Set(fee.class_fee_structure_id.map(ClassFeeStructureId::into_inner)),
        version: Set(version),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    };
    let structure = row.insert(txn).await.map_err(race_error)?;

    refresh_fee_status(txn, student_id).await?;

    tracing::info!(
        student_id = %student_id,
        version,
        "fee structure assigned"
    );
    to_fee_structure(structure)
}

#[async_trait::async_trait]
impl ProvisioningStore for SchoolRepository {
    async fn find_school(&self, id: SchoolId) -> Result<Option<School>, StoreError> {
        let model = schools::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(model.map(to_school))
    }

    async fn register_school(
        &self,
        school: NewSchool,
        admin: NewPrincipal,
    ) -> Result<(School, Principal), StoreError> {
        let txn = self.db.begin().await.map_err(store_error)?;

        let now = Utc::now().into();
        let row = schools::ActiveModel {
            id: Set(school.id.into_inner()),
            code: NotSet,
            name: Set(school.name),
            email: Set(school.email),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let school = row.insert(&txn).await.map_err(store_error)?;
        let admin = insert_user(&txn, admin)
            .await
            .map_err(conflict_as(EMAIL_TAKEN))?;

        txn.commit().await.map_err(store_error)?;

        tracing::info!(school_id = %school.id, code = school.code, "school registered");
        let principal = to_principal(admin, Some(&school));
        Ok((to_school(school), principal))
    }

    async fn insert_principal(&self, principal: NewPrincipal) -> Result<Principal, StoreError> {
        let school = match principal.school_id {
            Some(id) => schools::Entity::find_by_id(id.into_inner())
                .one(&self.db)
                .await
                .map_err(store_error)?,
            None => None,
        };
        let user = insert_user(&self.db, principal)
            .await
            .map_err(conflict_as(EMAIL_TAKEN))?;

        Ok(to_principal(user, school.as_ref()))
    }

    async fn set_principal_active(
        &self,
        id: UserId,
        active: bool,
    ) -> Result<Option<u64>, StoreError> {
        let txn = self.db.begin().await.map_err(store_error)?;

        let result = users::Entity::update_many()
            .col_expr(users::Column::IsActive, Expr::value(active))
            .col_expr(
                users::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(users::Column::Id.eq(id.into_inner()))
            .exec(&txn)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        let mut revoked = 0;
        if !active {
            revoked = sessions::Entity::delete_many()
                .filter(sessions::Column::UserId.eq(id.into_inner()))
                .exec(&txn)
                .await
                .map_err(store_error)?
                .rows_affected;
        }

        txn.commit().await.map_err(store_error)?;
        Ok(Some(revoked))
    }

    async fn insert_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let txn = self.db.begin().await.map_err(store_error)?;

        let school = schools::Entity::find_by_id(new.school_id.into_inner())
            .one(&txn)
            .await
            .map_err(store_error)?
            .ok_or_else(|| StoreError::Backend(format!("school {} not found", new.school_id)))?;

        let now = Utc::now().into();
        let row = students::ActiveModel {
            id: Set(new.id.into_inner()),
            school_id: Set(new.school_id.into_inner()),
            user_id: Set(new.user_id.map(UserId::into_inner)),
            class_id: Set(new.class_id.map(ClassId::into_inner)),
            admission_no: Set(new.admission_no),
            full_name: Set(new.full_name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let student = row.insert(&txn).await.map_err(student_conflict)?;

        if let Some(class_id) = new.class_id
            && let Some(class_fee) = current_class_fee(&txn, class_id).await?
        {
            assign_in(&txn, class_fee.assignment_for(new.id)).await?;
        }

        txn.commit().await.map_err(store_error)?;
        Ok(to_student(student, &school))
    }

    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        load_student(&self.db, id).await
    }

    async fn assign_fee_structure(
        &self,
        fee: NewFeeStructure,
    ) -> Result<FeeStructure, StoreError> {
        let txn = self.db.begin().await.map_err(store_error)?;
        let structure = assign_in(&txn, fee).await?;
        txn.commit().await.map_err(store_error)?;
        Ok(structure)
    }

    async fn insert_class(&self, class: NewClass) -> Result<SchoolClass, StoreError> {
        let row = classes::ActiveModel {
            id: Set(class.id.into_inner()),
            school_id: Set(class.school_id.into_inner()),
            name: Set(class.name),
            section: Set(class.section),
            created_at: Set(Utc::now().into()),
        };
        let class = row
            .insert(&self.db)
            .await
            .map_err(conflict_as(CLASS_TAKEN))?;

        tracing::info!(class_id = %class.id, school_id = %class.school_id, "class created");
        Ok(to_class(class))
    }

    async fn find_class(&self, id: ClassId) -> Result<Option<SchoolClass>, StoreError> {
        let model = classes::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(model.map(to_class))
    }

    async fn set_class_fee_structure(
        &self,
        fee: NewClassFeeStructure,
    ) -> Result<(ClassFeeStructure, u32), StoreError> {
        let class_id = fee.class_id.into_inner();
        let txn = self.db.begin().await.map_err(store_error)?;

        // Serializes concurrent fee changes of the same class.
        classes::Entity::find_by_id(class_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(store_error)?
            .ok_or_else(|| StoreError::Backend(format!("class {class_id} not found")))?;

        let existing = class_fee_structures::Entity::find()
            .filter(class_fee_structures::Column::ClassId.eq(class_id))
            .filter(class_fee_structures::Column::AcademicYear.eq(fee.academic_year.as_str()))
            .one(&txn)
            .await
            .map_err(store_error)?;

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let c = fee.components;
        let row = class_fee_structures::ActiveModel {
            id: Set(existing.as_ref().map_or(fee.id.into_inner(), |f| f.id)),
            school_id: Set(fee.school_id.into_inner()),
            class_id: Set(class_id),
            academic_year: Set(fee.academic_year),
            tuition_fee: Set(c.tuition.amount()),
            admission_fee: Set(c.admission.amount()),
            development_fee: Set(c.development.amount()),
            transport_fee: Set(c.transport.amount()),
            library_fee: Set(c.library.amount()),
            lab_fee: Set(c.lab.amount()),
            sports_fee: Set(c.sports.amount()),
            other_fee: Set(c.other.amount()),
            total_fee: Set(c.total().amount()),
            due_dates: Set(due_dates_to_json(&fee.due_dates)),
            created_at: Set(existing.as_ref().map_or(now, |f| f.created_at)),
            updated_at: Set(now),
        };
        let stored = if existing.is_some() {
            row.update(&txn).await
        } else {
            row.insert(&txn).await
        }
        .map_err(race_error)?;
        let class_fee = to_class_fee(stored)?;

        let members = students::Entity::find()
            .filter(students::Column::ClassId.eq(class_id))
            .filter(students::Column::IsActive.eq(true))
            .order_by_asc(students::Column::Id)
            .all(&txn)
            .await
            .map_err(store_error)?;
        for member in &members {
            assign_in(&txn, class_fee.assignment_for(StudentId::from_uuid(member.id))).await?;
        }
        let assigned = u32::try_from(members.len())
            .map_err(|_| StoreError::Backend("class too large".into()))?;

        txn.commit().await.map_err(store_error)?;

        tracing::info!(
            class_id = %class_id,
            academic_year = %class_fee.academic_year,
            assigned,
            "class fee structure set"
        );
        Ok((class_fee, assigned))
    }
}
