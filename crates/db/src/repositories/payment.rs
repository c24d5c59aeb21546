//! Payment ledger persistence.
//!
//! Each payment is written in one transaction that
//! 1. bumps the `(school, day)` receipt counter with an upsert, holding its
//!    row lock until commit so receipt sequences stay gap-free,
//! 2. inserts the immutable payment and its `created` history row,
//! 3. locks and rewrites the student's `student_fee_status` row.
//!
//! Any failure drops the transaction, which rolls everything back including
//! the counter increment.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use scholaris_core::StoreError;
use scholaris_core::fees::{
    FeeStatus, FeeStructure, LedgerStore, Payment, PaymentDraft, PaymentError, Student,
};
use scholaris_shared::types::{
    ClassFeeStructureId, ClassId, FeeStructureId, Money, PaymentId, SchoolId, StudentId, UserId,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::prelude::Json;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use super::error::{race_error, store_error};
use crate::entities::{
    fee_structures, payment_events, payments, schools, sea_orm_active_enums::PaymentModeDb,
    student_fee_status, students,
};

/// Action recorded in `payment_events` for a new payment.
const PAYMENT_CREATED: &str = "created";

const NEXT_RECEIPT_SQL: &str = r"
INSERT INTO receipt_counters (school_id, day, last_value)
VALUES ($1, $2, 1)
ON CONFLICT (school_id, day)
DO UPDATE SET last_value = receipt_counters.last_value + 1
RETURNING last_value
";

const PAID_TOTALS_SQL: &str = r"
SELECT COALESCE(SUM(p.amount), 0) AS paid, MAX(p.paid_on) AS last_paid_on
FROM payments p
JOIN fee_structures f ON f.id = p.fee_structure_id
WHERE p.student_id = $1 AND f.academic_year = $2
";

#[derive(Debug, FromQueryResult)]
struct PaidTotals {
    paid: Decimal,
    last_paid_on: Option<NaiveDate>,
}

/// Payment repository implementing [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn to_student(student: students::Model, school: &schools::Model) -> Student {
    Student {
        id: StudentId::from_uuid(student.id),
        school_id: SchoolId::from_uuid(student.school_id),
        school_code: school.code,
        user_id: student.user_id.map(UserId::from_uuid),
        class_id: student.class_id.map(ClassId::from_uuid),
        admission_no: student.admission_no,
        full_name: student.full_name,
        is_active: student.is_active,
    }
}

/// Reads a JSON array of ISO dates.
pub(crate) fn due_dates_from_json(value: Json) -> Result<Vec<NaiveDate>, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Backend(format!("bad due_dates: {e}")))
}

pub(crate) fn due_dates_to_json(due_dates: &[NaiveDate]) -> Json {
    Json::Array(
        due_dates
            .iter()
            .map(|d| Json::String(d.format("%Y-%m-%d").to_string()))
            .collect(),
    )
}

pub(crate) fn to_fee_structure(model: fee_structures::Model) -> Result<FeeStructure, StoreError> {
    Ok(FeeStructure {
        id: FeeStructureId::from_uuid(model.id),
        school_id: SchoolId::from_uuid(model.school_id),
        student_id: StudentId::from_uuid(model.student_id),
        academic_year: model.academic_year,
        total_fee: Money::new(model.total_fee),
        due_dates: due_dates_from_json(model.due_dates)?,
        class_fee_structure_id: model.class_fee_structure_id.map(ClassFeeStructureId::from_uuid),
        version: model.version,
        is_active: model.is_active,
        created_at: model.created_at.to_utc(),
    })
}

fn to_payment(model: payments::Model) -> Payment {
    Payment {
        id: PaymentId::from_uuid(model.id),
        receipt_no: model.receipt_no,
        school_id: SchoolId::from_uuid(model.school_id),
        student_id: StudentId::from_uuid(model.student_id),
        fee_structure_id: FeeStructureId::from_uuid(model.fee_structure_id),
        amount: Money::new(model.amount),
        mode: model.mode.into(),
        reference: model.reference,
        remarks: model.remarks,
        paid_on: model.paid_on,
        recorded_by: UserId::from_uuid(model.recorded_by),
        recorded_at: model.recorded_at.to_utc(),
    }
}

/// Loads a student together with its school.
pub(crate) async fn load_student<C: ConnectionTrait>(
    conn: &C,
    id: StudentId,
) -> Result<Option<Student>, StoreError> {
    let row = students::Entity::find_by_id(id.into_inner())
        .find_also_related(schools::Entity)
        .one(conn)
        .await
        .map_err(store_error)?;

    match row {
        None => Ok(None),
        Some((student, Some(school))) => Ok(Some(to_student(student, &school))),
        Some((student, None)) => Err(StoreError::Backend(format!(
            "student {} has no school row",
            student.id
        ))),
    }
}

async fn load_active_structure<C: ConnectionTrait>(
    conn: &C,
    student_id: Uuid,
) -> Result<Option<fee_structures::Model>, StoreError> {
    fee_structures::Entity::find()
        .filter(fee_structures::Column::StudentId.eq(student_id))
        .filter(fee_structures::Column::IsActive.eq(true))
        .one(conn)
        .await
        .map_err(store_error)
}

/// Sums every payment of the student booked against any structure version of
/// the academic year.
async fn paid_totals<C: ConnectionTrait>(
    conn: &C,
    student_id: Uuid,
    academic_year: &str,
) -> Result<PaidTotals, StoreError> {
    let totals = PaidTotals::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        PAID_TOTALS_SQL,
        [student_id.into(), academic_year.into()],
    ))
    .one(conn)
    .await
    .map_err(store_error)?;

    Ok(totals.unwrap_or(PaidTotals {
        paid: Decimal::ZERO,
        last_paid_on: None,
    }))
}

/// Rewrites the cached fee status of a student from the ledger.
///
/// Must run inside a transaction; the status row stays locked until commit.
pub(crate) async fn refresh_fee_status<C: ConnectionTrait>(
    txn: &C,
    student_id: Uuid,
) -> Result<(), StoreError> {
    student_fee_status::Entity::find_by_id(student_id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(store_error)?;

    let Some(structure) = load_active_structure(txn, student_id).await? else {
        return Ok(());
    };
    let totals = paid_totals(txn, student_id, &structure.academic_year).await?;

    let row = student_fee_status::ActiveModel {
        student_id: Set(student_id),
        fee_structure_id: Set(structure.id),
        total_fee: Set(structure.total_fee),
        paid_amount: Set(totals.paid),
        last_payment_date: Set(totals.last_paid_on),
        updated_at: Set(Utc::now().into()),
    };
    student_fee_status::Entity::insert(row)
        .on_conflict(
            OnConflict::column(student_fee_status::Column::StudentId)
                .update_columns([
                    student_fee_status::Column::FeeStructureId,
                    student_fee_status::Column::TotalFee,
                    student_fee_status::Column::PaidAmount,
                    student_fee_status::Column::LastPaymentDate,
                    student_fee_status::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(txn)
        .await
        .map_err(store_error)?;

    Ok(())
}

async fn next_receipt_sequence<C: ConnectionTrait>(
    txn: &C,
    school_id: SchoolId,
    day: NaiveDate,
) -> Result<u32, StoreError> {
    let row = txn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_RECEIPT_SQL,
            [school_id.into_inner().into(), day.into()],
        ))
        .await
        .map_err(store_error)?
        .ok_or_else(|| StoreError::Backend("receipt counter upsert returned no row".into()))?;

    let value: i32 = row.try_get("", "last_value").map_err(store_error)?;
    u32::try_from(value).map_err(|_| StoreError::Backend(format!("bad receipt counter {value}")))
}

#[async_trait::async_trait]
impl LedgerStore for PaymentRepository {
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        load_student(&self.db, id).await
    }

    async fn active_fee_structure(
        &self,
        student_id: StudentId,
    ) -> Result<Option<FeeStructure>, StoreError> {
        load_active_structure(&self.db, student_id.into_inner())
            .await?
            .map(to_fee_structure)
            .transpose()
    }

    async fn commit_payment(&self, draft: PaymentDraft) -> Result<Payment, PaymentError> {
        let txn = self.db.begin().await.map_err(store_error)?;

        let sequence = next_receipt_sequence(&txn, draft.school_id, draft.paid_on).await?;
        let payment = draft.into_payment(sequence)?;

        let model = payments::ActiveModel {
            id: Set(payment.id.into_inner()),
            school_id: Set(payment.school_id.into_inner()),
            student_id: Set(payment.student_id.into_inner()),
            fee_structure_id: Set(payment.fee_structure_id.into_inner()),
            receipt_no: Set(payment.receipt_no.clone()),
            amount: Set(payment.amount.amount()),
            mode: Set(PaymentModeDb::from(payment.mode)),
            reference: Set(payment.reference.clone()),
            remarks: Set(payment.remarks.clone()),
            paid_on: Set(payment.paid_on),
            recorded_by: Set(payment.recorded_by.into_inner()),
            recorded_at: Set(payment.recorded_at.into()),
        };
        // A duplicate receipt number means another writer won the race.
        model.insert(&txn).await.map_err(race_error)?;

        let event = payment_events::ActiveModel {
            id: Set(Uuid::now_v7()),
            payment_id: Set(payment.id.into_inner()),
            action: Set(PAYMENT_CREATED.to_string()),
            amount: Set(payment.amount.amount()),
            actor_id: Set(payment.recorded_by.into_inner()),
            occurred_at: Set(payment.recorded_at.into()),
        };
        event.insert(&txn).await.map_err(store_error)?;

        refresh_fee_status(&txn, payment.student_id.into_inner()).await?;

        txn.commit().await.map_err(store_error)?;

        tracing::debug!(
            receipt_no = %payment.receipt_no,
            sequence,
            "payment committed"
        );
        Ok(payment)
    }

    async fn payment_history(&self, student_id: StudentId) -> Result<Vec<Payment>, StoreError> {
        let rows = payments::Entity::find()
            .filter(payments::Column::StudentId.eq(student_id.into_inner()))
            .order_by_desc(payments::Column::RecordedAt)
            .order_by_desc(payments::Column::ReceiptNo)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(to_payment).collect())
    }

    async fn fee_status(&self, student_id: StudentId) -> Result<Option<FeeStatus>, StoreError> {
        let id = student_id.into_inner();
        let Some(structure) = load_active_structure(&self.db, id).await? else {
            return Ok(None);
        };

        let cached = student_fee_status::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .filter(|row| row.fee_structure_id == structure.id);

        let (paid, last_payment_date) = match cached {
            Some(row) => (row.paid_amount, row.last_payment_date),
            None => {
                let totals = paid_totals(&self.db, id, &structure.academic_year).await?;
                (totals.paid, totals.last_paid_on)
            }
        };

        Ok(Some(FeeStatus::from_totals(
            &to_fee_structure(structure)?,
            Money::new(paid),
            last_payment_date,
        )))
    }

    async fn school_fee_statuses(
        &self,
        school_id: SchoolId,
    ) -> Result<Vec<(Student, FeeStatus)>, StoreError> {
        let Some(school) = schools::Entity::find_by_id(school_id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?
        else {
            return Ok(Vec::new());
        };

        let structures = fee_structures::Entity::find()
            .filter(fee_structures::Column::SchoolId.eq(school.id))
            .filter(fee_structures::Column::IsActive.eq(true))
            .find_also_related(students::Entity)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        let mut cached: HashMap<Uuid, student_fee_status::Model> =
            student_fee_status::Entity::find()
                .inner_join(students::Entity)
                .filter(students::Column::SchoolId.eq(school.id))
                .all(&self.db)
                .await
                .map_err(store_error)?
                .into_iter()
                .map(|row| (row.student_id, row))
                .collect();

        let mut statuses = Vec::with_capacity(structures.len());
        for (structure, student) in structures {
            let Some(student) = student else {
                continue;
            };
            let (paid, last_payment_date) = match cached.remove(&student.id) {
                Some(row) if row.fee_structure_id == structure.id => {
                    (row.paid_amount, row.last_payment_date)
                }
                _ => {
                    let totals =
                        paid_totals(&self.db, student.id, &structure.academic_year).await?;
                    (totals.paid, totals.last_paid_on)
                }
            };
            let status = FeeStatus::from_totals(
                &to_fee_structure(structure)?,
                Money::new(paid),
                last_payment_date,
            );
            statuses.push((to_student(student, &school), status));
        }

        tracing::debug!(
            school_id = %school_id,
            students = statuses.len(),
            "loaded school fee statuses"
        );
        Ok(statuses)
    }
}
