//! The payment ledger.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use scholaris_shared::types::{Money, PaymentId, SchoolId, StudentId};
use tracing::{debug, info, warn};

use super::{
    FeeStatus, LedgerStore, OutstandingBalance, Payment, PaymentDraft, PaymentError, PaymentMode,
    PaymentNotice, PaymentNotifier, RecordPayment, Student,
};
use crate::auth::Session;

/// Records payments and answers fee questions.
///
/// Access control happens before the ledger is called; `actor` is only
/// recorded as the payment's author.
#[derive(Clone)]
pub struct PaymentLedger {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn PaymentNotifier>,
    timezone: Tz,
}

impl PaymentLedger {
    /// Creates a ledger. `timezone` decides the business day of a payment.
    pub fn new(store: Arc<dyn LedgerStore>, notifier: Arc<dyn PaymentNotifier>, timezone: Tz) -> Self {
        Self {
            store,
            notifier,
            timezone,
        }
    }

    /// Records a payment now.
    pub async fn record_payment(
        &self,
        actor: &Session,
        input: RecordPayment,
    ) -> Result<Payment, PaymentError> {
        self.record_payment_at(actor, input, Utc::now()).await
    }

    /// Records a payment at `now`.
    ///
    /// Validation:
    /// 1. Amount is positive, at most [`Money::MAX`], with at most two
    ///    decimal places
    /// 2. Mode is supported
    /// 3. Student exists and is active
    /// 4. Student has an active fee structure
    ///
    /// Nothing is written unless all checks pass. A consistency failure
    /// while committing is retried once before surfacing as `TryAgain`.
    pub async fn record_payment_at(
        &self,
        actor: &Session,
        input: RecordPayment,
        now: DateTime<Utc>,
    ) -> Result<Payment, PaymentError> {
        if !input.amount.is_positive() {
            return Err(PaymentError::InvalidAmount(
                "Amount must be greater than zero".into(),
            ));
        }
        if !input.amount.has_valid_scale() {
            return Err(PaymentError::InvalidAmount(
                "Amount cannot have more than two decimal places".into(),
            ));
        }
        if !input.amount.is_within_limit() {
            return Err(PaymentError::InvalidAmount(format!(
                "Amount cannot exceed {}",
                Money::MAX
            )));
        }
        let mode: PaymentMode = input.mode.parse().map_err(PaymentError::UnsupportedMode)?;

        let student = self.active_student(input.student_id).await?;
        let structure = self
            .store
            .active_fee_structure(student.id)
            .await?
            .ok_or(PaymentError::NoFeeStructure(student.id))?;

        let draft = PaymentDraft {
            id: PaymentId::new(),
            school_id: student.school_id,
            school_code: student.school_code,
            student_id: student.id,
            fee_structure_id: structure.id,
            amount: input.amount,
            mode,
            reference: non_blank(input.reference),
            remarks: non_blank(input.remarks),
            paid_on: self.business_day(now),
            recorded_by: actor.user_id,
            recorded_at: now,
        };

        let payment = match self.store.commit_payment(draft.clone()).await {
            Err(err) if err.is_retryable() => {
                warn!(student_id = %student.id, error = %err, "Payment commit conflicted, retrying");
                match self.store.commit_payment(draft).await {
                    Err(err) if err.is_retryable() => {
                        warn!(student_id = %student.id, error = %err, "Payment commit conflicted twice");
                        return Err(PaymentError::TryAgain);
                    }
                    other => other?,
                }
            }
            other => other?,
        };

        info!(
            payment_id = %payment.id,
            receipt_no = %payment.receipt_no,
            student_id = %payment.student_id,
            amount = %payment.amount,
            recorded_by = %payment.recorded_by,
            "Payment committed"
        );

        if let Err(err) = self
            .notifier
            .payment_recorded(&PaymentNotice::from(&payment))
            .await
        {
            warn!(receipt_no = %payment.receipt_no, error = %err, "Payment notification failed");
        }

        Ok(payment)
    }

    /// All payments of a student, most recent first.
    pub async fn payment_history(&self, student_id: StudentId) -> Result<Vec<Payment>, PaymentError> {
        self.student_scope(student_id).await?;
        Ok(self.store.payment_history(student_id).await?)
    }

    /// Paid and remaining amounts against the active fee structure.
    pub async fn fee_status(&self, student_id: StudentId) -> Result<FeeStatus, PaymentError> {
        self.fee_status_at(student_id, Utc::now()).await
    }

    /// `fee_status` with overdue evaluated for the business day of `now`.
    pub async fn fee_status_at(
        &self,
        student_id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<FeeStatus, PaymentError> {
        self.student_scope(student_id).await?;
        let status = self
            .store
            .fee_status(student_id)
            .await?
            .ok_or(PaymentError::NoFeeStructure(student_id))?;
        Ok(status.as_of(self.business_day(now)))
    }

    /// Students of a school with a remaining balance, earliest due date
    /// first. Students without a schedule come last, by admission number.
    pub async fn outstanding_balances(
        &self,
        school_id: SchoolId,
        overdue_only: bool,
    ) -> Result<Vec<OutstandingBalance>, PaymentError> {
        self.outstanding_balances_at(school_id, overdue_only, Utc::now())
            .await
    }

    /// `outstanding_balances` for the business day of `now`.
    pub async fn outstanding_balances_at(
        &self,
        school_id: SchoolId,
        overdue_only: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutstandingBalance>, PaymentError> {
        let today = self.business_day(now);
        let mut balances: Vec<OutstandingBalance> = self
            .store
            .school_fee_statuses(school_id)
            .await?
            .into_iter()
            .map(|(student, status)| {
                let status = status.as_of(today);
                OutstandingBalance {
                    days_overdue: status.days_overdue(today),
                    student,
                    status,
                }
            })
            .filter(|b| b.status.remaining_amount.is_positive())
            .filter(|b| !overdue_only || b.status.overdue)
            .collect();

        balances.sort_by(|a, b| {
            let due = |x: &OutstandingBalance| {
                (x.status.next_due_date.is_none(), x.status.next_due_date)
            };
            due(a)
                .cmp(&due(b))
                .then_with(|| a.student.admission_no.cmp(&b.student.admission_no))
        });
        debug!(
            school_id = %school_id,
            overdue_only,
            count = balances.len(),
            "Outstanding balances listed"
        );
        Ok(balances)
    }

    /// Loads the student record for an ownership check.
    pub async fn student_scope(&self, student_id: StudentId) -> Result<Student, PaymentError> {
        self.store
            .find_student(student_id)
            .await?
            .ok_or(PaymentError::UnknownStudent(student_id))
    }

    fn business_day(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    async fn active_student(&self, student_id: StudentId) -> Result<Student, PaymentError> {
        let student = self.student_scope(student_id).await?;
        if !student.is_active {
            return Err(PaymentError::InactiveStudent(student_id));
        }
        Ok(student)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
