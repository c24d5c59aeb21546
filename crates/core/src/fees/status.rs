//! Derived fee position of a student.

use chrono::NaiveDate;
use scholaris_shared::fees::FeeStatusResponse;
use scholaris_shared::types::{FeeStructureId, Money, StudentId};

use super::schedule::next_due_date;
use super::{FeeStructure, Payment};

/// Paid and remaining amounts against the active fee structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeStatus {
    /// Student ID.
    pub student_id: StudentId,
    /// Active fee structure.
    pub fee_structure_id: FeeStructureId,
    /// Academic year of the structure.
    pub academic_year: String,
    /// Total due.
    pub total_fee: Money,
    /// Exact sum of payments against the structure.
    pub paid_amount: Money,
    /// `max(total - paid, 0)`.
    pub remaining_amount: Money,
    /// `paid > total`.
    pub overpaid: bool,
    /// `max(paid - total, 0)`.
    pub excess_amount: Money,
    /// Latest `paid_on`.
    pub last_payment_date: Option<NaiveDate>,
    /// Due date of the first installment the payments do not cover.
    pub next_due_date: Option<NaiveDate>,
    /// Set by [`FeeStatus::as_of`].
    pub overdue: bool,
}

impl FeeStatus {
    /// Computes the status from the structure and the payments that count
    /// towards it: every payment of the student booked against any version
    /// of the same academic year. Callers select those payments.
    pub fn compute<'a>(
        structure: &FeeStructure,
        payments: impl IntoIterator<Item = &'a Payment>,
    ) -> Self {
        let mut paid_amount = Money::ZERO;
        let mut last_payment_date = None;
        for payment in payments {
            paid_amount += payment.amount;
            last_payment_date = last_payment_date.max(Some(payment.paid_on));
        }
        Self::from_totals(structure, paid_amount, last_payment_date)
    }

    /// Builds the status from an already summed paid amount.
    #[must_use]
    pub fn from_totals(
        structure: &FeeStructure,
        paid_amount: Money,
        last_payment_date: Option<NaiveDate>,
    ) -> Self {
        let total_fee = structure.total_fee;
        Self {
            student_id: structure.student_id,
            fee_structure_id: structure.id,
            academic_year: structure.academic_year.clone(),
            total_fee,
            paid_amount,
            remaining_amount: total_fee.saturating_sub(paid_amount),
            overpaid: paid_amount > total_fee,
            excess_amount: paid_amount.saturating_sub(total_fee),
            last_payment_date,
            next_due_date: next_due_date(total_fee, &structure.due_dates, paid_amount),
            overdue: false,
        }
    }

    /// Marks the status overdue if an uncovered installment fell due
    /// before `today`.
    #[must_use]
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.overdue = self.next_due_date.is_some_and(|due| due < today);
        self
    }

    /// Whole days `today` is past the next due date; zero unless overdue.
    #[must_use]
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        match self.next_due_date {
            Some(due) if self.overdue => (today - due).num_days(),
            _ => 0,
        }
    }
}

impl From<FeeStatus> for FeeStatusResponse {
    fn from(s: FeeStatus) -> Self {
        Self {
            student_id: s.student_id,
            fee_structure_id: s.fee_structure_id,
            academic_year: s.academic_year,
            total_fee: s.total_fee,
            paid_amount: s.paid_amount,
            remaining_amount: s.remaining_amount,
            overpaid: s.overpaid,
            excess_amount: s.excess_amount,
            last_payment_date: s.last_payment_date,
            next_due_date: s.next_due_date,
            overdue: s.overdue,
        }
    }
}
