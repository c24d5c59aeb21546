//! Ledger domain types.

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_shared::fees::{FeeStructureResponse, OutstandingBalanceResponse, PaymentResponse};
use scholaris_shared::types::{
    ClassFeeStructureId, ClassId, FeeStructureId, Money, PaymentId, SchoolId, StudentId, UserId,
};
use serde::{Deserialize, Serialize};

use super::{FeeStatus, ReceiptError, ReceiptNumber};

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Cash at the school office.
    Cash,
    /// Online gateway or UPI.
    Online,
    /// Cheque.
    Cheque,
    /// Direct bank transfer.
    BankTransfer,
}

impl PaymentMode {
    /// Every accepted mode.
    pub const ALL: [Self; 4] = [Self::Cash, Self::Online, Self::Cheque, Self::BankTransfer];

    /// Wire and storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Online => "online",
            Self::Cheque => "cheque",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// A student enrollment record, joined with its school's receipt code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    /// Student ID.
    pub id: StudentId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Owning school's receipt code.
    pub school_code: i32,
    /// Student principal allowed to read this record's fee data.
    pub user_id: Option<UserId>,
    /// Class the student is in.
    pub class_id: Option<ClassId>,
    /// Admission number, unique per school.
    pub admission_no: String,
    /// Name.
    pub full_name: String,
    /// Inactive students accept no payments.
    pub is_active: bool,
}

/// One version of a student's fee for an academic year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeStructure {
    /// Fee structure ID.
    pub id: FeeStructureId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Student the fee applies to.
    pub student_id: StudentId,
    /// Academic year label.
    pub academic_year: String,
    /// Total fee due.
    pub total_fee: Money,
    /// Installment due dates, ascending. Empty for a single lump sum
    /// without a deadline.
    pub due_dates: Vec<NaiveDate>,
    /// Class fee this version was derived from.
    pub class_fee_structure_id: Option<ClassFeeStructureId>,
    /// 1 for the first assignment, incremented on each amendment.
    pub version: i32,
    /// Only the latest version is active.
    pub is_active: bool,
    /// When this version was assigned.
    pub created_at: DateTime<Utc>,
}

/// Caller input for recording a payment. `mode` is parsed by the ledger.
#[derive(Debug, Clone)]
pub struct RecordPayment {
    /// Paying student.
    pub student_id: StudentId,
    /// Amount received.
    pub amount: Money,
    /// Mode name as submitted.
    pub mode: String,
    /// Transaction id, cheque number or bank name.
    pub reference: Option<String>,
    /// Free text.
    pub remarks: Option<String>,
}

/// A validated payment waiting for its receipt sequence.
///
/// Stores turn it into a `Payment` with `into_payment` once they hold the
/// counter for `(school_id, paid_on)`.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    /// Pre-allocated payment ID.
    pub id: PaymentId,
    /// Owning school.
    pub school_id: SchoolId,
    /// School code for the receipt.
    pub school_code: i32,
    /// Paying student.
    pub student_id: StudentId,
    /// Active fee structure at validation time.
    pub fee_structure_id: FeeStructureId,
    /// Amount received.
    pub amount: Money,
    /// Parsed mode.
    pub mode: PaymentMode,
    /// Mode-specific reference.
    pub reference: Option<String>,
    /// Free text.
    pub remarks: Option<String>,
    /// Business day in the ledger timezone; also the receipt day.
    pub paid_on: NaiveDate,
    /// Recording school admin.
    pub recorded_by: UserId,
    /// Recording instant.
    pub recorded_at: DateTime<Utc>,
}

impl PaymentDraft {
    /// Finalizes the draft with the allocated daily sequence.
    pub fn into_payment(self, sequence: u32) -> Result<Payment, ReceiptError> {
        let receipt = ReceiptNumber::new(self.school_code, self.paid_on, sequence)?;
        Ok(Payment {
            id: self.id,
            receipt_no: receipt.to_string(),
            school_id: self.school_id,
            student_id: self.student_id,
            fee_structure_id: self.fee_structure_id,
            amount: self.amount,
            mode: self.mode,
            reference: self.reference,
            remarks: self.remarks,
            paid_on: self.paid_on,
            recorded_by: self.recorded_by,
            recorded_at: self.recorded_at,
        })
    }
}

/// An immutable recorded payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// Globally unique receipt number.
    pub receipt_no: String,
    /// Owning school.
    pub school_id: SchoolId,
    /// Paying student.
    pub student_id: StudentId,
    /// Fee structure the payment counts against.
    pub fee_structure_id: FeeStructureId,
    /// Amount received.
    pub amount: Money,
    /// Mode.
    pub mode: PaymentMode,
    /// Mode-specific reference.
    pub reference: Option<String>,
    /// Free text.
    pub remarks: Option<String>,
    /// Business day.
    pub paid_on: NaiveDate,
    /// Recording school admin.
    pub recorded_by: UserId,
    /// Recording instant.
    pub recorded_at: DateTime<Utc>,
}

/// What a notifier is told after a payment commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotice {
    /// Paying student.
    pub student_id: StudentId,
    /// Amount received.
    pub amount: Money,
    /// Receipt issued.
    pub receipt_no: String,
}

impl From<&Payment> for PaymentNotice {
    fn from(payment: &Payment) -> Self {
        Self {
            student_id: payment.student_id,
            amount: payment.amount,
            receipt_no: payment.receipt_no.clone(),
        }
    }
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            receipt_no: p.receipt_no,
            school_id: p.school_id,
            student_id: p.student_id,
            fee_structure_id: p.fee_structure_id,
            amount: p.amount,
            mode: p.mode.as_str().to_string(),
            reference: p.reference,
            remarks: p.remarks,
            paid_on: p.paid_on,
            recorded_by: p.recorded_by,
            recorded_at: p.recorded_at,
        }
    }
}

impl From<FeeStructure> for FeeStructureResponse {
    fn from(f: FeeStructure) -> Self {
        Self {
            id: f.id,
            student_id: f.student_id,
            class_fee_structure_id: f.class_fee_structure_id,
            academic_year: f.academic_year,
            total_fee: f.total_fee,
            due_dates: f.due_dates,
            version: f.version,
        }
    }
}

/// A student with something left to pay, as of a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingBalance {
    /// The student.
    pub student: Student,
    /// Status against the active structure, evaluated for the day.
    pub status: FeeStatus,
    /// Days past the next due date.
    pub days_overdue: i64,
}

impl From<OutstandingBalance> for OutstandingBalanceResponse {
    fn from(b: OutstandingBalance) -> Self {
        Self {
            student_id: b.student.id,
            admission_no: b.student.admission_no,
            full_name: b.student.full_name,
            class_id: b.student.class_id,
            academic_year: b.status.academic_year,
            total_fee: b.status.total_fee,
            paid_amount: b.status.paid_amount,
            remaining_amount: b.status.remaining_amount,
            next_due_date: b.status.next_due_date,
            days_overdue: b.days_overdue,
            last_payment_date: b.status.last_payment_date,
        }
    }
}
