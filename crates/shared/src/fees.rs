//! Request and response payloads for fee structures and payments.

use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::types::{
    ClassFeeStructureId, ClassId, FeeStructureId, Money, PaymentId, SchoolId, StudentId, UserId,
};

/// Most installments a fee may be split into.
pub const MAX_INSTALLMENTS: usize = 12;

/// Records a payment against a student's active fee structure.
///
/// `amount` and `mode` are checked by the ledger so that the caller gets the
/// ledger's error codes.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    /// Amount received.
    #[garde(skip)]
    pub amount: Money,
    /// One of `cash`, `online`, `cheque`, `bank_transfer`.
    #[garde(skip)]
    pub mode: String,
    /// Transaction id, cheque number or bank name.
    #[garde(length(max = 100))]
    pub reference: Option<String>,
    /// Free text printed on the receipt.
    #[garde(length(max = 500))]
    pub remarks: Option<String>,
}

/// Assigns (or amends) a student's fee for an academic year.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignFeeStructureRequest {
    /// Academic year label, e.g. `2024-25`.
    #[garde(length(min = 4, max = 20))]
    pub academic_year: String,
    /// Total fee due for the year.
    #[garde(skip)]
    pub total_fee: Money,
    /// Installment due dates. The total is split evenly across them.
    #[serde(default)]
    #[garde(length(max = 12))]
    pub due_dates: Vec<NaiveDate>,
}

/// Breakdown of a class fee. Omitted components are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeComponents {
    /// Tuition.
    pub tuition: Money,
    /// One-time admission fee.
    pub admission: Money,
    /// Development fund.
    pub development: Money,
    /// School transport.
    pub transport: Money,
    /// Library.
    pub library: Money,
    /// Laboratory.
    pub lab: Money,
    /// Sports.
    pub sports: Money,
    /// Anything else.
    pub other: Money,
}

impl FeeComponents {
    /// Each component with its name, in a fixed order.
    #[must_use]
    pub const fn named(&self) -> [(&'static str, Money); 8] {
        [
            ("tuition", self.tuition),
            ("admission", self.admission),
            ("development", self.development),
            ("transport", self.transport),
            ("library", self.library),
            ("lab", self.lab),
            ("sports", self.sports),
            ("other", self.other),
        ]
    }

    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> Money {
        self.named().into_iter().map(|(_, amount)| amount).sum()
    }
}

/// Creates a class in a school.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClassRequest {
    /// Class name, e.g. `Grade 5`.
    #[garde(length(min = 1, max = 50))]
    pub name: String,
    /// Section, e.g. `A`.
    #[garde(length(max = 10))]
    pub section: Option<String>,
}

/// Sets the fee of a class for an academic year.
///
/// Every active student of the class gets a new fee structure version
/// with the resulting total and due dates.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetClassFeeStructureRequest {
    /// Academic year label, e.g. `2024-25`.
    #[garde(length(min = 4, max = 20))]
    pub academic_year: String,
    /// Fee breakdown; checked by the provisioner.
    #[garde(skip)]
    pub components: FeeComponents,
    /// Installment due dates.
    #[serde(default)]
    #[garde(length(max = 12))]
    pub due_dates: Vec<NaiveDate>,
}

/// Filter for the outstanding balances of a school.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OutstandingFilter {
    /// Only students past an installment due date.
    #[serde(default)]
    pub overdue_only: bool,
}

/// A recorded payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: PaymentId,
    /// Receipt number, `RCP<school><yyyymmdd><seq>`.
    pub receipt_no: String,
    /// Owning school.
    pub school_id: SchoolId,
    /// Paying student.
    pub student_id: StudentId,
    /// Fee structure the payment counts against.
    pub fee_structure_id: FeeStructureId,
    /// Amount received.
    pub amount: Money,
    /// Payment mode.
    pub mode: String,
    /// Mode-specific reference.
    pub reference: Option<String>,
    /// Free text.
    pub remarks: Option<String>,
    /// Business date of the payment.
    pub paid_on: NaiveDate,
    /// School admin who recorded it.
    pub recorded_by: UserId,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// A student's fee position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeStatusResponse {
    /// Student ID.
    pub student_id: StudentId,
    /// Active fee structure.
    pub fee_structure_id: FeeStructureId,
    /// Academic year of the active structure.
    pub academic_year: String,
    /// Total fee due.
    pub total_fee: Money,
    /// Sum of payments.
    pub paid_amount: Money,
    /// Amount still due, never negative.
    pub remaining_amount: Money,
    /// True when more was paid than is due.
    pub overpaid: bool,
    /// Amount paid beyond the total.
    pub excess_amount: Money,
    /// Date of the latest payment.
    pub last_payment_date: Option<NaiveDate>,
    /// Due date of the first installment not yet covered.
    pub next_due_date: Option<NaiveDate>,
    /// True once `next_due_date` has passed.
    pub overdue: bool,
}

/// An assigned fee structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeStructureResponse {
    /// Fee structure ID.
    pub id: FeeStructureId,
    /// Student ID.
    pub student_id: StudentId,
    /// Class fee this version was derived from.
    pub class_fee_structure_id: Option<ClassFeeStructureId>,
    /// Academic year label.
    pub academic_year: String,
    /// Total fee due.
    pub total_fee: Money,
    /// Installment due dates, ascending.
    pub due_dates: Vec<NaiveDate>,
    /// Version number, starting at 1.
    pub version: i32,
}

/// A class of a school.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassResponse {
    /// Class ID.
    pub id: ClassId,
    /// Owning school.
    pub school_id: SchoolId,
    /// Class name.
    pub name: String,
    /// Section.
    pub section: Option<String>,
}

/// A class fee and how many students it was applied to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassFeeStructureResponse {
    /// Class fee ID.
    pub id: ClassFeeStructureId,
    /// Class ID.
    pub class_id: ClassId,
    /// Academic year label.
    pub academic_year: String,
    /// Breakdown.
    pub components: FeeComponents,
    /// Sum of the components.
    pub total_fee: Money,
    /// Installment due dates, ascending.
    pub due_dates: Vec<NaiveDate>,
    /// Active students that received a new fee structure version.
    pub students_assigned: u32,
}

/// A student who still owes part of the fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutstandingBalanceResponse {
    /// Student ID.
    pub student_id: StudentId,
    /// Admission number.
    pub admission_no: String,
    /// Student name.
    pub full_name: String,
    /// Class, when assigned.
    pub class_id: Option<ClassId>,
    /// Academic year of the active structure.
    pub academic_year: String,
    /// Total fee due.
    pub total_fee: Money,
    /// Sum of payments.
    pub paid_amount: Money,
    /// Amount still due.
    pub remaining_amount: Money,
    /// Due date of the first installment not yet covered.
    pub next_due_date: Option<NaiveDate>,
    /// Days since `next_due_date`; zero when not overdue.
    pub days_overdue: i64,
    /// Date of the latest payment.
    pub last_payment_date: Option<NaiveDate>,
}
