//! Persistence seam for the payment ledger.

use scholaris_shared::types::{SchoolId, StudentId};

use super::{FeeStatus, FeeStructure, Payment, PaymentDraft, PaymentError, Student};
use crate::StoreError;

/// Storage operations the ledger needs.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Finds a student with its school code.
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// Returns the student's active fee structure.
    async fn active_fee_structure(
        &self,
        student_id: StudentId,
    ) -> Result<Option<FeeStructure>, StoreError>;

    /// Atomically allocates the next receipt sequence for
    /// `(draft.school_id, draft.paid_on)`, inserts the payment and its
    /// history row, and refreshes the student's fee status.
    ///
    /// On any error nothing is persisted. Lost races surface as
    /// `StoreError::Consistency`.
    async fn commit_payment(&self, draft: PaymentDraft) -> Result<Payment, PaymentError>;

    /// All payments of a student, most recent first.
    async fn payment_history(&self, student_id: StudentId) -> Result<Vec<Payment>, StoreError>;

    /// Current fee status, or `None` without an active fee structure.
    async fn fee_status(&self, student_id: StudentId) -> Result<Option<FeeStatus>, StoreError>;

    /// Every student of the school that has an active fee structure, with
    /// its current fee status. Order is unspecified.
    async fn school_fee_statuses(
        &self,
        school_id: SchoolId,
    ) -> Result<Vec<(Student, FeeStatus)>, StoreError>;
}
