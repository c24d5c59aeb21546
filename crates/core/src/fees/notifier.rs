//! Post-commit payment notifications.

use thiserror::Error;
use tracing::info;

use super::PaymentNotice;

/// Notification delivery failed.
#[derive(Debug, Error)]
#[error("payment notification failed: {0}")]
pub struct NotifyError(pub String);

/// Told about every committed payment. Failures never undo the payment.
#[async_trait::async_trait]
pub trait PaymentNotifier: Send + Sync {
    /// Handles one committed payment.
    async fn payment_recorded(&self, notice: &PaymentNotice) -> Result<(), NotifyError>;
}

/// Writes a structured log line per payment.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl PaymentNotifier for LogNotifier {
    async fn payment_recorded(&self, notice: &PaymentNotice) -> Result<(), NotifyError> {
        info!(
            student_id = %notice.student_id,
            amount = %notice.amount,
            receipt_no = %notice.receipt_no,
            "Payment recorded"
        );
        Ok(())
    }
}
