//! Payment ledger errors.

use scholaris_shared::AppError;
use scholaris_shared::types::StudentId;
use thiserror::Error;

use super::ReceiptError;
use crate::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    // ========== Validation Errors ==========
    /// Amount not positive or with more than two decimal places.
    #[error("{0}")]
    InvalidAmount(String),

    /// Mode is not one of the accepted payment modes.
    #[error("Unsupported payment mode: {0}")]
    UnsupportedMode(String),

    // ========== Student Errors ==========
    /// No such student.
    #[error("Student not found: {0}")]
    UnknownStudent(StudentId),

    /// Student is inactive.
    #[error("Student {0} is inactive")]
    InactiveStudent(StudentId),

    /// Student has no active fee structure.
    #[error("No fee structure assigned to student {0}")]
    NoFeeStructure(StudentId),

    // ========== Receipt Errors ==========
    /// Receipt number could not be issued.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    // ========== Concurrency Errors ==========
    /// Concurrent writers kept conflicting; nothing was recorded.
    #[error("The payment could not be recorded, please try again")]
    TryAgain,

    // ========== Storage Errors ==========
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::UnsupportedMode(_) => "UNSUPPORTED_MODE",
            Self::UnknownStudent(_) => "UNKNOWN_STUDENT",
            Self::InactiveStudent(_) => "INACTIVE_STUDENT",
            Self::NoFeeStructure(_) => "NO_FEE_STRUCTURE",
            Self::Receipt(ReceiptError::SequenceExhausted { .. }) => "RECEIPT_SEQUENCE_EXHAUSTED",
            Self::Receipt(_) => "RECEIPT_ERROR",
            Self::TryAgain => "TRY_AGAIN",
            Self::Store(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidAmount(_)
            | Self::UnsupportedMode(_)
            | Self::InactiveStudent(_)
            | Self::NoFeeStructure(_) => 400,

            // 404 Not Found
            Self::UnknownStudent(_) => 404,

            // 409 Conflict - the day's receipts are used up
            Self::Receipt(ReceiptError::SequenceExhausted { .. }) => 409,

            // 503 Service Unavailable - retry later
            Self::TryAgain => 503,

            // 500 Internal Server Error
            Self::Receipt(_) | Self::Store(_) => 500,
        }
    }

    /// Returns true if the ledger retries this failure by itself.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_retryable())
    }

    /// Request field the error refers to, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidAmount(_) => Some("amount"),
            Self::UnsupportedMode(_) => Some("mode"),
            _ => None,
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let message = err.to_string();
        match err.http_status_code() {
            400 => Self::Validation {
                field: err.field().map(str::to_string),
                message,
            },
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            503 => Self::Unavailable(message),
            _ => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_error_codes() {
        assert_eq!(PaymentError::InvalidAmount("x".into()).error_code(), "INVALID_AMOUNT");
        assert_eq!(PaymentError::UnsupportedMode("card".into()).error_code(), "UNSUPPORTED_MODE");
        assert_eq!(PaymentError::TryAgain.error_code(), "TRY_AGAIN");
        assert_eq!(
            PaymentError::Receipt(ReceiptError::SequenceExhausted {
                date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            })
            .error_code(),
            "RECEIPT_SEQUENCE_EXHAUSTED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        let student = StudentId::new();
        assert_eq!(PaymentError::InvalidAmount("x".into()).http_status_code(), 400);
        assert_eq!(PaymentError::InactiveStudent(student).http_status_code(), 400);
        assert_eq!(PaymentError::UnknownStudent(student).http_status_code(), 404);
        assert_eq!(PaymentError::TryAgain.http_status_code(), 503);
        assert_eq!(
            PaymentError::Store(StoreError::Backend("down".into())).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(PaymentError::Store(StoreError::Consistency("40001".into())).is_retryable());
        assert!(!PaymentError::Store(StoreError::Backend("down".into())).is_retryable());
        assert!(!PaymentError::TryAgain.is_retryable());
    }

    #[test]
    fn test_conversion_keeps_field() {
        let app: AppError = PaymentError::UnsupportedMode("card".into()).into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.field(), Some("mode"));

        let app: AppError = PaymentError::TryAgain.into();
        assert_eq!(app.error_code(), "TRY_AGAIN");
    }
}
