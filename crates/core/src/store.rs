//! Errors raised by persistence backends.

use thiserror::Error;

/// Failure reported by a store implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Serialization failure, deadlock or a lost race on a unique key.
    /// The whole unit of work was rolled back and may be retried.
    #[error("Consistency conflict: {0}")]
    Consistency(String),

    /// A uniqueness rule rejected the write (duplicate email, admission number).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if the failed unit of work may be retried as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Consistency(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_consistency_is_retryable() {
        assert!(StoreError::Consistency("40001".into()).is_retryable());
        assert!(!StoreError::Conflict("email".into()).is_retryable());
        assert!(!StoreError::Backend("down".into()).is_retryable());
    }
}
