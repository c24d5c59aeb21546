//! Maps `SeaORM` errors onto the store error taxonomy of `scholaris-core`.

use sea_orm::sqlx;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use scholaris_core::StoreError;

/// `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";
/// `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";

/// Returns the Postgres SQLSTATE carried by a driver error, if any.
fn sql_state(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Exec(e) | DbErr::Query(e) | DbErr::Conn(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Classifies a database error.
///
/// Serialization failures and deadlocks are retryable; unique violations are
/// reported as conflicts.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    if matches!(
        sql_state(&err).as_deref(),
        Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
    ) {
        return StoreError::Consistency(err.to_string());
    }
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return StoreError::Conflict(detail);
    }
    StoreError::Backend(err.to_string())
}

/// Like [`store_error`], but a unique violation is a lost race the caller
/// may retry rather than a caller mistake.
pub(crate) fn race_error(err: DbErr) -> StoreError {
    match store_error(err) {
        StoreError::Conflict(detail) => StoreError::Consistency(detail),
        other => other,
    }
}

/// Maps a unique violation onto a caller-facing conflict message.
pub(crate) fn conflict_as(message: &str) -> impl Fn(DbErr) -> StoreError + '_ {
    move |err| match store_error(err) {
        StoreError::Conflict(detail) => {
            tracing::debug!(%detail, "unique constraint rejected write");
            StoreError::Conflict(message.to_string())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_errors_are_backend() {
        let err = store_error(DbErr::Custom("boom".into()));
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_record_not_found_is_backend() {
        let err = race_error(DbErr::RecordNotFound("payments".into()));
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn test_conflict_as_keeps_backend_errors() {
        let map = conflict_as("Email already registered");
        assert!(matches!(map(DbErr::Custom("x".into())), StoreError::Backend(_)));
    }
}
