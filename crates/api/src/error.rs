//! Error to response mapping.
//!
//! Every handler error becomes `{"error": <code>, "message": <text>}` with an
//! optional `"field"` for validation failures. Server-side failures are
//! logged and answered with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scholaris_core::auth::{AuthenticationError, AuthorizationError};
use scholaris_core::fees::PaymentError;
use scholaris_core::provisioning::ProvisioningError;
use scholaris_shared::AppError;
use serde_json::json;
use tracing::error;

/// A handler error carrying its wire code.
#[derive(Debug)]
pub struct ApiError {
    code: &'static str,
    inner: AppError,
}

impl ApiError {
    /// Wire error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self {
            code: inner.error_code(),
            inner,
        }
    }
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        AppError::from(report).into()
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(err: AuthenticationError) -> Self {
        Self {
            code: err.error_code(),
            inner: err.into(),
        }
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        Self {
            code: err.error_code(),
            inner: err.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self {
            code: err.error_code(),
            inner: err.into(),
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        Self {
            code: err.error_code(),
            inner: err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.inner, code = self.code, "request failed");
        }

        let mut body = json!({
            "error": self.code,
            "message": self.inner.public_message(),
        });
        if let Some(field) = self.inner.field() {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholaris_shared::types::StudentId;

    #[test]
    fn test_payment_errors_keep_their_code() {
        let err = ApiError::from(PaymentError::UnknownStudent(StudentId::new()));
        assert_eq!(err.code(), "UNKNOWN_STUDENT");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(PaymentError::TryAgain);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_backend_detail_is_not_exposed() {
        let err = ApiError::from(AuthenticationError::Backend("connection refused".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.inner.public_message(), "An internal error occurred");
    }

    #[test]
    fn test_validation_carries_field() {
        let err = ApiError::from(AppError::invalid_field("amount", "Amount must be positive"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.inner.field(), Some("amount"));
    }
}
