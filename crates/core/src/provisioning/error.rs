//! Provisioning errors.

use scholaris_shared::AppError;
use thiserror::Error;

use crate::StoreError;
use crate::auth::{AuthorizationError, PasswordError};

/// Errors from the provisioning cascade.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The actor may not perform this change.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Referenced school, principal or student does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input rejected.
    #[error("{message}")]
    Validation {
        /// Request field at fault.
        field: &'static str,
        /// Description.
        message: String,
    },

    /// Duplicate email or admission number.
    #[error("{0}")]
    Conflict(String),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Store failure.
    #[error(transparent)]
    Store(StoreError),
}

impl ProvisioningError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Authorization(err) => err.error_code(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Password(_) | Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Authorization(err) => err.http_status_code(),
            Self::NotFound(_) => 404,
            Self::Validation { .. } => 400,
            Self::Conflict(_) => 409,
            Self::Password(_) | Self::Store(_) => 500,
        }
    }
}

impl From<StoreError> for ProvisioningError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Store(other),
        }
    }
}

impl From<ProvisioningError> for AppError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Authorization(inner) => inner.into(),
            ProvisioningError::NotFound(msg) => Self::NotFound(msg),
            ProvisioningError::Validation { field, message } => Self::invalid_field(field, message),
            ProvisioningError::Conflict(msg) => Self::Conflict(msg),
            ProvisioningError::Password(inner) => Self::Internal(inner.to_string()),
            ProvisioningError::Store(inner) => Self::Database(inner.to_string()),
        }
    }
}
