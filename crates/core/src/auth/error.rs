//! Authentication and authorization errors.

use scholaris_shared::AppError;
use thiserror::Error;

use super::PasswordError;
use crate::StoreError;

/// Message shared by every failed-credential path.
pub(crate) const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Errors from `SessionAuthority::authenticate`.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("{INVALID_CREDENTIALS}")]
    InvalidCredentials,

    /// Password verified but the account or its school is inactive.
    #[error("Account is suspended")]
    AccountSuspended,

    /// Store or hashing failure, including a failed audit append.
    #[error("Authentication backend error: {0}")]
    Backend(String),
}

impl AuthenticationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountSuspended => "ACCOUNT_SUSPENDED",
            Self::Backend(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::AccountSuspended => 401,
            Self::Backend(_) => 500,
        }
    }
}

impl From<StoreError> for AuthenticationError {
    fn from(err: StoreError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<PasswordError> for AuthenticationError {
    fn from(err: PasswordError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<AuthenticationError> for AppError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => Self::Unauthorized(INVALID_CREDENTIALS.into()),
            AuthenticationError::AccountSuspended => Self::Unauthorized(err.to_string()),
            AuthenticationError::Backend(msg) => Self::Internal(msg),
        }
    }
}

/// Errors from resolving a token or checking a role.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// No session, unknown token, or an expired session.
    #[error("Authentication required")]
    Unauthenticated,

    /// The session's role or school does not allow the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Store failure.
    #[error("Authorization backend error: {0}")]
    Backend(String),
}

impl AuthorizationError {
    /// Builds the generic forbidden error.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::Forbidden("You do not have permission to perform this action".into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Backend(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden(_) => 403,
            Self::Backend(_) => 500,
        }
    }
}

impl From<StoreError> for AuthorizationError {
    fn from(err: StoreError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<AuthorizationError> for AppError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthenticated => Self::Unauthorized(err.to_string()),
            AuthorizationError::Forbidden(msg) => Self::Forbidden(msg),
            AuthorizationError::Backend(msg) => Self::Internal(msg),
        }
    }
}
