//! Postgres enum types mapped to Rust.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use scholaris_core::auth::{AuthEventKind, Role};
use scholaris_core::fees::PaymentMode;

/// `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "school_admin")]
    SchoolAdmin,
    #[sea_orm(string_value = "teacher")]
    Teacher,
    #[sea_orm(string_value = "student")]
    Student,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::SuperAdmin => Self::SuperAdmin,
            Role::SchoolAdmin => Self::SchoolAdmin,
            Role::Teacher => Self::Teacher,
            Role::Student => Self::Student,
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::SuperAdmin => Self::SuperAdmin,
            UserRole::SchoolAdmin => Self::SchoolAdmin,
            UserRole::Teacher => Self::Teacher,
            UserRole::Student => Self::Student,
        }
    }
}

/// `payment_mode` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_mode")]
pub enum PaymentModeDb {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "cheque")]
    Cheque,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
}

impl From<PaymentMode> for PaymentModeDb {
    fn from(mode: PaymentMode) -> Self {
        match mode {
            PaymentMode::Cash => Self::Cash,
            PaymentMode::Online => Self::Online,
            PaymentMode::Cheque => Self::Cheque,
            PaymentMode::BankTransfer => Self::BankTransfer,
        }
    }
}

impl From<PaymentModeDb> for PaymentMode {
    fn from(mode: PaymentModeDb) -> Self {
        match mode {
            PaymentModeDb::Cash => Self::Cash,
            PaymentModeDb::Online => Self::Online,
            PaymentModeDb::Cheque => Self::Cheque,
            PaymentModeDb::BankTransfer => Self::BankTransfer,
        }
    }
}

/// `auth_event_kind` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "auth_event_kind")]
pub enum AuthEventKindDb {
    #[sea_orm(string_value = "login_succeeded")]
    LoginSucceeded,
    #[sea_orm(string_value = "login_failed")]
    LoginFailed,
    #[sea_orm(string_value = "login_suspended")]
    LoginSuspended,
    #[sea_orm(string_value = "logout")]
    Logout,
}

impl From<AuthEventKind> for AuthEventKindDb {
    fn from(kind: AuthEventKind) -> Self {
        match kind {
            AuthEventKind::LoginSucceeded => Self::LoginSucceeded,
            AuthEventKind::LoginFailed => Self::LoginFailed,
            AuthEventKind::LoginSuspended => Self::LoginSuspended,
            AuthEventKind::Logout => Self::Logout,
        }
    }
}
