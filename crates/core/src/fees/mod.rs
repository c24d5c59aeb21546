//! Fee payments.
//!
//! This module implements:
//! - Payment recording with per-school daily receipt numbers
//! - Payment history and derived fee status
//! - Installment schedules and outstanding balances per school
//! - The store seam the database layer implements
//! - Post-commit payment notifications

mod error;
mod ledger;
mod notifier;
mod receipt;
mod schedule;
mod status;
mod store;
mod types;

#[cfg(test)]
mod receipt_props;
#[cfg(test)]
mod status_props;

pub use error::PaymentError;
pub use ledger::PaymentLedger;
pub use notifier::{LogNotifier, NotifyError, PaymentNotifier};
pub use receipt::{MAX_SCHOOL_CODE, MAX_SEQUENCE, ReceiptError, ReceiptNumber};
pub use schedule::{Installment, installments, next_due_date, normalize_due_dates};
pub use status::FeeStatus;
pub use store::LedgerStore;
pub use types::{
    FeeStructure, OutstandingBalance, Payment, PaymentDraft, PaymentMode, PaymentNotice,
    RecordPayment, Student,
};
