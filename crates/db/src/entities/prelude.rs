//! Entity re-exports.

pub use super::auth_events::Entity as AuthEvents;
pub use super::class_fee_structures::Entity as ClassFeeStructures;
pub use super::classes::Entity as Classes;
pub use super::fee_structures::Entity as FeeStructures;
pub use super::payment_events::Entity as PaymentEvents;
pub use super::payments::Entity as Payments;
pub use super::receipt_counters::Entity as ReceiptCounters;
pub use super::schools::Entity as Schools;
pub use super::sessions::Entity as Sessions;
pub use super::student_fee_status::Entity as StudentFeeStatus;
pub use super::students::Entity as Students;
pub use super::users::Entity as Users;
