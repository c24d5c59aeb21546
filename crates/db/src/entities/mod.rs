//! `SeaORM` entity definitions, one module per table.

pub mod prelude;

pub mod auth_events;
pub mod class_fee_structures;
pub mod classes;
pub mod fee_structures;
pub mod payment_events;
pub mod payments;
pub mod receipt_counters;
pub mod schools;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod student_fee_status;
pub mod students;
pub mod users;
