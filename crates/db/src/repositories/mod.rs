//! Repository abstractions for data access.
//!
//! Each repository implements one of the store traits of `scholaris-core`
//! on PostgreSQL, hiding the `SeaORM` details from the services.

mod error;

pub mod audit;
pub mod payment;
pub mod school;
pub mod session;
pub mod user;

pub use audit::AuthEventRepository;
pub use payment::PaymentRepository;
pub use school::SchoolRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
