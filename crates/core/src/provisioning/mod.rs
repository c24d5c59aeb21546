//! School lifecycle: schools, principals, classes, enrollment and fee structures.

mod error;
mod policy;
mod service;
mod store;
mod types;


pub use error::ProvisioningError;
pub use policy::{can_create_role, can_deactivate};
pub use service::Provisioner;
pub use store::ProvisioningStore;
pub use types::{
    ClassFeeStructure, NewClass, NewClassFeeStructure, NewFeeStructure, NewPrincipal, NewSchool,
    NewStudent, School, SchoolClass,
};
