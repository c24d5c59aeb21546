//! Request middleware and extractors.

pub mod client;
pub mod session;
