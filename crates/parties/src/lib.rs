//! Parties: suppliers, external service providers and internal departments.
//!
//! Plain validated records; no IO, no HTTP, no storage.

pub mod contact;
pub mod service;

pub use contact::{Contact, ServiceProvider, Supplier};
pub use service::Service;
