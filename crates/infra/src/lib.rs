//! Infrastructure layer: event store, command dispatch, read models, document
//! collections, identity and configuration.
//!
//! Everything here is in-process; the traits are the seams where a durable
//! backend would plug in.

pub mod command_dispatcher;
pub mod config;
pub mod document_store;
pub mod event_store;
pub mod identity;
pub mod projections;
pub mod read_model;
pub mod workers;

mod integration_tests;

pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use config::{AppConfig, SeedAccount};
pub use document_store::{DocumentStoreError, InMemoryDocumentStore};
pub use identity::InMemoryIdentityProvider;
