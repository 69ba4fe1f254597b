//! Read model builders fed by committed events.
//!
//! Projections are rebuildable from the event store and idempotent under
//! at-least-once delivery (per-stream sequence cursors).

pub mod orders;

pub use orders::{ORDER_AGGREGATE_TYPE, OrderProjectionError, OrdersProjection};
