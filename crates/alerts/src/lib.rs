//! Alert feed derived from orders, stock, maintenance and leave requests, plus
//! persisted per-user notifications.
//!
//! Alerts are never stored: they are recomputed from the current collections
//! on every request.

pub mod aggregator;
pub mod notification;

pub use aggregator::{Alert, AlertKind, AlertPriority, AlertSources, collect_alerts};
pub use notification::{Notification, NotificationKind, NotificationPriority, unread_count};
