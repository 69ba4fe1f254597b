//! IT management: the equipment inventory and the incident desk with its
//! response-time targets.

pub mod asset;
pub mod incident;

pub use asset::{AssetKind, AssetStatus, ItAsset};
pub use incident::{
    Incident, IncidentAction, IncidentKind, IncidentPriority, IncidentStats, IncidentStatus, SlaStatus,
    incident_stats, next_ticket,
};
