//! Fleet maintenance: vehicles, maintenance records and the read-time join
//! that resolves their references.

pub mod record;
pub mod resolve;
pub mod vehicle;

pub use record::{MaintenanceRecord, MaintenanceStatus};
pub use resolve::{ResolvedMaintenance, UNKNOWN_PROVIDER, UNKNOWN_VEHICLE, resolve};
pub use vehicle::{Vehicle, VehicleKind, VehicleStatus};
