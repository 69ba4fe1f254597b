use serde::{Deserialize, Serialize};

use vitach_core::{DomainResult, Record, require_non_empty};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    #[default]
    Car,
    Van,
    Truck,
    Motorcycle,
    Other,
}

/// Vehicles are retired rather than deleted so that old maintenance records
/// still resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Active,
    Retired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub plate: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub mileage_km: Option<u64>,
    #[serde(default)]
    pub kind: VehicleKind,
    #[serde(default)]
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.make.trim(), self.model.trim(), self.plate.trim())
    }
}

impl Record for Vehicle {
    const COLLECTION: &'static str = "vehicles";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("make", &self.make)?;
        require_non_empty("model", &self.model)?;
        require_non_empty("plate", &self.plate)
    }
}
