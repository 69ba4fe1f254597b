use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vitach_core::{DocumentId, DomainError, DomainResult, Record, require_non_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Desktop,
    Laptop,
    Smartphone,
    Printer,
    Server,
    Network,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    #[default]
    Active,
    Maintenance,
    OutOfService,
    Lost,
    Stolen,
}

/// A piece of IT equipment, optionally assigned to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItAsset {
    pub name: String,
    pub kind: AssetKind,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial_number: String,
    /// Internal inventory tag.
    #[serde(default)]
    pub inventory_number: String,
    #[serde(default)]
    pub purchased_on: Option<NaiveDate>,
    #[serde(default)]
    pub warranty_until: Option<NaiveDate>,
    /// GNF.
    #[serde(default)]
    pub cost: Option<u64>,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default)]
    pub assigned_to: Option<DocumentId>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
}

impl ItAsset {
    pub fn under_warranty(&self, today: NaiveDate) -> bool {
        self.warranty_until.is_some_and(|until| today <= until)
    }

    /// Lost and stolen equipment cannot be handed to anyone.
    pub fn is_assignable(&self) -> bool {
        matches!(self.status, AssetStatus::Active | AssetStatus::Maintenance)
    }
}

impl Record for ItAsset {
    const COLLECTION: &'static str = "it_assets";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)?;
        if self.assigned_to.is_some() && !self.is_assignable() {
            return Err(DomainError::validation("lost or out-of-service equipment cannot be assigned"));
        }
        if let (Some(bought), Some(until)) = (self.purchased_on, self.warranty_until) {
            if until < bought {
                return Err(DomainError::validation("warranty cannot end before the purchase date"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop() -> ItAsset {
        serde_json::from_str(
            r#"{"name":"Poste compta","kind":"laptop","purchased_on":"2025-01-10","warranty_until":"2027-01-10"}"#,
        )
        .unwrap()
    }

    #[test]
    fn warranty_and_assignment_rules() {
        let mut asset = laptop();
        assert_eq!(asset.status, AssetStatus::Active);
        assert!(asset.validate().is_ok());
        assert!(asset.under_warranty("2026-06-01".parse().unwrap()));
        assert!(!asset.under_warranty("2027-01-11".parse().unwrap()));

        asset.assigned_to = Some(DocumentId::new());
        assert!(asset.validate().is_ok());
        asset.status = AssetStatus::Stolen;
        assert!(asset.validate().is_err());

        let mut backwards = laptop();
        backwards.warranty_until = Some("2024-12-31".parse().unwrap());
        assert!(backwards.validate().is_err());
    }
}
