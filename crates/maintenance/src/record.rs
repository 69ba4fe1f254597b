use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vitach_core::{DocumentId, DomainResult, Record, require_non_empty};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    #[default]
    Planned,
    InProgress,
    Done,
}

/// Planned or completed work on a vehicle, possibly by an outside provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub vehicle_id: DocumentId,
    #[serde(default)]
    pub provider_id: Option<DocumentId>,
    /// e.g. "Entretien périodique", "Réparation".
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub scheduled_on: NaiveDate,
    /// GNF.
    #[serde(default)]
    pub estimated_cost: Option<u64>,
    #[serde(default)]
    pub status: MaintenanceStatus,
    #[serde(default)]
    pub notes: String,
}

impl MaintenanceRecord {
    /// Days from `today` to the scheduled date; negative when overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.scheduled_on - today).num_days()
    }

    /// Not done and scheduled within `window_days` (overdue included).
    pub fn is_due_within(&self, today: NaiveDate, window_days: i64) -> bool {
        self.status != MaintenanceStatus::Done && self.days_until_due(today) <= window_days
    }
}

impl Record for MaintenanceRecord {
    const COLLECTION: &'static str = "maintenance";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("kind", &self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(on: &str, status: MaintenanceStatus) -> MaintenanceRecord {
        MaintenanceRecord {
            vehicle_id: DocumentId::new(),
            provider_id: None,
            kind: "Vidange".to_string(),
            description: String::new(),
            scheduled_on: on.parse().unwrap(),
            estimated_cost: Some(350_000),
            status,
            notes: String::new(),
        }
    }

    #[test]
    fn due_window_includes_overdue_and_skips_done() {
        let today: NaiveDate = "2026-05-10".parse().unwrap();
        assert!(record("2026-05-17", MaintenanceStatus::Planned).is_due_within(today, 7));
        assert!(!record("2026-05-18", MaintenanceStatus::Planned).is_due_within(today, 7));
        assert!(record("2026-05-01", MaintenanceStatus::InProgress).is_due_within(today, 7));
        assert!(!record("2026-05-11", MaintenanceStatus::Done).is_due_within(today, 7));
        assert_eq!(record("2026-05-01", MaintenanceStatus::Planned).days_until_due(today), -9);
    }
}
