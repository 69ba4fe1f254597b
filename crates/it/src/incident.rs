//! Incident tickets.
//!
//! A ticket moves `new -> assigned -> in_progress -> resolved -> closed`; a
//! resolved ticket may be reopened into `in_progress`. Each priority carries a
//! response-time target measured from the moment the ticket was opened.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use vitach_core::{DocumentId, DomainError, DomainResult, Record, Stored, UserId, require_non_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Hardware,
    Software,
    Network,
    Security,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl IncidentPriority {
    pub fn sla_hours(self) -> i64 {
        match self {
            IncidentPriority::Critical => 4,
            IncidentPriority::High => 8,
            IncidentPriority::Medium => 24,
            IncidentPriority::Low => 72,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    New,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub fn is_open(self) -> bool {
        !matches!(self, IncidentStatus::Resolved | IncidentStatus::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Ok,
    /// More than 80% of the target used.
    AtRisk,
    Breached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// `IT-<year>-<nnn>`, assigned when the ticket is opened.
    #[serde(default)]
    pub ticket: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: IncidentKind,
    #[serde(default)]
    pub priority: IncidentPriority,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default)]
    pub requested_by: Option<UserId>,
    /// Employee handling the ticket.
    #[serde(default)]
    pub assignee_id: Option<DocumentId>,
    #[serde(default)]
    pub asset_id: Option<DocumentId>,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A status change requested on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IncidentAction {
    Assign { assignee_id: DocumentId },
    Start,
    Resolve { solution: String },
    Close,
    Reopen,
}

impl Incident {
    pub fn apply(&mut self, action: IncidentAction, at: DateTime<Utc>) -> DomainResult<()> {
        use IncidentStatus::*;

        match (self.status, action) {
            (New | Assigned, IncidentAction::Assign { assignee_id }) => {
                self.assignee_id = Some(assignee_id);
                self.status = Assigned;
            }
            (Assigned, IncidentAction::Start) => self.status = InProgress,
            (InProgress, IncidentAction::Resolve { solution }) => {
                require_non_empty("solution", &solution)?;
                self.solution = solution;
                self.resolved_at = Some(at);
                self.status = Resolved;
            }
            (Resolved, IncidentAction::Close) => self.status = Closed,
            (Resolved, IncidentAction::Reopen) => {
                self.resolved_at = None;
                self.status = InProgress;
            }
            (status, action) => {
                return Err(DomainError::invariant(format!(
                    "cannot {} a ticket that is {}",
                    action.verb(),
                    status.label()
                )));
            }
        }
        Ok(())
    }

    /// Time spent against the target: up to resolution, or up to `now`.
    pub fn sla_status(&self, opened_at: DateTime<Utc>, now: DateTime<Utc>) -> SlaStatus {
        let elapsed = self.resolved_at.unwrap_or(now) - opened_at;
        let target = Duration::hours(self.priority.sla_hours());
        if elapsed > target {
            SlaStatus::Breached
        } else if elapsed.num_seconds() * 10 > target.num_seconds() * 8 {
            SlaStatus::AtRisk
        } else {
            SlaStatus::Ok
        }
    }
}

impl IncidentAction {
    fn verb(&self) -> &'static str {
        match self {
            IncidentAction::Assign { .. } => "assign",
            IncidentAction::Start => "start",
            IncidentAction::Resolve { .. } => "resolve",
            IncidentAction::Close => "close",
            IncidentAction::Reopen => "reopen",
        }
    }
}

impl IncidentStatus {
    fn label(self) -> &'static str {
        match self {
            IncidentStatus::New => "new",
            IncidentStatus::Assigned => "assigned",
            IncidentStatus::InProgress => "in progress",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Closed => "closed",
        }
    }
}

impl Record for Incident {
    const COLLECTION: &'static str = "it_incidents";
    const LIFECYCLE_FIELDS: &'static [&'static str] =
        &["ticket", "status", "assignee_id", "solution", "resolved_at", "requested_by"];

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("title", &self.title)?;
        if matches!(self.status, IncidentStatus::Resolved | IncidentStatus::Closed) && self.resolved_at.is_none() {
            return Err(DomainError::validation("a resolved ticket needs a resolution date"));
        }
        if self.status != IncidentStatus::New && self.assignee_id.is_none() {
            return Err(DomainError::validation("an assigned ticket needs an assignee"));
        }
        Ok(())
    }
}

/// Next ticket number for `year`, following the highest one already issued.
pub fn next_ticket<'a>(existing: impl IntoIterator<Item = &'a str>, year: i32) -> String {
    let prefix = format!("IT-{year}-");
    let last = existing
        .into_iter()
        .filter_map(|t| t.strip_prefix(&prefix)?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{:03}", last + 1)
}

/// Desk-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncidentStats {
    pub total: usize,
    pub open: usize,
    pub resolved: usize,
    pub sla_breached: usize,
    pub sla_at_risk: usize,
    /// Mean open-to-resolution time over resolved tickets, in hours.
    pub mean_resolution_hours: Option<f64>,
}

pub fn incident_stats(incidents: &[Stored<Incident>], now: DateTime<Utc>) -> IncidentStats {
    let mut stats = IncidentStats {
        total: incidents.len(),
        ..Default::default()
    };
    let mut resolution_minutes = Vec::new();

    for stored in incidents {
        let incident = &stored.record;
        if incident.status.is_open() {
            stats.open += 1;
            match incident.sla_status(stored.audit.created_at, now) {
                SlaStatus::Breached => stats.sla_breached += 1,
                SlaStatus::AtRisk => stats.sla_at_risk += 1,
                SlaStatus::Ok => {}
            }
        } else {
            stats.resolved += 1;
        }
        if let Some(resolved_at) = incident.resolved_at {
            resolution_minutes.push((resolved_at - stored.audit.created_at).num_minutes() as f64);
        }
    }

    if !resolution_minutes.is_empty() {
        let mean = resolution_minutes.iter().sum::<f64>() / resolution_minutes.len() as f64;
        stats.mean_resolution_hours = Some(mean / 60.0);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vitach_core::Audit;

    fn incident(priority: IncidentPriority) -> Incident {
        Incident {
            ticket: "IT-2026-001".to_string(),
            title: "Imprimante bloquée".to_string(),
            description: String::new(),
            kind: IncidentKind::Hardware,
            priority,
            status: IncidentStatus::New,
            requested_by: None,
            assignee_id: None,
            asset_id: None,
            solution: String::new(),
            resolved_at: None,
        }
    }

    #[test]
    fn ticket_follows_the_full_flow() {
        let now = Utc::now();
        let mut ticket = incident(IncidentPriority::High);

        assert!(ticket.apply(IncidentAction::Start, now).is_err());
        ticket
            .apply(IncidentAction::Assign { assignee_id: DocumentId::new() }, now)
            .unwrap();
        assert_eq!(ticket.status, IncidentStatus::Assigned);
        ticket.apply(IncidentAction::Start, now).unwrap();

        let refused = ticket.apply(IncidentAction::Resolve { solution: " ".into() }, now);
        assert!(matches!(refused, Err(DomainError::Validation(_))));
        assert_eq!(ticket.status, IncidentStatus::InProgress);

        ticket
            .apply(IncidentAction::Resolve { solution: "Bourrage retiré".into() }, now)
            .unwrap();
        assert_eq!(ticket.resolved_at, Some(now));
        assert!(ticket.validate().is_ok());

        ticket.apply(IncidentAction::Reopen, now).unwrap();
        assert_eq!(ticket.status, IncidentStatus::InProgress);
        assert!(ticket.resolved_at.is_none());

        ticket
            .apply(IncidentAction::Resolve { solution: "Rouleau changé".into() }, now)
            .unwrap();
        ticket.apply(IncidentAction::Close, now).unwrap();
        let closed = ticket.apply(IncidentAction::Reopen, now);
        assert!(matches!(closed, Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn sla_thresholds_per_priority() {
        let opened = Utc::now();
        let critical = incident(IncidentPriority::Critical);
        assert_eq!(critical.sla_status(opened, opened + Duration::hours(3)), SlaStatus::Ok);
        assert_eq!(critical.sla_status(opened, opened + Duration::minutes(200)), SlaStatus::AtRisk);
        assert_eq!(critical.sla_status(opened, opened + Duration::minutes(241)), SlaStatus::Breached);

        let mut low = incident(IncidentPriority::Low);
        assert_eq!(low.sla_status(opened, opened + Duration::hours(48)), SlaStatus::Ok);
        // Resolution stops the clock.
        low.resolved_at = Some(opened + Duration::hours(10));
        assert_eq!(low.sla_status(opened, opened + Duration::days(30)), SlaStatus::Ok);
    }

    #[test]
    fn stats_count_open_tickets_against_their_target() {
        let now = Utc::now();
        let stored = |record: Incident, opened: DateTime<Utc>| Stored {
            id: DocumentId::new(),
            audit: Audit::new(UserId::new(), opened),
            record,
        };
        let mut resolved = incident(IncidentPriority::Medium);
        resolved.status = IncidentStatus::Resolved;
        resolved.assignee_id = Some(DocumentId::new());
        resolved.resolved_at = Some(now - Duration::hours(1));

        let stats = incident_stats(
            &[
                stored(incident(IncidentPriority::Critical), now - Duration::hours(5)),
                stored(incident(IncidentPriority::High), now - Duration::hours(7)),
                stored(incident(IncidentPriority::Low), now),
                stored(resolved, now - Duration::hours(4)),
            ],
            now,
        );
        assert_eq!(stats.total, 4);
        assert_eq!(stats.open, 3);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.sla_breached, 1);
        assert_eq!(stats.sla_at_risk, 1);
        assert_eq!(stats.mean_resolution_hours, Some(3.0));
    }

    #[test]
    fn tickets_number_per_year() {
        assert_eq!(next_ticket([], 2026), "IT-2026-001");
        assert_eq!(
            next_ticket(["IT-2026-009", "IT-2025-041", "IT-2026-002", "manual"], 2026),
            "IT-2026-010"
        );
    }

    proptest! {
        #[test]
        fn next_ticket_is_never_already_taken(numbers in proptest::collection::vec(1u32..2000, 0..20)) {
            let issued: Vec<String> = numbers.iter().map(|n| format!("IT-2026-{n:03}")).collect();
            let next = next_ticket(issued.iter().map(String::as_str), 2026);
            prop_assert!(!issued.contains(&next));
            prop_assert!(next.starts_with("IT-2026-"));
        }
    }
}
