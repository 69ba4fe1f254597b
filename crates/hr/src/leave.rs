use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vitach_core::{DocumentId, DomainError, DomainResult, Record, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    Annual,
    Sick,
    Unpaid,
    Maternity,
    Paternity,
    Exceptional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub employee_id: DocumentId,
    pub kind: LeaveKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: LeaveStatus,
    #[serde(default)]
    pub decided_by: Option<UserId>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Calendar days covered, both ends included.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Approve or reject a pending request. Decided requests stay as they are.
    pub fn decide(&mut self, approve: bool, by: UserId, at: DateTime<Utc>) -> DomainResult<()> {
        if self.status != LeaveStatus::Pending {
            return Err(DomainError::invariant("leave request has already been decided"));
        }
        self.status = if approve {
            LeaveStatus::Approved
        } else {
            LeaveStatus::Rejected
        };
        self.decided_by = Some(by);
        self.decided_at = Some(at);
        Ok(())
    }
}

impl Record for LeaveRequest {
    const COLLECTION: &'static str = "leave_requests";
    const LIFECYCLE_FIELDS: &'static [&'static str] = &["status", "decided_by", "decided_at"];

    fn validate(&self) -> DomainResult<()> {
        if self.end < self.start {
            return Err(DomainError::validation("end must not be before start"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: &str) -> LeaveRequest {
        LeaveRequest {
            employee_id: DocumentId::new(),
            kind: LeaveKind::Annual,
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            reason: String::new(),
            status: LeaveStatus::Pending,
            decided_by: None,
            decided_at: None,
        }
    }

    #[test]
    fn duration_includes_both_ends() {
        assert_eq!(request("2026-03-02", "2026-03-06").duration_days(), 5);
        assert_eq!(request("2026-03-02", "2026-03-02").duration_days(), 1);
        assert!(request("2026-03-06", "2026-03-02").validate().is_err());
    }

    #[test]
    fn decision_happens_once() {
        let mut leave = request("2026-03-02", "2026-03-06");
        leave.decide(true, UserId::new(), Utc::now()).unwrap();
        assert_eq!(leave.status, LeaveStatus::Approved);
        assert!(leave.decided_by.is_some());
        assert!(leave.decide(false, UserId::new(), Utc::now()).is_err());
        assert_eq!(leave.status, LeaveStatus::Approved);
    }
}
