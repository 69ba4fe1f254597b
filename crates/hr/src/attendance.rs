//! Daily attendance: at most one record per employee and day, filled either
//! by the employee clocking in and out or by HR for the whole staff.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use vitach_core::{DocumentId, DomainError, DomainResult, Record, Stored};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Late,
    ExcusedAbsence,
}

impl AttendanceStatus {
    pub fn is_absence(self) -> bool {
        matches!(self, AttendanceStatus::Absent | AttendanceStatus::ExcusedAbsence)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub employee_id: DocumentId,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub arrival: Option<NaiveTime>,
    #[serde(default)]
    pub departure: Option<NaiveTime>,
    #[serde(default)]
    pub comment: String,
    /// Signature captured when clocking in.
    #[serde(default)]
    pub signature: Option<String>,
    /// Fingerprint of the device used to clock in.
    #[serde(default)]
    pub device: Option<String>,
}

/// What a clock event recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockEvent {
    Arrival,
    Departure,
}

impl Attendance {
    /// Open the day with an arrival at `at`.
    pub fn check_in(
        employee_id: DocumentId,
        date: NaiveDate,
        at: NaiveTime,
        signature: String,
        device: Option<String>,
    ) -> DomainResult<Self> {
        if signature.trim().is_empty() {
            return Err(DomainError::validation("signature is required to clock in"));
        }
        Ok(Self {
            employee_id,
            date,
            status: AttendanceStatus::Present,
            arrival: Some(at),
            departure: None,
            comment: String::new(),
            signature: Some(signature),
            device,
        })
    }

    /// A standard 08:00-17:00 day, as entered by HR's quick attendance.
    pub fn full_day(employee_id: DocumentId, date: NaiveDate) -> Self {
        Self {
            employee_id,
            date,
            status: AttendanceStatus::Present,
            arrival: NaiveTime::from_hms_opt(8, 0, 0),
            departure: NaiveTime::from_hms_opt(17, 0, 0),
            comment: String::new(),
            signature: None,
            device: None,
        }
    }

    pub fn check_out(&mut self, at: NaiveTime) -> DomainResult<()> {
        match (self.arrival, self.departure) {
            (None, _) => Err(DomainError::invariant("no arrival recorded for this day")),
            (Some(_), Some(_)) => Err(DomainError::conflict("attendance already complete for this day")),
            (Some(arrival), None) if at < arrival => {
                Err(DomainError::validation("departure cannot be before arrival"))
            }
            (Some(_), None) => {
                self.departure = Some(at);
                Ok(())
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.arrival.is_some() && self.departure.is_some()
    }

    /// Minutes between arrival and departure, once both are known.
    pub fn worked_minutes(&self) -> Option<i64> {
        Some((self.departure? - self.arrival?).num_minutes())
    }
}

impl Record for Attendance {
    const COLLECTION: &'static str = "attendance";
    const LIFECYCLE_FIELDS: &'static [&'static str] = &["employee_id", "date"];

    fn validate(&self) -> DomainResult<()> {
        if self.status.is_absence() && (self.arrival.is_some() || self.departure.is_some()) {
            return Err(DomainError::validation("an absence cannot have arrival or departure times"));
        }
        match (self.arrival, self.departure) {
            (None, Some(_)) => Err(DomainError::validation("departure requires an arrival")),
            (Some(arrival), Some(departure)) if departure < arrival => {
                Err(DomainError::validation("departure cannot be before arrival"))
            }
            _ => Ok(()),
        }
    }
}

/// The record `employee_id` already has for `date`, if any.
pub fn day_record<'a>(
    records: &'a [Stored<Attendance>],
    employee_id: DocumentId,
    date: NaiveDate,
) -> Option<&'a Stored<Attendance>> {
    records
        .iter()
        .find(|s| s.record.employee_id == employee_id && s.record.date == date)
}

/// Head count per status for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub date: NaiveDate,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused_absence: usize,
}

pub fn summarize<'a>(records: impl IntoIterator<Item = &'a Attendance>, date: NaiveDate) -> AttendanceSummary {
    records
        .into_iter()
        .filter(|a| a.date == date)
        .fold(AttendanceSummary { date, ..Default::default() }, |mut acc, a| {
            acc.total += 1;
            match a.status {
                AttendanceStatus::Present => acc.present += 1,
                AttendanceStatus::Absent => acc.absent += 1,
                AttendanceStatus::Late => acc.late += 1,
                AttendanceStatus::ExcusedAbsence => acc.excused_absence += 1,
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        "2026-04-14".parse().unwrap()
    }

    fn time(raw: &str) -> NaiveTime {
        raw.parse().unwrap()
    }

    #[test]
    fn clock_in_then_out_completes_the_day() {
        let mut record =
            Attendance::check_in(DocumentId::new(), day(), time("08:12:00"), "sig".into(), Some("fp-1".into()))
                .unwrap();
        assert!(!record.is_complete());
        assert!(record.validate().is_ok());

        assert!(matches!(record.check_out(time("07:00:00")), Err(DomainError::Validation(_))));
        record.check_out(time("17:30:00")).unwrap();
        assert!(record.is_complete());
        assert_eq!(record.worked_minutes(), Some(558));

        assert!(matches!(record.check_out(time("18:00:00")), Err(DomainError::Conflict(_))));
        assert_eq!(record.departure, Some(time("17:30:00")));
    }

    #[test]
    fn clocking_in_needs_a_signature() {
        let refused = Attendance::check_in(DocumentId::new(), day(), time("08:00:00"), "  ".into(), None);
        assert!(refused.is_err());
    }

    #[test]
    fn times_must_be_consistent_with_status() {
        let mut record = Attendance::full_day(DocumentId::new(), day());
        assert!(record.validate().is_ok());

        record.status = AttendanceStatus::Absent;
        assert!(record.validate().is_err());

        record.arrival = None;
        assert!(record.validate().is_err());
        record.departure = None;
        assert!(record.validate().is_ok());

        let mut backwards = Attendance::full_day(DocumentId::new(), day());
        backwards.departure = Some(time("07:59:00"));
        assert!(backwards.validate().is_err());
    }

    #[test]
    fn summary_counts_only_the_requested_day() {
        let mut late = Attendance::full_day(DocumentId::new(), day());
        late.status = AttendanceStatus::Late;
        let mut excused = Attendance::full_day(DocumentId::new(), day());
        excused.status = AttendanceStatus::ExcusedAbsence;
        excused.arrival = None;
        excused.departure = None;
        let other_day = Attendance::full_day(DocumentId::new(), "2026-04-15".parse().unwrap());
        let records = [Attendance::full_day(DocumentId::new(), day()), late, excused, other_day];

        let summary = summarize(&records, day());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.excused_absence, 1);
        assert_eq!(summary.absent, 0);
    }
}
