//! Human resources: the employee directory, daily attendance and leave
//! requests.

pub mod attendance;
pub mod employee;
pub mod leave;

pub use attendance::{Attendance, AttendanceStatus, AttendanceSummary, ClockEvent, day_record, summarize};
pub use employee::Employee;
pub use leave::{LeaveKind, LeaveRequest, LeaveStatus};
