//! Timesheet model and its status machine.
//!
//! A timesheet records one worker's planned and actual work (or absence) on
//! one calendar date. Status moves Planned → Confirmed/Changed → Submitted →
//! Completed; the only reverse edge, Submitted → Confirmed, exists via
//! signature withdrawal.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::timeclock;

/// The lifecycle status of a timesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    /// Created by a planner; the worker has not reacted yet.
    Planned,
    /// The worker accepted the planned times as worked.
    Confirmed,
    /// The worker supplied actual times or an absence differing from the plan.
    Changed,
    /// Bundled into a monthly submission awaiting signatures.
    Submitted,
    /// The submission was fully signed; the record is final.
    Completed,
}

impl TimesheetStatus {
    /// Returns true once the timesheet is bound to a submission and no
    /// longer accepts worker edits.
    pub fn is_locked(&self) -> bool {
        matches!(self, TimesheetStatus::Submitted | TimesheetStatus::Completed)
    }
}

impl std::fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimesheetStatus::Planned => "planned",
            TimesheetStatus::Confirmed => "confirmed",
            TimesheetStatus::Changed => "changed",
            TimesheetStatus::Submitted => "submitted",
            TimesheetStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// Kind of absence recorded on a timesheet.
///
/// When an absence is set, any actual times represent the absence span, not
/// work; the premium engine books them as sick or vacation hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    /// No absence; the timesheet records work.
    None,
    /// Sick leave.
    Sick,
    /// Vacation.
    Vacation,
}

/// One worker's planned/actual work or absence on one calendar date.
///
/// `month` and `year` duplicate the date for fast range queries; the
/// constructor derives them and they must never drift from `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timesheet {
    /// Unique identifier.
    pub id: Uuid,
    /// The worker this timesheet belongs to.
    pub worker_id: String,
    /// The calendar date.
    pub date: NaiveDate,
    /// Month of `date`, denormalized.
    pub month: u32,
    /// Year of `date`, denormalized.
    pub year: i32,
    /// Planned start time ("HH:MM"), if planned.
    pub planned_start: Option<String>,
    /// Planned end time ("HH:MM"), if planned.
    pub planned_end: Option<String>,
    /// Actual start time, set once the worker confirms or changes.
    pub actual_start: Option<String>,
    /// Actual end time, set once the worker confirms or changes.
    pub actual_end: Option<String>,
    /// Unpaid break minutes.
    pub break_minutes: u32,
    /// Absence kind, if the day was not worked.
    pub absence: AbsenceKind,
    /// Lifecycle status.
    pub status: TimesheetStatus,
    /// Free-text note.
    pub note: Option<String>,
    /// Key of the monthly sheet this timesheet belongs to.
    pub group: String,
    /// Backup worker covering the shift, if any.
    pub backup_worker_id: Option<String>,
    /// Who last modified the record.
    pub modified_by: Option<String>,
    /// When the record was last modified.
    pub modified_at: Option<DateTime<Utc>>,
}

impl Timesheet {
    /// Creates a new planned timesheet.
    ///
    /// Month and year are derived from `date`.
    pub fn new(
        worker_id: impl Into<String>,
        group: impl Into<String>,
        date: NaiveDate,
        planned_start: Option<String>,
        planned_end: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            worker_id: worker_id.into(),
            date,
            month: date.month(),
            year: date.year(),
            planned_start,
            planned_end,
            actual_start: None,
            actual_end: None,
            break_minutes: 0,
            absence: AbsenceKind::None,
            status: TimesheetStatus::Planned,
            note: None,
            group: group.into(),
            backup_worker_id: None,
            modified_by: None,
            modified_at: None,
        }
    }

    /// Returns the effective start/end pair: actual times when present,
    /// otherwise the planned times.
    pub fn effective_span(&self) -> Option<(&str, &str)> {
        match (&self.actual_start, &self.actual_end) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => match (&self.planned_start, &self.planned_end) {
                (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
                _ => None,
            },
        }
    }

    /// Returns the worked minutes of this timesheet, net of breaks.
    ///
    /// `Ok(None)` when no complete span is recorded. Absence timesheets
    /// still report their span here; the caller decides which bucket the
    /// minutes belong to.
    pub fn span_minutes(&self) -> EngineResult<Option<u32>> {
        let Some((start, end)) = self.effective_span() else {
            return Ok(None);
        };
        let gross = timeclock::shift_duration(start, end)?;
        Ok(Some(gross.saturating_sub(self.break_minutes)))
    }

    /// Renders the effective span for display, or "-" when none exists.
    pub fn display_range(&self) -> String {
        match self.effective_span() {
            Some((start, end)) => timeclock::format_range(start, end),
            None => "-".to_string(),
        }
    }

    /// Returns true when this timesheet records an absence.
    pub fn is_absence(&self) -> bool {
        self.absence != AbsenceKind::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sheet(start: &str, end: &str) -> Timesheet {
        Timesheet::new(
            "w1",
            "sheet-a",
            date("2025-03-10"),
            Some(start.to_string()),
            Some(end.to_string()),
        )
    }

    #[test]
    fn test_new_derives_month_and_year_from_date() {
        let ts = sheet("08:00", "16:00");
        assert_eq!(ts.month, 3);
        assert_eq!(ts.year, 2025);
        assert_eq!(ts.status, TimesheetStatus::Planned);
    }

    #[test]
    fn test_effective_span_prefers_actual_times() {
        let mut ts = sheet("08:00", "16:00");
        assert_eq!(ts.effective_span(), Some(("08:00", "16:00")));

        ts.actual_start = Some("09:00".to_string());
        ts.actual_end = Some("17:30".to_string());
        assert_eq!(ts.effective_span(), Some(("09:00", "17:30")));
    }

    #[test]
    fn test_span_minutes_subtracts_breaks() {
        let mut ts = sheet("08:00", "16:00");
        ts.break_minutes = 30;
        assert_eq!(ts.span_minutes().unwrap(), Some(450));
    }

    #[test]
    fn test_span_minutes_none_without_times() {
        let ts = Timesheet::new("w1", "sheet-a", date("2025-03-10"), None, None);
        assert_eq!(ts.span_minutes().unwrap(), None);
    }

    #[test]
    fn test_span_minutes_overnight() {
        let ts = sheet("22:00", "06:00");
        assert_eq!(ts.span_minutes().unwrap(), Some(480));
    }

    #[test]
    fn test_display_range_renders_end_of_day() {
        let ts = sheet("16:00", "00:00");
        assert_eq!(ts.display_range(), "16:00-24:00");
    }

    #[test]
    fn test_locked_statuses() {
        assert!(TimesheetStatus::Submitted.is_locked());
        assert!(TimesheetStatus::Completed.is_locked());
        assert!(!TimesheetStatus::Planned.is_locked());
        assert!(!TimesheetStatus::Confirmed.is_locked());
        assert!(!TimesheetStatus::Changed.is_locked());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TimesheetStatus::Planned).unwrap();
        assert_eq!(json, "\"planned\"");
        let back: TimesheetStatus = serde_json::from_str("\"submitted\"").unwrap();
        assert_eq!(back, TimesheetStatus::Submitted);
    }
}
