//! Request types for the timesheet engine API.
//!
//! Payloads embed the domain models directly where the wire shape matches;
//! identity and role come pre-validated from the external authorization
//! layer and are carried in the `actor` field.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{AbsenceKind, Actor, GroupRoster, Worker};
use crate::workflow::ShiftChange;

/// Request body for creating or replacing a worker record.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertWorkerRequest {
    /// The acting user.
    pub actor: Actor,
    /// The worker record to store.
    pub worker: Worker,
}

/// Request body for planning a timesheet.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimesheetRequest {
    /// The acting user.
    pub actor: Actor,
    /// The worker the timesheet belongs to.
    pub worker_id: String,
    /// The sheet/group key.
    pub group: String,
    /// The calendar date.
    pub date: NaiveDate,
    /// Planned start time ("HH:MM").
    #[serde(default)]
    pub planned_start: Option<String>,
    /// Planned end time ("HH:MM").
    #[serde(default)]
    pub planned_end: Option<String>,
}

/// Request body for confirming a timesheet.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmTimesheetRequest {
    /// The acting user.
    pub actor: Actor,
}

/// Request body for changing a timesheet.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeTimesheetRequest {
    /// The acting user.
    pub actor: Actor,
    /// Actual start time ("HH:MM").
    #[serde(default)]
    pub actual_start: Option<String>,
    /// Actual end time ("HH:MM").
    #[serde(default)]
    pub actual_end: Option<String>,
    /// Unpaid break minutes.
    #[serde(default)]
    pub break_minutes: Option<u32>,
    /// Absence kind replacing worked time.
    #[serde(default)]
    pub absence: Option<AbsenceKind>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl From<ChangeTimesheetRequest> for ShiftChange {
    fn from(request: ChangeTimesheetRequest) -> Self {
        ShiftChange {
            actual_start: request.actual_start,
            actual_end: request.actual_end,
            break_minutes: request.break_minutes,
            absence: request.absence,
            note: request.note,
        }
    }
}

/// Request body for deleting a timesheet.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTimesheetRequest {
    /// The acting user.
    pub actor: Actor,
}

/// Request body for the monthly submit.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMonthRequest {
    /// The acting user.
    pub actor: Actor,
    /// The worker whose month is submitted.
    pub worker_id: String,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

/// Request body for an employee signature.
#[derive(Debug, Clone, Deserialize)]
pub struct SignEmployeeRequest {
    /// The acting (signing) worker.
    pub actor: Actor,
    /// The sheet's required worker set and recipient contact.
    pub roster: GroupRoster,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

/// Request body for the recipient signature.
#[derive(Debug, Clone, Deserialize)]
pub struct SignRecipientRequest {
    /// The single-use signing token from the mailed link.
    pub token: Uuid,
    /// The signature image, base64 encoded.
    pub image: String,
    /// Network address the request originated from.
    pub origin: String,
}

/// Request body for a signature withdrawal.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    /// The acting (withdrawing) worker.
    pub actor: Actor,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

/// Request body for the monthly pay report.
#[derive(Debug, Clone, Deserialize)]
pub struct PayReportRequest {
    /// Restrict the report to one worker; all workers when absent.
    #[serde(default)]
    pub worker_id: Option<String>,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Public holidays within the month.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

/// Request body for the reminder sweep (the cron entry point).
#[derive(Debug, Clone, Deserialize)]
pub struct SweepRequest {
    /// Recipient contacts per sheet.
    pub rosters: Vec<GroupRoster>,
}
