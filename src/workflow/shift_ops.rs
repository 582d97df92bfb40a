//! Shift lifecycle operations.
//!
//! Planners create timesheets, workers confirm or change them, and the
//! monthly submit bundles a worker's month into Submitted status. Every
//! transition writes exactly one audit entry inside the same transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceKind, Actor, AuditLogEntry, Timesheet, TimesheetStatus};
use crate::payroll::days_in_month;
use crate::timeclock;

use super::store::{Isolation, RecordStore, StoreTx};

/// Fields a worker may supply when changing a timesheet.
#[derive(Debug, Clone, Default)]
pub struct ShiftChange {
    /// Actual start time ("HH:MM").
    pub actual_start: Option<String>,
    /// Actual end time ("HH:MM").
    pub actual_end: Option<String>,
    /// Unpaid break minutes.
    pub break_minutes: Option<u32>,
    /// Absence kind replacing worked time.
    pub absence: Option<AbsenceKind>,
    /// Free-text note.
    pub note: Option<String>,
}

fn validate_clock(value: &Option<String>) -> EngineResult<()> {
    if let Some(s) = value {
        timeclock::parse_clock_time(s)?;
    }
    Ok(())
}

fn status_json(status: TimesheetStatus) -> serde_json::Value {
    json!({ "status": status.to_string() })
}

/// Creates a planned timesheet. Planner roles only.
pub fn create_timesheet<S: RecordStore>(
    store: &S,
    actor: &Actor,
    worker_id: &str,
    group: &str,
    date: NaiveDate,
    planned_start: Option<String>,
    planned_end: Option<String>,
    now: DateTime<Utc>,
) -> EngineResult<Timesheet> {
    if !actor.is_planner() {
        return Err(EngineError::NotPermitted {
            actor: actor.id.clone(),
        });
    }
    validate_clock(&planned_start)?;
    validate_clock(&planned_end)?;

    let mut sheet = Timesheet::new(worker_id, group, date, planned_start, planned_end);
    sheet.modified_by = Some(actor.id.clone());
    sheet.modified_at = Some(now);

    store.transaction(Isolation::ReadCommitted, |tx| {
        tx.put_timesheet(sheet.clone());
        tx.append_audit(AuditLogEntry::new(
            worker_id,
            now,
            &actor.id,
            "timesheet.create",
            json!(null),
            json!({ "date": sheet.date, "range": sheet.display_range() }),
        ));
        Ok(())
    })?;

    info!(timesheet_id = %sheet.id, worker_id, "Timesheet created");
    Ok(sheet)
}

/// Deletes a timesheet. Admin only; independent of the workflow state.
pub fn delete_timesheet<S: RecordStore>(
    store: &S,
    actor: &Actor,
    id: Uuid,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    if actor.role != crate::models::Role::Admin {
        return Err(EngineError::NotPermitted {
            actor: actor.id.clone(),
        });
    }

    store.transaction(Isolation::Serializable, |tx| {
        let sheet = tx
            .timesheet(id)
            .ok_or(EngineError::TimesheetNotFound { id })?;
        tx.delete_timesheet(id);
        tx.append_audit(AuditLogEntry::new(
            &sheet.worker_id,
            now,
            &actor.id,
            "timesheet.delete",
            json!({ "date": sheet.date, "status": sheet.status.to_string() }),
            json!(null),
        ));
        Ok(())
    })
}

/// Confirms a planned timesheet as worked: actual times take over the
/// planned ones and the status moves Planned → Confirmed.
pub fn confirm_timesheet<S: RecordStore>(
    store: &S,
    actor: &Actor,
    id: Uuid,
    now: DateTime<Utc>,
) -> EngineResult<Timesheet> {
    store.transaction(Isolation::Serializable, |tx| {
        let mut sheet = tx
            .timesheet(id)
            .ok_or(EngineError::TimesheetNotFound { id })?;
        if !actor.may_modify(&sheet.worker_id) {
            return Err(EngineError::NotPermitted {
                actor: actor.id.clone(),
            });
        }
        if sheet.status != TimesheetStatus::Planned {
            return Err(EngineError::TimesheetLocked {
                id,
                status: sheet.status.to_string(),
            });
        }

        let old = status_json(sheet.status);
        sheet.actual_start = sheet.planned_start.clone();
        sheet.actual_end = sheet.planned_end.clone();
        sheet.status = TimesheetStatus::Confirmed;
        sheet.modified_by = Some(actor.id.clone());
        sheet.modified_at = Some(now);

        tx.append_audit(AuditLogEntry::new(
            &sheet.worker_id,
            now,
            &actor.id,
            "timesheet.confirm",
            old,
            status_json(sheet.status),
        ));
        tx.put_timesheet(sheet.clone());
        Ok(sheet)
    })
}

/// Records actual times, break or absence differing from the plan.
///
/// Allowed while the timesheet has not been submitted; repeated changes
/// keep the Changed status.
pub fn change_timesheet<S: RecordStore>(
    store: &S,
    actor: &Actor,
    id: Uuid,
    change: ShiftChange,
    now: DateTime<Utc>,
) -> EngineResult<Timesheet> {
    validate_clock(&change.actual_start)?;
    validate_clock(&change.actual_end)?;

    store.transaction(Isolation::Serializable, |tx| {
        let mut sheet = tx
            .timesheet(id)
            .ok_or(EngineError::TimesheetNotFound { id })?;
        if !actor.may_modify(&sheet.worker_id) {
            return Err(EngineError::NotPermitted {
                actor: actor.id.clone(),
            });
        }
        if sheet.status.is_locked() {
            return Err(EngineError::TimesheetLocked {
                id,
                status: sheet.status.to_string(),
            });
        }

        let old = json!({
            "status": sheet.status.to_string(),
            "range": sheet.display_range(),
        });

        if let Some(start) = change.actual_start {
            sheet.actual_start = Some(start);
        }
        if let Some(end) = change.actual_end {
            sheet.actual_end = Some(end);
        }
        if let Some(minutes) = change.break_minutes {
            sheet.break_minutes = minutes;
        }
        if let Some(absence) = change.absence {
            sheet.absence = absence;
        }
        if let Some(note) = change.note {
            sheet.note = Some(note);
        }
        sheet.status = TimesheetStatus::Changed;
        sheet.modified_by = Some(actor.id.clone());
        sheet.modified_at = Some(now);

        tx.append_audit(AuditLogEntry::new(
            &sheet.worker_id,
            now,
            &actor.id,
            "timesheet.change",
            old,
            json!({
                "status": sheet.status.to_string(),
                "range": sheet.display_range(),
            }),
        ));
        tx.put_timesheet(sheet.clone());
        Ok(sheet)
    })
}

/// Bundles a worker's month for submission.
///
/// Fails with [`EngineError::UnconfirmedShifts`] if any shift with a
/// non-null planned start is still Planned; otherwise every shift of the
/// month moves to Submitted in one bulk write with exactly one audit entry.
/// Returns the number of shifts submitted.
pub fn submit_month<S: RecordStore>(
    store: &S,
    actor: &Actor,
    worker_id: &str,
    month: u32,
    year: i32,
    now: DateTime<Utc>,
) -> EngineResult<usize> {
    days_in_month(month, year)?;
    if !actor.may_modify(worker_id) {
        return Err(EngineError::NotPermitted {
            actor: actor.id.clone(),
        });
    }

    let submitted = store.transaction(Isolation::Serializable, |tx| {
        let sheets = tx.timesheets_for_worker_month(worker_id, month, year);
        if sheets.is_empty() {
            return Err(EngineError::Validation {
                message: format!("no timesheets for {:02}/{}", month, year),
            });
        }

        let unconfirmed = sheets
            .iter()
            .filter(|t| t.status == TimesheetStatus::Planned && t.planned_start.is_some())
            .count();
        if unconfirmed > 0 {
            return Err(EngineError::UnconfirmedShifts { count: unconfirmed });
        }

        let changed = tx.update_timesheet_status_bulk(
            worker_id,
            month,
            year,
            &[
                TimesheetStatus::Planned,
                TimesheetStatus::Confirmed,
                TimesheetStatus::Changed,
            ],
            TimesheetStatus::Submitted,
            &actor.id,
            now,
        );

        tx.append_audit(AuditLogEntry::new(
            worker_id,
            now,
            &actor.id,
            "month.submit",
            json!({ "month": month, "year": year }),
            json!({ "submitted": changed }),
        ));
        Ok(changed)
    })?;

    info!(worker_id, month, year, submitted, "Month submitted");
    Ok(submitted)
}
