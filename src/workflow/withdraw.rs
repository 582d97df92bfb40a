//! Signature withdrawal.
//!
//! A worker may retract their own signature only while the recipient has
//! not signed and the submission is not completed. Two independent actors
//! can race here — the withdrawing employee and the signing recipient — so
//! the operation runs an optimistic pre-check outside any transaction and
//! re-validates both preconditions inside the serializable transaction that
//! performs the writes. The pre-check keeps user-facing latency out of the
//! transaction; the re-check closes the window in which its result goes
//! stale.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AuditLogEntry, SubmissionStatus, TeamSubmission, TimesheetStatus,
};
use crate::payroll::days_in_month;

use super::store::{Isolation, RecordStore, StoreTx};

fn find_signed_submission(
    tx: &dyn StoreTx,
    worker_id: &str,
    month: u32,
    year: i32,
) -> Option<TeamSubmission> {
    tx.submissions()
        .into_iter()
        .filter(|s| s.key.month == month && s.key.year == year)
        .find(|s| tx.signature(worker_id, s.id).is_some())
}

fn check_open(submission: &TeamSubmission) -> EngineResult<()> {
    if submission.recipient_signature.is_some() {
        return Err(EngineError::RecipientAlreadySigned);
    }
    if submission.status == SubmissionStatus::Completed {
        return Err(EngineError::SubmissionCompleted);
    }
    Ok(())
}

/// Withdraws the acting worker's signature from their month's submission.
///
/// On success the worker's Submitted timesheets revert to Confirmed, the
/// submission drops back to the employee phase with its signing token
/// invalidated, and one audit entry records the withdrawal. All four writes
/// commit atomically or not at all; any precondition that fails inside the
/// transaction aborts it with full rollback and surfaces the matching
/// conflict code.
pub fn withdraw_signature<S: RecordStore>(
    store: &S,
    actor: &Actor,
    month: u32,
    year: i32,
    now: DateTime<Utc>,
) -> EngineResult<TeamSubmission> {
    days_in_month(month, year)?;

    // Optimistic pre-check; its result can be stale by the time the
    // transaction below begins.
    let submission_id: Uuid = store.snapshot(|tx| {
        let submission = find_signed_submission(tx, &actor.id, month, year).ok_or(
            EngineError::SignatureNotFound {
                worker: actor.id.clone(),
            },
        )?;
        check_open(&submission)?;
        Ok(submission.id)
    })?;

    let submission = store.transaction(Isolation::Serializable, |tx| {
        if !tx.delete_signature(&actor.id, submission_id) {
            return Err(EngineError::SignatureNotFound {
                worker: actor.id.clone(),
            });
        }

        // Re-read: the recipient may have signed, or the submission may
        // have completed, since the pre-check.
        let current = tx.submission(submission_id).ok_or(EngineError::Store {
            message: "submission vanished mid-withdrawal".to_string(),
        })?;
        check_open(&current)?;

        let reverted = tx.update_timesheet_status_bulk(
            &actor.id,
            month,
            year,
            &[TimesheetStatus::Submitted],
            TimesheetStatus::Confirmed,
            &actor.id,
            now,
        );

        let matched = tx.update_submission_status_if(
            submission_id,
            &[
                SubmissionStatus::PendingEmployees,
                SubmissionStatus::PendingRecipient,
            ],
            SubmissionStatus::PendingEmployees,
        );
        if matched == 0 {
            return Err(EngineError::StatusChanged);
        }

        let mut updated = tx.submission(submission_id).ok_or(EngineError::Store {
            message: "submission vanished mid-withdrawal".to_string(),
        })?;
        updated.token = None;
        tx.put_submission(updated.clone());

        tx.append_audit(AuditLogEntry::new(
            &actor.id,
            now,
            &actor.id,
            "submission.withdraw",
            json!({ "status": current.status.to_string() }),
            json!({
                "status": updated.status.to_string(),
                "timesheets_reverted": reverted,
            }),
        ));
        Ok(updated)
    })?;

    info!(
        submission_id = %submission.id,
        worker_id = %actor.id,
        "Signature withdrawn"
    );
    Ok(submission)
}
