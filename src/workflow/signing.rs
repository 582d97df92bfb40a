//! Employee and recipient signing.
//!
//! Employees sign their month's submission (created on the first
//! signature); once the roster is complete the submission advances to the
//! recipient phase and a single-use signing token is minted. The recipient
//! signs through that token, which completes the submission and cascades
//! the sheet's timesheets to Completed.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AuditLogEntry, EmployeeSignature, GroupRoster, RecipientSignature, SigningToken,
    SubmissionKey, SubmissionStatus, TeamSubmission, TimesheetStatus,
};
use crate::payroll::days_in_month;

use super::store::{Isolation, RecordStore, StoreTx};
use super::{DocumentGenerator, NotificationSender};

/// Signs a submission as the acting employee.
///
/// Creates the submission for (roster.group, month, year) if this is the
/// first signature. Signing twice is a no-op; the uniqueness of the
/// (worker, submission) pair is enforced by the store. When every worker in
/// the roster has signed, the submission advances to the recipient phase, a
/// signing token valid for `token_ttl` is minted and the signing request is
/// sent to the recipient. A failed send is logged and does not roll the
/// phase change back.
pub fn sign_as_employee<S: RecordStore>(
    store: &S,
    notifier: &dyn NotificationSender,
    actor: &Actor,
    roster: &GroupRoster,
    month: u32,
    year: i32,
    token_ttl: Duration,
    now: DateTime<Utc>,
) -> EngineResult<TeamSubmission> {
    days_in_month(month, year)?;

    let (submission, advanced) = store.transaction(Isolation::Serializable, |tx| {
        let has_submitted = tx
            .timesheets_for_worker_month(&actor.id, month, year)
            .iter()
            .any(|t| t.group == roster.group && t.status == TimesheetStatus::Submitted);
        if !has_submitted {
            return Err(EngineError::Validation {
                message: format!(
                    "worker '{}' has no submitted timesheets on sheet '{}' for {:02}/{}",
                    actor.id, roster.group, month, year
                ),
            });
        }

        let key = SubmissionKey {
            group: roster.group.clone(),
            month,
            year,
        };
        let mut submission = match tx.submission_by_key(&key) {
            Some(existing) => existing,
            None => TeamSubmission::new(key, now),
        };
        if submission.is_completed() {
            return Err(EngineError::SubmissionCompleted);
        }

        let inserted = tx.insert_signature(EmployeeSignature {
            worker_id: actor.id.clone(),
            submission_id: submission.id,
            signed_at: now,
        });

        let signed: Vec<String> = tx
            .signatures_for_submission(submission.id)
            .into_iter()
            .map(|s| s.worker_id)
            .collect();

        let mut advanced = false;
        if submission.status == SubmissionStatus::PendingEmployees && roster.is_complete(&signed)
        {
            submission.status = SubmissionStatus::PendingRecipient;
            submission.token = Some(SigningToken {
                token: Uuid::new_v4(),
                expires_at: now + token_ttl,
            });
            advanced = true;
        }

        tx.put_submission(submission.clone());
        if inserted {
            tx.append_audit(AuditLogEntry::new(
                &actor.id,
                now,
                &actor.id,
                "submission.sign",
                json!({ "signed": signed.len().saturating_sub(1) }),
                json!({ "signed": signed.len(), "status": submission.status.to_string() }),
            ));
        }
        Ok((submission, advanced))
    })?;

    if advanced {
        let token = submission
            .token
            .as_ref()
            .map(|t| t.token)
            .unwrap_or_default();
        if let Err(err) = notifier.send_signing_request(
            &roster.recipient_name,
            &roster.recipient_email,
            &submission,
            token,
        ) {
            warn!(
                submission_id = %submission.id,
                error = %err,
                "Signing request could not be delivered"
            );
        }
    }

    info!(
        submission_id = %submission.id,
        worker_id = %actor.id,
        status = %submission.status,
        "Employee signature recorded"
    );
    Ok(submission)
}

/// Signs a submission as the care recipient, via the signing token.
///
/// Valid only while the submission awaits the recipient. Completion stores
/// the signature with its origin address, invalidates the token, cascades
/// the sheet's Submitted timesheets to Completed and writes one audit
/// entry, all in one transaction. Document generation runs after the
/// commit; its failure is logged and does not undo the completion.
pub fn sign_as_recipient<S: RecordStore>(
    store: &S,
    documents: &dyn DocumentGenerator,
    token: Uuid,
    image: String,
    origin: String,
    now: DateTime<Utc>,
) -> EngineResult<TeamSubmission> {
    let (submission, sheets) = store.transaction(Isolation::Serializable, |tx| {
        let mut submission = tx.submission_by_token(token).ok_or(EngineError::TokenInvalid)?;

        if submission.is_completed() {
            return Err(EngineError::SubmissionCompleted);
        }
        if submission.status != SubmissionStatus::PendingRecipient {
            return Err(EngineError::Validation {
                message: "submission is not awaiting the recipient".to_string(),
            });
        }
        let signing_token = submission.token.ok_or(EngineError::TokenInvalid)?;
        if signing_token.is_expired(now) {
            return Err(EngineError::TokenExpired {
                expired_at: signing_token.expires_at,
            });
        }

        submission.recipient_signature = Some(RecipientSignature {
            image,
            signed_at: now,
            origin,
        });
        submission.status = SubmissionStatus::Completed;
        submission.token = None;

        let key = submission.key.clone();
        let completed = tx.update_group_status_bulk(
            &key.group,
            key.month,
            key.year,
            &[TimesheetStatus::Submitted],
            TimesheetStatus::Completed,
            "recipient",
            now,
        );

        tx.put_submission(submission.clone());
        tx.append_audit(AuditLogEntry::new(
            &key.group,
            now,
            "recipient",
            "submission.complete",
            json!({ "status": SubmissionStatus::PendingRecipient.to_string() }),
            json!({
                "status": submission.status.to_string(),
                "timesheets_completed": completed,
            }),
        ));

        let sheets = tx.timesheets_for_group_month(&key.group, key.month, key.year);
        Ok((submission, sheets))
    })?;

    info!(
        submission_id = %submission.id,
        sheet = %submission.key,
        "Submission completed by recipient"
    );

    match documents.generate(&submission, &sheets) {
        Ok(document_ref) => {
            let id = submission.id;
            let stored = store.transaction(Isolation::ReadCommitted, |tx| {
                let Some(mut current) = tx.submission(id) else {
                    return Ok(None);
                };
                current.document_ref = Some(document_ref.clone());
                tx.put_submission(current.clone());
                Ok(Some(current))
            })?;
            Ok(stored.unwrap_or(submission))
        }
        Err(err) => {
            warn!(
                submission_id = %submission.id,
                error = %err,
                "Document generation failed after completion"
            );
            Ok(submission)
        }
    }
}
