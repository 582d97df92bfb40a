//! Reminder eligibility and the reminder sweep.
//!
//! Eligibility is a pure predicate over submission fields and "now"; the
//! sweep applies it to every submission, fires the notification collaborator
//! per eligible one, and partitions failures from successes instead of
//! aborting the batch.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{GroupRoster, SubmissionStatus, TeamSubmission};

use super::NotificationSender;
use super::store::{Isolation, RecordStore, StoreTx};

/// Default cool-down between reminders, in days.
pub const DEFAULT_REMINDER_COOLDOWN_DAYS: i64 = 2;

/// Decides whether a submission is due for a reminder.
///
/// Due means: awaiting the recipient, the signing token has not expired,
/// and the cool-down window has passed since the last reminder — or since
/// creation, if none was ever sent.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use timesheet_engine::models::{SubmissionKey, SubmissionStatus, SigningToken, TeamSubmission};
/// use timesheet_engine::workflow::is_reminder_due;
/// use uuid::Uuid;
///
/// let created = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
/// let mut submission = TeamSubmission::new(
///     SubmissionKey { group: "sheet-a".into(), month: 2, year: 2025 },
///     created,
/// );
/// submission.status = SubmissionStatus::PendingRecipient;
/// submission.token = Some(SigningToken {
///     token: Uuid::new_v4(),
///     expires_at: created + Duration::days(14),
/// });
///
/// let now = created + Duration::days(2) + Duration::seconds(1);
/// assert!(is_reminder_due(&submission, now, Duration::days(2)));
///
/// submission.last_reminder_sent_at = Some(now - Duration::hours(1));
/// assert!(!is_reminder_due(&submission, now, Duration::days(2)));
/// ```
pub fn is_reminder_due(
    submission: &TeamSubmission,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> bool {
    if submission.status != SubmissionStatus::PendingRecipient {
        return false;
    }
    let Some(token) = submission.token else {
        return false;
    };
    if token.is_expired(now) {
        return false;
    }
    let reference = submission
        .last_reminder_sent_at
        .unwrap_or(submission.created_at);
    now - reference > cooldown
}

/// Result of one reminder sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Submissions a reminder was sent for.
    pub sent: Vec<Uuid>,
    /// Submissions whose reminder failed, with the failure message.
    pub failures: Vec<(Uuid, String)>,
}

/// Sends a reminder for every due submission.
///
/// `rosters` supplies the recipient contact per sheet; a due submission
/// without a roster counts as a failure. Each successful send stamps
/// `last_reminder_sent_at`; a failed send neither aborts the sweep nor
/// touches the submission.
pub fn sweep_reminders<S: RecordStore>(
    store: &S,
    notifier: &dyn NotificationSender,
    rosters: &[GroupRoster],
    now: DateTime<Utc>,
    cooldown: Duration,
) -> EngineResult<SweepOutcome> {
    let due: Vec<TeamSubmission> = store.snapshot(|tx| {
        Ok(tx
            .submissions()
            .into_iter()
            .filter(|s| is_reminder_due(s, now, cooldown))
            .collect())
    })?;

    let mut outcome = SweepOutcome::default();
    for submission in due {
        let Some(roster) = rosters.iter().find(|r| r.group == submission.key.group) else {
            outcome.failures.push((
                submission.id,
                format!("no roster for sheet '{}'", submission.key.group),
            ));
            continue;
        };
        let token = submission.token.map(|t| t.token).unwrap_or_default();

        match notifier.send_signing_request(
            &roster.recipient_name,
            &roster.recipient_email,
            &submission,
            token,
        ) {
            Ok(()) => {
                store.transaction(Isolation::ReadCommitted, |tx| {
                    if let Some(mut current) = tx.submission(submission.id) {
                        current.last_reminder_sent_at = Some(now);
                        tx.put_submission(current);
                    }
                    Ok(())
                })?;
                outcome.sent.push(submission.id);
            }
            Err(err) => {
                warn!(
                    submission_id = %submission.id,
                    error = %err,
                    "Reminder delivery failed"
                );
                outcome.failures.push((submission.id, err.to_string()));
            }
        }
    }

    info!(
        sent = outcome.sent.len(),
        failed = outcome.failures.len(),
        "Reminder sweep finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{SigningToken, SubmissionKey};
    use crate::workflow::store::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    fn cooldown() -> Duration {
        Duration::days(DEFAULT_REMINDER_COOLDOWN_DAYS)
    }

    fn pending_recipient(group: &str) -> TeamSubmission {
        let mut submission = TeamSubmission::new(
            SubmissionKey {
                group: group.to_string(),
                month: 2,
                year: 2025,
            },
            created_at(),
        );
        submission.status = SubmissionStatus::PendingRecipient;
        submission.token = Some(SigningToken {
            token: Uuid::new_v4(),
            expires_at: created_at() + Duration::days(14),
        });
        submission
    }

    fn roster(group: &str) -> GroupRoster {
        GroupRoster {
            group: group.to_string(),
            required_workers: vec!["w1".to_string()],
            recipient_name: "K. Recipient".to_string(),
            recipient_email: "recipient@example.org".to_string(),
        }
    }

    #[test]
    fn test_due_just_past_the_cooldown() {
        let submission = pending_recipient("sheet-a");
        let now = created_at() + cooldown() + Duration::seconds(1);
        assert!(is_reminder_due(&submission, now, cooldown()));
    }

    #[test]
    fn test_not_due_within_the_cooldown() {
        let submission = pending_recipient("sheet-a");
        let now = created_at() + cooldown();
        assert!(!is_reminder_due(&submission, now, cooldown()));
    }

    #[test]
    fn test_not_due_after_recent_reminder() {
        let mut submission = pending_recipient("sheet-a");
        let now = created_at() + Duration::days(5);
        submission.last_reminder_sent_at = Some(now - Duration::hours(1));
        assert!(!is_reminder_due(&submission, now, cooldown()));
    }

    #[test]
    fn test_due_again_after_cooldown_since_last_reminder() {
        let mut submission = pending_recipient("sheet-a");
        let now = created_at() + Duration::days(5);
        submission.last_reminder_sent_at = Some(now - cooldown() - Duration::seconds(1));
        assert!(is_reminder_due(&submission, now, cooldown()));
    }

    #[test]
    fn test_not_due_in_wrong_status_or_without_token() {
        let now = created_at() + Duration::days(5);

        let mut pending = pending_recipient("sheet-a");
        pending.status = SubmissionStatus::PendingEmployees;
        assert!(!is_reminder_due(&pending, now, cooldown()));

        let mut completed = pending_recipient("sheet-a");
        completed.status = SubmissionStatus::Completed;
        assert!(!is_reminder_due(&completed, now, cooldown()));

        let mut tokenless = pending_recipient("sheet-a");
        tokenless.token = None;
        assert!(!is_reminder_due(&tokenless, now, cooldown()));
    }

    #[test]
    fn test_not_due_with_expired_token() {
        let submission = pending_recipient("sheet-a");
        let now = created_at() + Duration::days(15);
        assert!(!is_reminder_due(&submission, now, cooldown()));
    }

    /// Fails for one specific sheet, succeeds otherwise.
    struct FlakyNotifier {
        fail_group: String,
        sent: Mutex<Vec<String>>,
    }

    impl NotificationSender for FlakyNotifier {
        fn send_signing_request(
            &self,
            _recipient_name: &str,
            _recipient_email: &str,
            submission: &TeamSubmission,
            _token: Uuid,
        ) -> EngineResult<()> {
            if submission.key.group == self.fail_group {
                return Err(EngineError::NotificationFailed {
                    message: "mailbox full".to_string(),
                });
            }
            self.sent.lock().unwrap().push(submission.key.group.clone());
            Ok(())
        }
    }

    #[test]
    fn test_sweep_partitions_failures_from_successes() {
        let store = MemoryStore::new();
        let good = pending_recipient("sheet-a");
        let bad = pending_recipient("sheet-b");
        let fresh = {
            // not due: inside the cool-down
            let mut s = pending_recipient("sheet-c");
            s.last_reminder_sent_at = Some(created_at() + Duration::days(4));
            s
        };
        store
            .transaction(Isolation::ReadCommitted, |tx| {
                tx.put_submission(good.clone());
                tx.put_submission(bad.clone());
                tx.put_submission(fresh.clone());
                Ok(())
            })
            .unwrap();

        let notifier = FlakyNotifier {
            fail_group: "sheet-b".to_string(),
            sent: Mutex::new(Vec::new()),
        };
        let rosters = vec![roster("sheet-a"), roster("sheet-b"), roster("sheet-c")];
        let now = created_at() + Duration::days(4) + Duration::hours(1);

        let outcome = sweep_reminders(&store, &notifier, &rosters, now, cooldown()).unwrap();

        assert_eq!(outcome.sent, vec![good.id]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, bad.id);
        assert!(outcome.failures[0].1.contains("mailbox full"));

        // the successful send was stamped, the failed one untouched
        let stamped = store
            .snapshot(|tx| Ok(tx.submission(good.id)))
            .unwrap()
            .unwrap();
        assert_eq!(stamped.last_reminder_sent_at, Some(now));
        let untouched = store
            .snapshot(|tx| Ok(tx.submission(bad.id)))
            .unwrap()
            .unwrap();
        assert!(untouched.last_reminder_sent_at.is_none());
    }

    #[test]
    fn test_sweep_reports_missing_roster() {
        let store = MemoryStore::new();
        let submission = pending_recipient("sheet-x");
        store
            .transaction(Isolation::ReadCommitted, |tx| {
                tx.put_submission(submission.clone());
                Ok(())
            })
            .unwrap();

        let notifier = FlakyNotifier {
            fail_group: String::new(),
            sent: Mutex::new(Vec::new()),
        };
        let now = created_at() + Duration::days(3);
        let outcome = sweep_reminders(&store, &notifier, &[], now, cooldown()).unwrap();

        assert!(outcome.sent.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].1.contains("no roster"));
    }
}
