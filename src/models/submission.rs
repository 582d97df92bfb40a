//! Monthly team submission and signature records.
//!
//! A submission aggregates one sheet's timesheets for one calendar month and
//! carries them through the employee-signature phase, the recipient phase and
//! completion. Exactly one submission exists per (group, month, year).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a submission: one sheet, one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionKey {
    /// The sheet/group key shared by the aggregated timesheets.
    pub group: String,
    /// Calendar month (1-12).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

impl std::fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:02}/{}", self.group, self.month, self.year)
    }
}

/// Workflow phase of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Workers of the sheet still need to sign.
    PendingEmployees,
    /// All required workers signed; awaiting the care recipient.
    PendingRecipient,
    /// The recipient signed; terminal and immutable.
    Completed,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionStatus::PendingEmployees => "pending_employees",
            SubmissionStatus::PendingRecipient => "pending_recipient",
            SubmissionStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// One worker's signature on one submission.
///
/// Unique per (worker, submission); enforced by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSignature {
    /// The signing worker.
    pub worker_id: String,
    /// The signed submission.
    pub submission_id: Uuid,
    /// When the signature was recorded.
    pub signed_at: DateTime<Utc>,
}

/// The care recipient's final signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSignature {
    /// The signature image, base64 encoded.
    pub image: String,
    /// When the recipient signed.
    pub signed_at: DateTime<Utc>,
    /// Network address the signature request originated from.
    pub origin: String,
}

/// Single-use signed-link token for the recipient phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningToken {
    /// The token value embedded in the signing link.
    pub token: Uuid,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

impl SigningToken {
    /// Returns true once the token may no longer be used.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// One sheet's claim for one month, tracking its signature phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSubmission {
    /// Unique identifier.
    pub id: Uuid,
    /// Sheet and calendar month this submission covers.
    pub key: SubmissionKey,
    /// Workflow phase.
    pub status: SubmissionStatus,
    /// The recipient's signature; present implies `Completed`.
    pub recipient_signature: Option<RecipientSignature>,
    /// Signing token minted when entering the recipient phase.
    pub token: Option<SigningToken>,
    /// When the submission was created (first employee signature).
    pub created_at: DateTime<Utc>,
    /// When the last reminder was sent to the recipient.
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
    /// Reference to the generated document, set once finalized.
    pub document_ref: Option<String>,
}

impl TeamSubmission {
    /// Creates a new submission in the employee-signature phase.
    pub fn new(key: SubmissionKey, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            status: SubmissionStatus::PendingEmployees,
            recipient_signature: None,
            token: None,
            created_at,
            last_reminder_sent_at: None,
            document_ref: None,
        }
    }

    /// Returns true once the submission is terminal.
    pub fn is_completed(&self) -> bool {
        self.status == SubmissionStatus::Completed
    }
}

/// The required worker set and recipient contact for one sheet.
///
/// This is an explicit input to the signing workflow: completeness of the
/// employee phase is always judged against the roster handed in, never
/// inferred from whichever workers happen to have signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRoster {
    /// The sheet/group key.
    pub group: String,
    /// Workers whose signatures are required.
    pub required_workers: Vec<String>,
    /// Care recipient display name.
    pub recipient_name: String,
    /// Care recipient contact address for the signing link.
    pub recipient_email: String,
}

impl GroupRoster {
    /// Returns true when every required worker appears in `signed`.
    ///
    /// An empty required set is vacuously complete.
    pub fn is_complete(&self, signed: &[String]) -> bool {
        self.required_workers
            .iter()
            .all(|required| signed.iter().any(|s| s == required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key() -> SubmissionKey {
        SubmissionKey {
            group: "sheet-a".to_string(),
            month: 3,
            year: 2025,
        }
    }

    #[test]
    fn test_new_submission_starts_pending_employees() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let submission = TeamSubmission::new(key(), now);
        assert_eq!(submission.status, SubmissionStatus::PendingEmployees);
        assert!(submission.recipient_signature.is_none());
        assert!(submission.token.is_none());
        assert!(!submission.is_completed());
    }

    #[test]
    fn test_token_expiry() {
        let minted = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let token = SigningToken {
            token: Uuid::new_v4(),
            expires_at: minted + chrono::Duration::days(14),
        };
        assert!(!token.is_expired(minted + chrono::Duration::days(13)));
        assert!(token.is_expired(minted + chrono::Duration::days(14)));
    }

    #[test]
    fn test_roster_completeness_is_subset_check() {
        let roster = GroupRoster {
            group: "sheet-a".to_string(),
            required_workers: vec!["w1".to_string(), "w2".to_string()],
            recipient_name: "K. Recipient".to_string(),
            recipient_email: "recipient@example.org".to_string(),
        };

        assert!(!roster.is_complete(&["w1".to_string()]));
        assert!(roster.is_complete(&["w2".to_string(), "w1".to_string()]));
        // extra signers do not break completeness
        assert!(roster.is_complete(&[
            "w1".to_string(),
            "w2".to_string(),
            "backup".to_string()
        ]));
    }

    #[test]
    fn test_empty_roster_is_vacuously_complete() {
        let roster = GroupRoster {
            group: "sheet-a".to_string(),
            required_workers: vec![],
            recipient_name: "K. Recipient".to_string(),
            recipient_email: "recipient@example.org".to_string(),
        };
        assert!(roster.is_complete(&[]));
    }

    #[test]
    fn test_submission_key_display() {
        assert_eq!(key().to_string(), "sheet-a 03/2025");
    }
}
