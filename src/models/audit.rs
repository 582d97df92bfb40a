//! Append-only audit log entries.
//!
//! One entry is written per state-changing action, inside the same
//! transaction as the change it describes. Entries are never mutated or
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// An immutable record of one state-changing action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// The worker — or, for submission-level actions, the sheet key —
    /// whose records were changed.
    pub worker_id: String,
    /// When the change was recorded.
    pub at: DateTime<Utc>,
    /// Who performed the change.
    pub actor: String,
    /// Action tag, e.g. "timesheet.confirm" or "submission.withdraw".
    pub action: String,
    /// Snapshot of the relevant state before the change.
    pub old_value: Value,
    /// Snapshot of the relevant state after the change.
    pub new_value: Value,
}

impl AuditLogEntry {
    /// Creates a new audit entry.
    pub fn new(
        worker_id: impl Into<String>,
        at: DateTime<Utc>,
        actor: impl Into<String>,
        action: impl Into<String>,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            worker_id: worker_id.into(),
            at,
            actor: actor.into(),
            action: action.into(),
            old_value,
            new_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_entry_carries_old_and_new_snapshots() {
        let at = Utc.with_ymd_and_hms(2025, 3, 31, 9, 0, 0).unwrap();
        let entry = AuditLogEntry::new(
            "w1",
            at,
            "w1",
            "timesheet.confirm",
            json!({"status": "planned"}),
            json!({"status": "confirmed"}),
        );

        assert_eq!(entry.worker_id, "w1");
        assert_eq!(entry.action, "timesheet.confirm");
        assert_eq!(entry.old_value["status"], "planned");
        assert_eq!(entry.new_value["status"], "confirmed");
    }

    #[test]
    fn test_entry_serializes() {
        let at = Utc.with_ymd_and_hms(2025, 3, 31, 9, 0, 0).unwrap();
        let entry = AuditLogEntry::new("w1", at, "admin", "month.submit", json!(null), json!(7));
        let json = serde_json::to_string(&entry).unwrap();
        let back: AuditLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
