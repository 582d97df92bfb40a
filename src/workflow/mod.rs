//! Shift lifecycle and submission signature workflow.
//!
//! Operations in this module are triggered by independent inbound requests
//! and must stay correct under arbitrary interleavings. Correctness comes
//! from the record store's transactional isolation and row-count-aware
//! conditional writes, never from in-memory locks: every operation that
//! reads a precondition and writes based on it re-validates the
//! precondition inside the same transaction as the write.

pub mod store;

mod reminder;
mod shift_ops;
mod signing;
mod withdraw;

pub use reminder::{DEFAULT_REMINDER_COOLDOWN_DAYS, SweepOutcome, is_reminder_due, sweep_reminders};
pub use shift_ops::{
    ShiftChange, change_timesheet, confirm_timesheet, create_timesheet, delete_timesheet,
    submit_month,
};
pub use signing::{sign_as_employee, sign_as_recipient};
pub use withdraw::withdraw_signature;

use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{TeamSubmission, Timesheet};

/// Sends reminder and invitation mails; provided by the caller.
///
/// Delivery failures are reported per call and never roll back the workflow
/// state that triggered them.
pub trait NotificationSender: Send + Sync {
    /// Asks the recipient to sign, with a single-use link token.
    fn send_signing_request(
        &self,
        recipient_name: &str,
        recipient_email: &str,
        submission: &TeamSubmission,
        token: Uuid,
    ) -> EngineResult<()>;
}

/// Produces the archived document for a completed submission.
///
/// Invoked once, after completion committed, outside the completing
/// transaction. Returns a reference to the persisted artifact.
pub trait DocumentGenerator: Send + Sync {
    /// Generates the document and returns its reference.
    fn generate(
        &self,
        submission: &TeamSubmission,
        timesheets: &[Timesheet],
    ) -> EngineResult<String>;
}
