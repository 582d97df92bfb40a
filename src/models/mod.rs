//! Domain models for the timesheet engine.
//!
//! This module contains the core data types: timesheets (one worker's day),
//! workers and their wage profiles, monthly team submissions with their
//! signature records, and the append-only audit log.

mod audit;
mod submission;
mod timesheet;
mod worker;

pub use audit::AuditLogEntry;
pub use submission::{
    EmployeeSignature, GroupRoster, RecipientSignature, SigningToken, SubmissionKey,
    SubmissionStatus, TeamSubmission,
};
pub use timesheet::{AbsenceKind, Timesheet, TimesheetStatus};
pub use worker::{Actor, Role, SurchargeRule, WageProfile, Worker};
