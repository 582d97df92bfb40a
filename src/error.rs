//! Error types for the timesheet engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur in the shift lifecycle, the
//! submission workflow and the premium computation engine.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the timesheet engine.
///
/// All operations in the engine return this error type. Workflow conflicts
/// (`RecipientAlreadySigned`, `SubmissionCompleted`, `StatusChanged`) are
/// dedicated variants so callers can tell the user *why* an operation was
/// rejected instead of receiving a generic failure.
///
/// # Example
///
/// ```
/// use timesheet_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A wall-clock time string was not a valid "HH:MM" value.
    #[error("Invalid clock time: '{value}'")]
    InvalidClockTime {
        /// The rejected input string.
        value: String,
    },

    /// A month number outside 1..=12 was supplied.
    #[error("Invalid month: {month}")]
    InvalidMonth {
        /// The rejected month number.
        month: u32,
    },

    /// A request failed validation before any write was attempted.
    #[error("Validation failed: {message}")]
    Validation {
        /// A description of what was invalid.
        message: String,
    },

    /// No worker record exists for the given id.
    #[error("Worker not found: {id}")]
    WorkerNotFound {
        /// The worker id that was not found.
        id: String,
    },

    /// No timesheet record exists for the given id.
    #[error("Timesheet not found: {id}")]
    TimesheetNotFound {
        /// The timesheet id that was not found.
        id: Uuid,
    },

    /// No submission exists for the given sheet/month/year.
    #[error("Submission not found for sheet '{group}' {month:02}/{year}")]
    SubmissionNotFound {
        /// The submission's group key.
        group: String,
        /// The month of the submission.
        month: u32,
        /// The year of the submission.
        year: i32,
    },

    /// The acting worker has no signature on the submission.
    #[error("No signature by worker '{worker}' on this submission")]
    SignatureNotFound {
        /// The worker whose signature was looked up.
        worker: String,
    },

    /// The acting user may not perform this operation on the target record.
    #[error("Worker '{actor}' may not modify this record")]
    NotPermitted {
        /// The acting worker id.
        actor: String,
    },

    /// A timesheet is in a status that no longer accepts this mutation.
    #[error("Timesheet {id} is locked in status {status}")]
    TimesheetLocked {
        /// The timesheet id.
        id: Uuid,
        /// The status that blocks the mutation.
        status: String,
    },

    /// Monthly submit was attempted while planned shifts remain unconfirmed.
    #[error("{count} planned shift(s) not yet confirmed or changed")]
    UnconfirmedShifts {
        /// How many shifts are still in planned status.
        count: usize,
    },

    /// The care recipient has already signed; the submission can no longer
    /// be altered by employees.
    #[error("Recipient has already signed this submission")]
    RecipientAlreadySigned,

    /// The submission is completed and immutable.
    #[error("Submission is already completed")]
    SubmissionCompleted,

    /// A conditional update matched zero rows: another request changed the
    /// submission concurrently and the operation was rolled back.
    #[error("Submission status changed concurrently")]
    StatusChanged,

    /// The signing token does not match any open submission.
    #[error("Unknown or already used signing token")]
    TokenInvalid,

    /// The signing token has expired.
    #[error("Signing token expired at {expired_at}")]
    TokenExpired {
        /// When the token expired.
        expired_at: chrono::DateTime<chrono::Utc>,
    },

    /// A reminder or invitation could not be delivered.
    #[error("Notification delivery failed: {message}")]
    NotificationFailed {
        /// A description of the delivery failure.
        message: String,
    },

    /// Document generation for a completed submission failed.
    #[error("Document generation failed: {message}")]
    DocumentFailed {
        /// A description of the generation failure.
        message: String,
    },

    /// An unexpected record-store failure.
    #[error("Record store error: {message}")]
    Store {
        /// A description of the store failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the stable machine-readable code for this error.
    ///
    /// Conflict codes are part of the API contract: clients branch on them
    /// to explain rejected workflow operations to the user.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            EngineError::InvalidClockTime { .. } => "INVALID_TIME",
            EngineError::InvalidMonth { .. } => "INVALID_MONTH",
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::WorkerNotFound { .. } => "WORKER_NOT_FOUND",
            EngineError::TimesheetNotFound { .. } => "TIMESHEET_NOT_FOUND",
            EngineError::SubmissionNotFound { .. } => "SUBMISSION_NOT_FOUND",
            EngineError::SignatureNotFound { .. } => "SIGNATURE_NOT_FOUND",
            EngineError::NotPermitted { .. } => "NOT_PERMITTED",
            EngineError::TimesheetLocked { .. } => "TIMESHEET_LOCKED",
            EngineError::UnconfirmedShifts { .. } => "UNCONFIRMED_SHIFTS",
            EngineError::RecipientAlreadySigned => "RECIPIENT_ALREADY_SIGNED",
            EngineError::SubmissionCompleted => "SUBMISSION_COMPLETED",
            EngineError::StatusChanged => "STATUS_CHANGED",
            EngineError::TokenInvalid => "TOKEN_INVALID",
            EngineError::TokenExpired { .. } => "TOKEN_EXPIRED",
            EngineError::NotificationFailed { .. } => "NOTIFICATION_FAILED",
            EngineError::DocumentFailed { .. } => "DOCUMENT_FAILED",
            EngineError::Store { .. } => "STORE_ERROR",
        }
    }

    /// Returns true for precondition-conflict errors that indicate the
    /// operation lost a race rather than being malformed.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::RecipientAlreadySigned
                | EngineError::SubmissionCompleted
                | EngineError::StatusChanged
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
