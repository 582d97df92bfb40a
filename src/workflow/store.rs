//! Transactional record store interface.
//!
//! The engine consumes storage through the [`RecordStore`] trait: read-only
//! snapshots and atomic transactions over typed record accessors. Bulk
//! status transitions and the conditional submission-status update report
//! how many rows they matched, so workflow operations can detect lost races
//! instead of silently overwriting concurrent changes.
//!
//! [`MemoryStore`] is the in-process implementation used by tests, benches
//! and the default application state: a transaction runs against a copy of
//! the state and commits by swapping it in, so an aborted transaction leaves
//! no partial effect. Serializable isolation degenerates to mutual
//! exclusion here; a SQL-backed implementation would map it to the
//! corresponding isolation level.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditLogEntry, EmployeeSignature, SubmissionKey, SubmissionStatus, TeamSubmission, Timesheet,
    TimesheetStatus, Worker,
};

/// Transaction isolation requested from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// Plain atomicity; no protection against concurrent re-reads.
    ReadCommitted,
    /// Full serializability; required by every operation that re-validates
    /// a precondition inside the transaction.
    Serializable,
}

/// Typed record accessors available inside a snapshot or transaction.
pub trait StoreTx {
    /// Looks up a worker by id.
    fn worker(&self, id: &str) -> Option<Worker>;
    /// Inserts or replaces a worker.
    fn put_worker(&mut self, worker: Worker);
    /// Returns all workers.
    fn workers(&self) -> Vec<Worker>;

    /// Looks up a timesheet by id.
    fn timesheet(&self, id: Uuid) -> Option<Timesheet>;
    /// Inserts or replaces a timesheet.
    fn put_timesheet(&mut self, sheet: Timesheet);
    /// Deletes a timesheet; returns false when it did not exist.
    fn delete_timesheet(&mut self, id: Uuid) -> bool;
    /// All timesheets of one worker in one month, ordered by date.
    fn timesheets_for_worker_month(&self, worker_id: &str, month: u32, year: i32)
    -> Vec<Timesheet>;
    /// All timesheets of one sheet/group in one month, ordered by date.
    fn timesheets_for_group_month(&self, group: &str, month: u32, year: i32) -> Vec<Timesheet>;
    /// Moves every timesheet of the worker's month whose status is in `from`
    /// to `to` as one bulk write. Returns the number of rows changed.
    fn update_timesheet_status_bulk(
        &mut self,
        worker_id: &str,
        month: u32,
        year: i32,
        from: &[TimesheetStatus],
        to: TimesheetStatus,
        modified_by: &str,
        at: DateTime<Utc>,
    ) -> usize;
    /// Same bulk transition keyed by sheet/group instead of worker.
    fn update_group_status_bulk(
        &mut self,
        group: &str,
        month: u32,
        year: i32,
        from: &[TimesheetStatus],
        to: TimesheetStatus,
        modified_by: &str,
        at: DateTime<Utc>,
    ) -> usize;

    /// Looks up a submission by id.
    fn submission(&self, id: Uuid) -> Option<TeamSubmission>;
    /// Looks up the unique submission for a sheet/month.
    fn submission_by_key(&self, key: &SubmissionKey) -> Option<TeamSubmission>;
    /// Looks up a submission by its signing token.
    fn submission_by_token(&self, token: Uuid) -> Option<TeamSubmission>;
    /// Returns all submissions.
    fn submissions(&self) -> Vec<TeamSubmission>;
    /// Inserts or replaces a submission.
    fn put_submission(&mut self, submission: TeamSubmission);
    /// Sets the submission's status to `to` only if its current status is in
    /// `expected`. Returns the number of rows changed (0 or 1); zero means
    /// a concurrent request changed the submission first.
    fn update_submission_status_if(
        &mut self,
        id: Uuid,
        expected: &[SubmissionStatus],
        to: SubmissionStatus,
    ) -> usize;

    /// Looks up one worker's signature on one submission.
    fn signature(&self, worker_id: &str, submission_id: Uuid) -> Option<EmployeeSignature>;
    /// All signatures on a submission.
    fn signatures_for_submission(&self, submission_id: Uuid) -> Vec<EmployeeSignature>;
    /// Inserts a signature; returns false (and writes nothing) when the
    /// (worker, submission) pair already has one.
    fn insert_signature(&mut self, signature: EmployeeSignature) -> bool;
    /// Deletes a signature; returns false when none existed.
    fn delete_signature(&mut self, worker_id: &str, submission_id: Uuid) -> bool;

    /// Appends an audit entry. Entries are never mutated or deleted.
    fn append_audit(&mut self, entry: AuditLogEntry);
    /// All audit entries for a subject, oldest first.
    fn audit_for_subject(&self, subject: &str) -> Vec<AuditLogEntry>;
}

/// The transactional record store consumed by the workflow.
pub trait RecordStore: Send + Sync {
    /// Runs a read-only closure against a consistent view of the store.
    fn snapshot<T>(&self, read: impl FnOnce(&dyn StoreTx) -> EngineResult<T>) -> EngineResult<T>;

    /// Runs a closure atomically: either every write commits or none does.
    /// Returning an error aborts the transaction with full rollback.
    fn transaction<T>(
        &self,
        isolation: Isolation,
        write: impl FnOnce(&mut dyn StoreTx) -> EngineResult<T>,
    ) -> EngineResult<T>;
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    workers: HashMap<String, Worker>,
    timesheets: HashMap<Uuid, Timesheet>,
    submissions: HashMap<Uuid, TeamSubmission>,
    signatures: HashMap<(String, Uuid), EmployeeSignature>,
    audit: Vec<AuditLogEntry>,
}

impl StoreTx for StoreState {
    fn worker(&self, id: &str) -> Option<Worker> {
        self.workers.get(id).cloned()
    }

    fn put_worker(&mut self, worker: Worker) {
        self.workers.insert(worker.id.clone(), worker);
    }

    fn workers(&self) -> Vec<Worker> {
        let mut all: Vec<Worker> = self.workers.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    fn timesheet(&self, id: Uuid) -> Option<Timesheet> {
        self.timesheets.get(&id).cloned()
    }

    fn put_timesheet(&mut self, sheet: Timesheet) {
        self.timesheets.insert(sheet.id, sheet);
    }

    fn delete_timesheet(&mut self, id: Uuid) -> bool {
        self.timesheets.remove(&id).is_some()
    }

    fn timesheets_for_worker_month(
        &self,
        worker_id: &str,
        month: u32,
        year: i32,
    ) -> Vec<Timesheet> {
        let mut sheets: Vec<Timesheet> = self
            .timesheets
            .values()
            .filter(|t| t.worker_id == worker_id && t.month == month && t.year == year)
            .cloned()
            .collect();
        sheets.sort_by_key(|t| t.date);
        sheets
    }

    fn timesheets_for_group_month(&self, group: &str, month: u32, year: i32) -> Vec<Timesheet> {
        let mut sheets: Vec<Timesheet> = self
            .timesheets
            .values()
            .filter(|t| t.group == group && t.month == month && t.year == year)
            .cloned()
            .collect();
        sheets.sort_by_key(|t| t.date);
        sheets
    }

    fn update_timesheet_status_bulk(
        &mut self,
        worker_id: &str,
        month: u32,
        year: i32,
        from: &[TimesheetStatus],
        to: TimesheetStatus,
        modified_by: &str,
        at: DateTime<Utc>,
    ) -> usize {
        let mut changed = 0;
        for sheet in self.timesheets.values_mut() {
            if sheet.worker_id == worker_id
                && sheet.month == month
                && sheet.year == year
                && from.contains(&sheet.status)
            {
                sheet.status = to;
                sheet.modified_by = Some(modified_by.to_string());
                sheet.modified_at = Some(at);
                changed += 1;
            }
        }
        changed
    }

    fn update_group_status_bulk(
        &mut self,
        group: &str,
        month: u32,
        year: i32,
        from: &[TimesheetStatus],
        to: TimesheetStatus,
        modified_by: &str,
        at: DateTime<Utc>,
    ) -> usize {
        let mut changed = 0;
        for sheet in self.timesheets.values_mut() {
            if sheet.group == group
                && sheet.month == month
                && sheet.year == year
                && from.contains(&sheet.status)
            {
                sheet.status = to;
                sheet.modified_by = Some(modified_by.to_string());
                sheet.modified_at = Some(at);
                changed += 1;
            }
        }
        changed
    }

    fn submission(&self, id: Uuid) -> Option<TeamSubmission> {
        self.submissions.get(&id).cloned()
    }

    fn submission_by_key(&self, key: &SubmissionKey) -> Option<TeamSubmission> {
        self.submissions.values().find(|s| &s.key == key).cloned()
    }

    fn submission_by_token(&self, token: Uuid) -> Option<TeamSubmission> {
        self.submissions
            .values()
            .find(|s| s.token.is_some_and(|t| t.token == token))
            .cloned()
    }

    fn submissions(&self) -> Vec<TeamSubmission> {
        let mut all: Vec<TeamSubmission> = self.submissions.values().cloned().collect();
        all.sort_by_key(|s| s.created_at);
        all
    }

    fn put_submission(&mut self, submission: TeamSubmission) {
        self.submissions.insert(submission.id, submission);
    }

    fn update_submission_status_if(
        &mut self,
        id: Uuid,
        expected: &[SubmissionStatus],
        to: SubmissionStatus,
    ) -> usize {
        match self.submissions.get_mut(&id) {
            Some(submission) if expected.contains(&submission.status) => {
                submission.status = to;
                1
            }
            _ => 0,
        }
    }

    fn signature(&self, worker_id: &str, submission_id: Uuid) -> Option<EmployeeSignature> {
        self.signatures
            .get(&(worker_id.to_string(), submission_id))
            .cloned()
    }

    fn signatures_for_submission(&self, submission_id: Uuid) -> Vec<EmployeeSignature> {
        let mut sigs: Vec<EmployeeSignature> = self
            .signatures
            .values()
            .filter(|s| s.submission_id == submission_id)
            .cloned()
            .collect();
        sigs.sort_by_key(|s| s.signed_at);
        sigs
    }

    fn insert_signature(&mut self, signature: EmployeeSignature) -> bool {
        let key = (signature.worker_id.clone(), signature.submission_id);
        if self.signatures.contains_key(&key) {
            return false;
        }
        self.signatures.insert(key, signature);
        true
    }

    fn delete_signature(&mut self, worker_id: &str, submission_id: Uuid) -> bool {
        self.signatures
            .remove(&(worker_id.to_string(), submission_id))
            .is_some()
    }

    fn append_audit(&mut self, entry: AuditLogEntry) {
        self.audit.push(entry);
    }

    fn audit_for_subject(&self, subject: &str) -> Vec<AuditLogEntry> {
        self.audit
            .iter()
            .filter(|e| e.worker_id == subject)
            .cloned()
            .collect()
    }
}

/// In-process store with copy-on-write transactions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn snapshot<T>(&self, read: impl FnOnce(&dyn StoreTx) -> EngineResult<T>) -> EngineResult<T> {
        let guard = self.state.lock().map_err(|_| EngineError::Store {
            message: "store mutex poisoned".to_string(),
        })?;
        read(&*guard)
    }

    fn transaction<T>(
        &self,
        _isolation: Isolation,
        write: impl FnOnce(&mut dyn StoreTx) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut guard = self.state.lock().map_err(|_| EngineError::Store {
            message: "store mutex poisoned".to_string(),
        })?;
        let mut working = guard.clone();
        match write(&mut working) {
            Ok(value) => {
                *guard = working;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }
}
