//! HTTP facade for the timesheet engine.
//!
//! Exposes the workflow and payroll operations as JSON endpoints. The
//! facade does no authentication; actor identity and role arrive
//! pre-validated from the external authorization layer.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ChangeTimesheetRequest, ConfirmTimesheetRequest, CreateTimesheetRequest,
    DeleteTimesheetRequest, PayReportRequest, SignEmployeeRequest, SignRecipientRequest,
    SubmitMonthRequest, SweepRequest, UpsertWorkerRequest, WithdrawRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
