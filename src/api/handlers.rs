//! HTTP request handlers for the timesheet engine API.
//!
//! Every handler validates its JSON payload, delegates to the workflow or
//! payroll layer with "now" taken at the boundary, and maps engine errors
//! to the stable error codes in the response module. Handlers that change
//! a worker's month invalidate the affected pay report cache entries.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Role, Worker};
use crate::payroll::{FixedHolidayCalendar, MonthPayReport, compute_month_pay};
use crate::workflow::store::{Isolation, RecordStore, StoreTx};
use crate::workflow::{
    change_timesheet, confirm_timesheet, create_timesheet, delete_timesheet, sign_as_employee,
    sign_as_recipient, submit_month, sweep_reminders, withdraw_signature,
};

use super::request::{
    ChangeTimesheetRequest, ConfirmTimesheetRequest, CreateTimesheetRequest,
    DeleteTimesheetRequest, PayReportRequest, SignEmployeeRequest, SignRecipientRequest,
    SubmitMonthRequest, SweepRequest, UpsertWorkerRequest, WithdrawRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: RecordStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/workers", post(upsert_worker_handler::<S>))
        .route("/timesheets", post(create_timesheet_handler::<S>))
        .route(
            "/timesheets/:id/confirm",
            post(confirm_timesheet_handler::<S>),
        )
        .route(
            "/timesheets/:id/change",
            post(change_timesheet_handler::<S>),
        )
        .route("/timesheets/:id", delete(delete_timesheet_handler::<S>))
        .route("/months/submit", post(submit_month_handler::<S>))
        .route(
            "/submissions/sign-employee",
            post(sign_employee_handler::<S>),
        )
        .route(
            "/submissions/sign-recipient",
            post(sign_recipient_handler::<S>),
        )
        .route("/submissions/withdraw", post(withdraw_handler::<S>))
        .route("/reports/pay", post(pay_report_handler::<S>))
        .route("/reminders/sweep", post(sweep_handler::<S>))
        .with_state(state)
}

/// Converts a JSON extraction rejection into the error response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            "MISSING_CONTENT_TYPE",
            "Content-Type must be application/json",
        ),
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

/// Logs and converts an engine error.
fn error_response(correlation_id: Uuid, error: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        code = error.code(),
        error = %error,
        "Request failed"
    );
    ApiErrorResponse::from(error).into_response()
}

async fn upsert_worker_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<UpsertWorkerRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if request.actor.role != Role::Admin {
        return error_response(
            correlation_id,
            EngineError::NotPermitted {
                actor: request.actor.id,
            },
        );
    }

    let worker = request.worker;
    let result = state.store().transaction(Isolation::ReadCommitted, |tx| {
        tx.put_worker(worker.clone());
        Ok(())
    });
    match result {
        Ok(()) => {
            info!(correlation_id = %correlation_id, worker_id = %worker.id, "Worker stored");
            state
                .reports()
                .invalidate_prefix(&format!("pay:{}:", worker.id));
            Json(worker).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn create_timesheet_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTimesheetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match create_timesheet(
        state.store(),
        &request.actor,
        &request.worker_id,
        &request.group,
        request.date,
        request.planned_start,
        request.planned_end,
        Utc::now(),
    ) {
        Ok(sheet) => {
            state
                .reports()
                .invalidate_prefix(&format!("pay:{}:", sheet.worker_id));
            (StatusCode::CREATED, Json(sheet)).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn confirm_timesheet_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ConfirmTimesheetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match confirm_timesheet(state.store(), &request.actor, id, Utc::now()) {
        Ok(sheet) => {
            state
                .reports()
                .invalidate_prefix(&format!("pay:{}:", sheet.worker_id));
            Json(sheet).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn change_timesheet_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ChangeTimesheetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let actor = request.actor.clone();
    match change_timesheet(state.store(), &actor, id, request.into(), Utc::now()) {
        Ok(sheet) => {
            state
                .reports()
                .invalidate_prefix(&format!("pay:{}:", sheet.worker_id));
            Json(sheet).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn delete_timesheet_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DeleteTimesheetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match delete_timesheet(state.store(), &request.actor, id, Utc::now()) {
        Ok(()) => {
            state.reports().invalidate_prefix("pay:");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn submit_month_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SubmitMonthRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match submit_month(
        state.store(),
        &request.actor,
        &request.worker_id,
        request.month,
        request.year,
        Utc::now(),
    ) {
        Ok(submitted) => {
            state
                .reports()
                .invalidate_prefix(&format!("pay:{}:", request.worker_id));
            Json(json!({ "submitted": submitted })).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn sign_employee_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SignEmployeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match sign_as_employee(
        state.store(),
        state.notifier(),
        &request.actor,
        &request.roster,
        request.month,
        request.year,
        state.config().token_ttl,
        Utc::now(),
    ) {
        Ok(submission) => Json(submission).into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

async fn sign_recipient_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SignRecipientRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match sign_as_recipient(
        state.store(),
        state.documents(),
        request.token,
        request.image,
        request.origin,
        Utc::now(),
    ) {
        Ok(submission) => {
            // completion changed every worker on the sheet
            state.reports().invalidate_prefix("pay:");
            Json(submission).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn withdraw_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match withdraw_signature(
        state.store(),
        &request.actor,
        request.month,
        request.year,
        Utc::now(),
    ) {
        Ok(submission) => {
            state
                .reports()
                .invalidate_prefix(&format!("pay:{}:", request.actor.id));
            Json(submission).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

async fn pay_report_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<PayReportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let workers: Result<Vec<Worker>, EngineError> = state.store().snapshot(|tx| {
        Ok(match &request.worker_id {
            Some(id) => tx.worker(id).into_iter().collect(),
            None => tx.workers(),
        })
    });
    let workers = match workers {
        Ok(workers) => workers,
        Err(err) => return error_response(correlation_id, err),
    };
    if let Some(id) = &request.worker_id {
        if workers.is_empty() {
            return error_response(
                correlation_id,
                EngineError::WorkerNotFound { id: id.clone() },
            );
        }
    }

    let calendar = FixedHolidayCalendar::new(request.holidays.iter().copied());
    let holidays_key = request
        .holidays
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut reports: Vec<MonthPayReport> = Vec::with_capacity(workers.len());
    for worker in &workers {
        let cache_key = format!(
            "pay:{}:{}-{:02}:{}",
            worker.id, request.year, request.month, holidays_key
        );
        let report = state.reports().get_or_compute(&cache_key, || {
            let timesheets = state.store().snapshot(|tx| {
                Ok(tx.timesheets_for_worker_month(&worker.id, request.month, request.year))
            })?;
            compute_month_pay(
                worker,
                &timesheets,
                request.month,
                request.year,
                &state.config().night_window,
                &calendar,
                state.config().stacking,
            )
        });
        match report {
            Ok(report) => reports.push(report),
            Err(err) => return error_response(correlation_id, err),
        }
    }

    info!(
        correlation_id = %correlation_id,
        workers = reports.len(),
        month = request.month,
        year = request.year,
        "Pay report computed"
    );
    Json(reports).into_response()
}

async fn sweep_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SweepRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match sweep_reminders(
        state.store(),
        state.notifier(),
        &request.rosters,
        Utc::now(),
        state.config().reminder_cooldown,
    ) {
        Ok(outcome) => {
            let failures: Vec<serde_json::Value> = outcome
                .failures
                .iter()
                .map(|(id, message)| json!({ "submission_id": id, "error": message }))
                .collect();
            Json(json!({ "sent": outcome.sent, "failures": failures })).into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}
