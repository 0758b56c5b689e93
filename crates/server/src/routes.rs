// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP endpoints.
//!
//! Mutating handlers take the employee's lock first, then the store, and
//! hold both until the transition is committed. Reads take only the store
//! and never wait on an employee's lock. Every wait ends in `busy` once the
//! lock timeout runs out.

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::Date;
use tokio::sync::{MutexGuard, OwnedMutexGuard};
use tracing::info;
use vacation_ledger_api::{
    AddDaysRequest, AdjustmentResponse, AdvanceRequestStatusesResponse, ApproveRequestRequest,
    AuditTimelineResponse, BalanceResponse, CancelRequestRequest, CancelRequestResponse,
    CancellationPreviewResponse, CreateVacationRequest, EmployeeInfo, EnsureCyclesResponse,
    ListCyclesResponse, ListRequestsResponse, RegisterEmployeeRequest, RegisterEmployeeResponse,
    RejectRequestRequest, RemoveDaysRequest, VacationRequestResponse, add_days,
    advance_request_statuses, approve_request, cancel_request, create_request,
    employee_for_request, ensure_cycles_up_to_date, get_audit_timeline, get_balance,
    get_employee, list_cycles, list_employees, list_requests_for_employee,
    list_requests_for_office, preview_cancellation, register_employee, reject_request,
    remove_days,
};
use vacation_ledger_persistence::SqlitePersistence;

use crate::AppState;
use crate::error::HttpError;
use crate::operator::{Operator, resolve_as_of};

/// Query parameters for date-dependent reads.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// ISO date; defaults to today in UTC.
    as_of: Option<String>,
}

impl AsOfQuery {
    fn date(&self) -> Result<Date, HttpError> {
        Ok(resolve_as_of(self.as_of.as_deref())?)
    }
}

/// API response for listing employees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEmployeesResponse {
    /// Every employee in the directory.
    pub employees: Vec<EmployeeInfo>,
}

/// Looks up which employee owns a request, so its lock can be taken.
async fn owner_of_request(app_state: &AppState, request_id: i64) -> Result<i64, HttpError> {
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    Ok(employee_for_request(&mut persistence, request_id)?)
}

// ============================================================================
// Employees and cycles
// ============================================================================

/// Handler for POST `/employees`.
async fn handle_register_employee(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterEmployeeRequest>,
) -> Result<Json<RegisterEmployeeResponse>, HttpError> {
    info!(office_id = req.office_id, "Handling register_employee request");

    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let response: RegisterEmployeeResponse = register_employee(&mut persistence, req)?;
    drop(persistence);

    info!(
        employee_id = response.employee.employee_id,
        "Successfully registered employee"
    );
    Ok(Json(response))
}

/// Handler for GET `/employees`.
async fn handle_list_employees(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListEmployeesResponse>, HttpError> {
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let employees: Vec<EmployeeInfo> = list_employees(&mut persistence)?;
    drop(persistence);

    Ok(Json(ListEmployeesResponse { employees }))
}

/// Handler for GET `/employees/{id}`.
async fn handle_get_employee(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
) -> Result<Json<EmployeeInfo>, HttpError> {
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let employee: EmployeeInfo = get_employee(&mut persistence, employee_id)?;
    drop(persistence);

    Ok(Json(employee))
}

/// Handler for POST `/employees/{id}/cycles/ensure`.
///
/// Creates the cycles whose anniversaries have passed and flags expired ones.
async fn handle_ensure_cycles(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Operator(ctx): Operator,
) -> Result<Json<EnsureCyclesResponse>, HttpError> {
    info!(employee_id, actor_id = %ctx.actor.id, "Handling ensure_cycles request");

    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: EnsureCyclesResponse =
        ensure_cycles_up_to_date(&mut persistence, employee_id, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

/// Handler for GET `/employees/{id}/cycles`.
///
/// Never creates cycles.
async fn handle_list_cycles(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ListCyclesResponse>, HttpError> {
    let as_of: Date = query.date()?;
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let response: ListCyclesResponse = list_cycles(&mut persistence, employee_id, as_of)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/employees/{id}/balance`.
async fn handle_get_balance(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<BalanceResponse>, HttpError> {
    let as_of: Date = query.date()?;
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let response: BalanceResponse = get_balance(&mut persistence, employee_id, as_of)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Requests
// ============================================================================

/// Handler for GET `/employees/{id}/requests`.
async fn handle_list_employee_requests(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
) -> Result<Json<ListRequestsResponse>, HttpError> {
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let response: ListRequestsResponse = list_requests_for_employee(&mut persistence, employee_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/offices/{id}/requests`.
async fn handle_list_office_requests(
    AxumState(app_state): AxumState<AppState>,
    Path(office_id): Path<i64>,
) -> Result<Json<ListRequestsResponse>, HttpError> {
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let response: ListRequestsResponse = list_requests_for_office(&mut persistence, office_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/requests`.
///
/// Submits a pending request, or creates and approves it in one step when
/// `auto_approve` is set.
async fn handle_create_request(
    AxumState(app_state): AxumState<AppState>,
    Operator(ctx): Operator,
    Json(req): Json<CreateVacationRequest>,
) -> Result<Json<VacationRequestResponse>, HttpError> {
    let employee_id: i64 = req.employee_id;
    info!(
        employee_id,
        actor_id = %ctx.actor.id,
        days = req.days_requested,
        auto_approve = req.auto_approve,
        "Handling create_request request"
    );

    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: VacationRequestResponse = create_request(&mut persistence, req, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

/// Handler for POST `/requests/{id}/approve`.
async fn handle_approve_request(
    AxumState(app_state): AxumState<AppState>,
    Path(request_id): Path<i64>,
    Operator(ctx): Operator,
    Json(req): Json<ApproveRequestRequest>,
) -> Result<Json<VacationRequestResponse>, HttpError> {
    info!(request_id, actor_id = %ctx.actor.id, "Handling approve_request request");

    let employee_id: i64 = owner_of_request(&app_state, request_id).await?;
    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: VacationRequestResponse =
        approve_request(&mut persistence, request_id, req, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

/// Handler for POST `/requests/{id}/reject`.
async fn handle_reject_request(
    AxumState(app_state): AxumState<AppState>,
    Path(request_id): Path<i64>,
    Operator(ctx): Operator,
    Json(req): Json<RejectRequestRequest>,
) -> Result<Json<VacationRequestResponse>, HttpError> {
    info!(request_id, actor_id = %ctx.actor.id, "Handling reject_request request");

    let employee_id: i64 = owner_of_request(&app_state, request_id).await?;
    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: VacationRequestResponse = reject_request(&mut persistence, request_id, req, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

/// Handler for GET `/requests/{id}/cancellation`.
///
/// Shows what cancelling would restore and lose, without changing anything.
async fn handle_preview_cancellation(
    AxumState(app_state): AxumState<AppState>,
    Path(request_id): Path<i64>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<CancellationPreviewResponse>, HttpError> {
    let as_of: Date = query.date()?;
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let response: CancellationPreviewResponse =
        preview_cancellation(&mut persistence, request_id, as_of)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/requests/{id}/cancel`.
async fn handle_cancel_request(
    AxumState(app_state): AxumState<AppState>,
    Path(request_id): Path<i64>,
    Operator(ctx): Operator,
    Json(req): Json<CancelRequestRequest>,
) -> Result<Json<CancelRequestResponse>, HttpError> {
    info!(
        request_id,
        actor_id = %ctx.actor.id,
        acknowledge_loss = req.acknowledge_loss,
        "Handling cancel_request request"
    );

    let employee_id: i64 = owner_of_request(&app_state, request_id).await?;
    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: CancelRequestResponse = cancel_request(&mut persistence, request_id, req, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

/// Handler for POST `/employees/{id}/requests/advance`.
async fn handle_advance_requests(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Operator(ctx): Operator,
) -> Result<Json<AdvanceRequestStatusesResponse>, HttpError> {
    info!(employee_id, actor_id = %ctx.actor.id, "Handling advance_requests request");

    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: AdvanceRequestStatusesResponse =
        advance_request_statuses(&mut persistence, employee_id, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

// ============================================================================
// Adjustments and audit
// ============================================================================

/// Handler for POST `/employees/{id}/adjustments/add`.
async fn handle_add_days(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Operator(ctx): Operator,
    Json(req): Json<AddDaysRequest>,
) -> Result<Json<AdjustmentResponse>, HttpError> {
    info!(employee_id, actor_id = %ctx.actor.id, days = req.days, "Handling add_days request");

    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: AdjustmentResponse = add_days(&mut persistence, employee_id, req, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

/// Handler for POST `/employees/{id}/adjustments/remove`.
async fn handle_remove_days(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
    Operator(ctx): Operator,
    Json(req): Json<RemoveDaysRequest>,
) -> Result<Json<AdjustmentResponse>, HttpError> {
    info!(employee_id, actor_id = %ctx.actor.id, mode = ?req.mode, "Handling remove_days request");

    let (guard, mut persistence): (OwnedMutexGuard<()>, MutexGuard<'_, SqlitePersistence>) =
        app_state.lock_employee(employee_id).await?;
    let response: AdjustmentResponse = remove_days(&mut persistence, employee_id, req, &ctx)?;
    drop(persistence);
    drop(guard);

    Ok(Json(response))
}

/// Handler for GET `/employees/{id}/audit`.
async fn handle_get_audit_timeline(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
) -> Result<Json<AuditTimelineResponse>, HttpError> {
    let mut persistence: MutexGuard<'_, SqlitePersistence> = app_state.store().await?;
    let response: AuditTimelineResponse = get_audit_timeline(&mut persistence, employee_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/employees",
            post(handle_register_employee).get(handle_list_employees),
        )
        .route("/employees/{id}", get(handle_get_employee))
        .route("/employees/{id}/cycles", get(handle_list_cycles))
        .route("/employees/{id}/cycles/ensure", post(handle_ensure_cycles))
        .route("/employees/{id}/balance", get(handle_get_balance))
        .route("/employees/{id}/requests", get(handle_list_employee_requests))
        .route(
            "/employees/{id}/requests/advance",
            post(handle_advance_requests),
        )
        .route("/employees/{id}/adjustments/add", post(handle_add_days))
        .route("/employees/{id}/adjustments/remove", post(handle_remove_days))
        .route("/employees/{id}/audit", get(handle_get_audit_timeline))
        .route("/offices/{id}/requests", get(handle_list_office_requests))
        .route("/requests", post(handle_create_request))
        .route("/requests/{id}/approve", post(handle_approve_request))
        .route("/requests/{id}/reject", post(handle_reject_request))
        .route(
            "/requests/{id}/cancellation",
            get(handle_preview_cancellation),
        )
        .route("/requests/{id}/cancel", post(handle_cancel_request))
        .with_state(app_state)
}
