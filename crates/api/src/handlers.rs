// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Mutating handlers resolve the owning employee, build a core command and
//! hand it to [`execute_command`], which applies it to the stored ledger and
//! commits the transition with bounded conflict retry. Handlers never plan
//! allocations or restorations themselves.
//!
//! Callers serialize mutating handlers per employee; read handlers take no
//! lock and may observe a ledger that is about to change.

use time::Date;
use tracing::{debug, info};
use vacation_ledger::{
    Command, LedgerOutcome, LedgerState, TransitionResult, preview_cancellation as plan_preview,
};
use vacation_ledger_audit::AuditEvent;
use vacation_ledger_domain::{
    AccrualBreakdown, Employee, RemovalMode, RestorationPlan, VacationCycle, VacationRequest,
    available_balance, explain_entitlement, parse_date, validate_employee_fields,
    years_of_service,
};
use vacation_ledger_persistence::{PersistTransitionResult, SqlitePersistence};

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::execute::{Execution, OperationContext, execute_command, generate_operation_key};
use crate::request_response::{
    AddDaysRequest, AdjustmentResponse, AdvanceRequestStatusesResponse, AdvancedRequestInfo,
    ApproveRequestRequest, AuditEventInfo, AuditTimelineResponse, BalanceResponse,
    CancelRequestRequest, CancelRequestResponse, CancellationPreviewResponse,
    CreateVacationRequest, CycleInfo, EmployeeInfo, EnsureCyclesResponse, ListCyclesResponse,
    ListRequestsResponse, PlanEntryInfo, RegisterEmployeeRequest, RegisterEmployeeResponse,
    RejectRequestRequest, RemoveDaysRequest, RequestInfo, VacationRequestResponse,
};

// ============================================================================
// Helpers
// ============================================================================

/// Parses an ISO 8601 date field, naming the field on failure.
fn parse_date_field(field: &str, value: &str) -> Result<Date, ApiError> {
    parse_date(value).map_err(|err| ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    })
}

/// Rejects blank idempotency keys.
fn validate_key(field: &str, key: &str) -> Result<(), ApiError> {
    if key.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: String::from("Idempotency key cannot be empty"),
        });
    }
    Ok(())
}

/// Unwraps a committed execution.
///
/// Only housekeeping commands finish unchanged and only keyed commands can
/// be duplicates, so any other ending is an internal error.
fn committed(
    execution: Execution,
) -> Result<(Box<TransitionResult>, PersistTransitionResult), ApiError> {
    match execution {
        Execution::Committed { result, persisted } => Ok((result, persisted)),
        Execution::Unchanged { .. } | Execution::Duplicate => Err(ApiError::Internal {
            message: String::from("Operation finished without a commit"),
        }),
    }
}

fn load_request(
    persistence: &mut SqlitePersistence,
    request_id: i64,
) -> Result<VacationRequest, ApiError> {
    persistence
        .get_request(request_id)
        .map_err(translate_persistence_error)
}

/// Resolves the employee owning a request.
///
/// Mutations addressed by request ID use this to pick the employee lock
/// before calling the handler.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the request does not exist.
pub fn employee_for_request(
    persistence: &mut SqlitePersistence,
    request_id: i64,
) -> Result<i64, ApiError> {
    Ok(load_request(persistence, request_id)?.employee_id)
}

// ============================================================================
// Employees
// ============================================================================

/// Adds an employee to the directory.
///
/// The directory is a seed for running the ledger standalone. Registering
/// an employee creates no cycles; call [`ensure_cycles_up_to_date`] for that.
///
/// # Errors
///
/// Returns an error if:
/// - The hire date is not an ISO 8601 date
/// - The name is empty
/// - The store rejects the insert
pub fn register_employee(
    persistence: &mut SqlitePersistence,
    request: RegisterEmployeeRequest,
) -> Result<RegisterEmployeeResponse, ApiError> {
    let hire_date: Date = parse_date_field("hire_date", &request.hire_date)?;

    let mut employee: Employee = Employee::new(request.office_id, request.full_name, hire_date);
    employee.is_active = request.is_active.unwrap_or(true);
    validate_employee_fields(&employee).map_err(translate_domain_error)?;

    let employee_id: i64 = persistence
        .insert_employee(&employee)
        .map_err(translate_persistence_error)?;
    employee.employee_id = Some(employee_id);

    info!(employee_id, office_id = employee.office_id, "Registered employee");

    Ok(RegisterEmployeeResponse {
        message: format!("Registered employee {employee_id} ({})", employee.full_name),
        employee: EmployeeInfo::from_employee(&employee),
    })
}

/// Reads an employee.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the employee does not exist.
pub fn get_employee(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
) -> Result<EmployeeInfo, ApiError> {
    let employee: Employee = persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?;
    Ok(EmployeeInfo::from_employee(&employee))
}

/// Lists every employee in the directory.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list_employees(persistence: &mut SqlitePersistence) -> Result<Vec<EmployeeInfo>, ApiError> {
    let employees: Vec<Employee> = persistence
        .list_employees()
        .map_err(translate_persistence_error)?;
    Ok(employees.iter().map(EmployeeInfo::from_employee).collect())
}

// ============================================================================
// Cycles and balance
// ============================================================================

/// Creates the employee's missing cycles and marks lapsed cycles expired.
///
/// Idempotent: a second call on the same date changes nothing and records
/// no audit event.
///
/// # Errors
///
/// Returns an error if the employee does not exist or the commit fails.
pub fn ensure_cycles_up_to_date(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    ctx: &OperationContext,
) -> Result<EnsureCyclesResponse, ApiError> {
    let execution: Execution =
        execute_command(persistence, employee_id, &Command::EnsureCycles, ctx, None)?;

    let (result, event_id): (Box<TransitionResult>, Option<i64>) = match execution {
        Execution::Committed { result, persisted } => (result, Some(persisted.event_id)),
        Execution::Unchanged { result } => (result, None),
        Execution::Duplicate => {
            return Err(ApiError::Internal {
                message: String::from("Cycle housekeeping carries no operation key"),
            });
        }
    };

    let created_years: Vec<u16> = result
        .cycle_sync
        .created
        .iter()
        .map(|c| c.years_of_service)
        .collect();
    let created: Vec<CycleInfo> = if created_years.is_empty() {
        Vec::new()
    } else {
        persistence
            .read_cycles(employee_id)
            .map_err(translate_persistence_error)?
            .iter()
            .filter(|c| created_years.contains(&c.years_of_service))
            .map(|c| CycleInfo::from_cycle(c, ctx.as_of))
            .collect()
    };

    Ok(EnsureCyclesResponse {
        employee_id,
        message: format!(
            "Created {} cycle(s), expired {} cycle(s)",
            created.len(),
            result.cycle_sync.newly_expired.len()
        ),
        created,
        newly_expired: result.cycle_sync.newly_expired.clone(),
        event_id,
    })
}

/// Lists the employee's stored cycles. Never creates cycles.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the employee does not exist.
pub fn list_cycles(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    as_of: Date,
) -> Result<ListCyclesResponse, ApiError> {
    persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?;
    let cycles: Vec<VacationCycle> = persistence
        .read_cycles(employee_id)
        .map_err(translate_persistence_error)?;

    Ok(ListCyclesResponse {
        employee_id,
        as_of: as_of.to_string(),
        cycles: cycles
            .iter()
            .map(|c| CycleInfo::from_cycle(c, as_of))
            .collect(),
    })
}

/// Returns the employee's active balance and how the current entitlement is derived.
///
/// Only stored cycles count; a ledger that has not been brought up to date
/// reports the balance it holds.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the employee does not exist.
pub fn get_balance(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    as_of: Date,
) -> Result<BalanceResponse, ApiError> {
    let employee: Employee = persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?;
    let cycles: Vec<VacationCycle> = persistence
        .read_cycles(employee_id)
        .map_err(translate_persistence_error)?;

    let accrual: AccrualBreakdown =
        explain_entitlement(years_of_service(employee.hire_date, as_of));

    Ok(BalanceResponse {
        employee_id,
        as_of: as_of.to_string(),
        available_days: available_balance(&cycles, as_of),
        active_cycles: cycles
            .iter()
            .filter(|c| c.is_active_on(as_of))
            .map(|c| CycleInfo::from_cycle(c, as_of))
            .collect(),
        accrual,
    })
}

// ============================================================================
// Requests
// ============================================================================

/// What a repeated request key must match to be replayed.
struct RequestShape {
    start_date: Date,
    end_date: Date,
    days_requested: u16,
    /// The command the original call recorded.
    action: &'static str,
}

/// Replays a request creation recorded under `request_key`, if any.
///
/// A key reused for another employee, other dates, another day count or
/// the other approval mode is a conflict.
fn replay_request(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    request_key: &str,
    shape: &RequestShape,
) -> Result<Option<VacationRequestResponse>, ApiError> {
    let Some(existing) = persistence
        .find_request_by_key(request_key)
        .map_err(translate_persistence_error)?
    else {
        return Ok(None);
    };

    if existing.employee_id != employee_id {
        return Err(ApiError::Conflict {
            message: format!(
                "Request key '{request_key}' is already used by employee {}",
                existing.employee_id
            ),
        });
    }

    let event: Option<AuditEvent> = persistence
        .find_event_by_operation_key(request_key)
        .map_err(translate_persistence_error)?;
    let same_action: bool = event
        .as_ref()
        .is_none_or(|e| e.action.name == shape.action);
    if existing.start_date != shape.start_date
        || existing.end_date != shape.end_date
        || existing.days_requested != shape.days_requested
        || !same_action
    {
        return Err(ApiError::Conflict {
            message: format!(
                "Request key '{request_key}' is already used for {} day(s) from {} to {}",
                existing.days_requested, existing.start_date, existing.end_date
            ),
        });
    }

    let cycles: Vec<VacationCycle> = persistence
        .read_cycles(employee_id)
        .map_err(translate_persistence_error)?;
    let request_id: i64 = existing.request_id.unwrap_or_default();
    debug!(employee_id, request_id, request_key, "Replaying request creation");

    Ok(Some(VacationRequestResponse {
        request: RequestInfo::from_request(&existing),
        deductions: event.as_ref().map_or_else(Vec::new, |e| {
            PlanEntryInfo::from_moves(&e.action.moves, &cycles)
        }),
        event_id: event.and_then(|e| e.event_id),
        replayed: true,
        message: format!("Request key '{request_key}' already recorded as request {request_id}"),
    }))
}

/// Records a vacation request, pending or approved in one step.
///
/// With `auto_approve` the request is inserted as approved and its days are
/// allocated oldest cycle first in the same commit. A repeated `request_key`
/// returns the recorded request instead of creating another.
///
/// # Errors
///
/// Returns an error if:
/// - A date is malformed or the request fails validation
/// - The employee does not exist or is inactive
/// - The active balance cannot cover an auto-approved request (`InsufficientDays`)
/// - Concurrent modifications outlast the retry cap (`Conflict`)
pub fn create_request(
    persistence: &mut SqlitePersistence,
    request: CreateVacationRequest,
    ctx: &OperationContext,
) -> Result<VacationRequestResponse, ApiError> {
    let employee_id: i64 = request.employee_id;
    let start_date: Date = parse_date_field("start_date", &request.start_date)?;
    let end_date: Date = parse_date_field("end_date", &request.end_date)?;

    let shape: RequestShape = RequestShape {
        start_date,
        end_date,
        days_requested: request.days_requested,
        action: if request.auto_approve {
            "CreateAndApproveRequest"
        } else {
            "SubmitRequest"
        },
    };
    if let Some(key) = request.request_key.as_deref() {
        validate_key("request_key", key)?;
        if let Some(replayed) = replay_request(persistence, employee_id, key, &shape)? {
            return Ok(replayed);
        }
    }

    let employee: Employee = persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?;

    let mut vacation_request: VacationRequest = VacationRequest::new(
        employee_id,
        employee.office_id,
        start_date,
        end_date,
        request.days_requested,
    );
    vacation_request.reason = request.reason;
    vacation_request.request_key.clone_from(&request.request_key);

    let command: Command = if request.auto_approve {
        Command::CreateAndApproveRequest {
            request: vacation_request,
            approved_by: request
                .approved_by
                .unwrap_or_else(|| ctx.actor.id.clone()),
        }
    } else {
        Command::SubmitRequest {
            request: vacation_request,
        }
    };

    let execution: Execution = execute_command(
        persistence,
        employee_id,
        &command,
        ctx,
        request.request_key.as_deref(),
    )?;

    if matches!(execution, Execution::Duplicate) {
        // Another caller recorded the same key between the lookup and the commit.
        let key: &str = request.request_key.as_deref().unwrap_or_default();
        return replay_request(persistence, employee_id, key, &shape)?.ok_or_else(|| {
            ApiError::Conflict {
                message: format!("Request key '{key}' is recorded but cannot be found"),
            }
        });
    }

    let (result, persisted): (Box<TransitionResult>, PersistTransitionResult) =
        committed(execution)?;
    let request_id: i64 =
        persisted
            .request_ids
            .last()
            .copied()
            .ok_or_else(|| ApiError::Internal {
                message: String::from("Request was not written"),
            })?;
    let stored: VacationRequest = load_request(persistence, request_id)?;

    let deductions: Vec<PlanEntryInfo> = match &result.outcome {
        LedgerOutcome::Allocated(plan) => PlanEntryInfo::from_entries(&plan.entries),
        _ => Vec::new(),
    };

    Ok(VacationRequestResponse {
        message: format!(
            "Recorded request {request_id} for {} day(s) as {}",
            stored.days_requested, stored.status
        ),
        request: RequestInfo::from_request(&stored),
        deductions,
        event_id: Some(persisted.event_id),
        replayed: false,
    })
}

/// Approves a pending request, allocating its days oldest cycle first.
///
/// # Errors
///
/// Returns an error if:
/// - The request does not exist or is not pending
/// - The employee is inactive
/// - The active balance cannot cover the request (`InsufficientDays`)
/// - Concurrent modifications outlast the retry cap (`Conflict`)
pub fn approve_request(
    persistence: &mut SqlitePersistence,
    request_id: i64,
    request: ApproveRequestRequest,
    ctx: &OperationContext,
) -> Result<VacationRequestResponse, ApiError> {
    let employee_id: i64 = employee_for_request(persistence, request_id)?;
    let command: Command = Command::ApproveRequest {
        request_id,
        approved_by: request
            .approved_by
            .unwrap_or_else(|| ctx.actor.id.clone()),
    };

    let (result, persisted): (Box<TransitionResult>, PersistTransitionResult) =
        committed(execute_command(persistence, employee_id, &command, ctx, None)?)?;
    let stored: VacationRequest = load_request(persistence, request_id)?;

    let deductions: Vec<PlanEntryInfo> = match &result.outcome {
        LedgerOutcome::Allocated(plan) => PlanEntryInfo::from_entries(&plan.entries),
        _ => Vec::new(),
    };

    Ok(VacationRequestResponse {
        message: format!(
            "Approved request {request_id} for {} day(s)",
            stored.days_requested
        ),
        request: RequestInfo::from_request(&stored),
        deductions,
        event_id: Some(persisted.event_id),
        replayed: false,
    })
}

/// Rejects a pending request. Cycles are not touched.
///
/// # Errors
///
/// Returns an error if the reason is empty, or the request does not exist
/// or is not pending.
pub fn reject_request(
    persistence: &mut SqlitePersistence,
    request_id: i64,
    request: RejectRequestRequest,
    ctx: &OperationContext,
) -> Result<VacationRequestResponse, ApiError> {
    let employee_id: i64 = employee_for_request(persistence, request_id)?;
    let command: Command = Command::RejectRequest {
        request_id,
        reason: request.reason,
    };

    let (_, persisted): (Box<TransitionResult>, PersistTransitionResult) =
        committed(execute_command(persistence, employee_id, &command, ctx, None)?)?;
    let stored: VacationRequest = load_request(persistence, request_id)?;

    Ok(VacationRequestResponse {
        message: format!("Rejected request {request_id}"),
        request: RequestInfo::from_request(&stored),
        deductions: Vec::new(),
        event_id: Some(persisted.event_id),
        replayed: false,
    })
}

/// Previews what cancelling a request would restore and lose. Read-only.
///
/// # Errors
///
/// Returns an error if the request does not exist or cannot be cancelled.
pub fn preview_cancellation(
    persistence: &mut SqlitePersistence,
    request_id: i64,
    as_of: Date,
) -> Result<CancellationPreviewResponse, ApiError> {
    let request: VacationRequest = load_request(persistence, request_id)?;
    let state: LedgerState = persistence
        .load_ledger_state(request.employee_id)
        .map_err(translate_persistence_error)?;

    let plan: RestorationPlan =
        plan_preview(&state, request_id, as_of).map_err(translate_core_error)?;

    Ok(CancellationPreviewResponse {
        request_id,
        status: request.status.as_str().to_string(),
        restorable: PlanEntryInfo::from_entries(&plan.restorable),
        expired: PlanEntryInfo::from_entries(&plan.expired),
        lost_days: plan.lost_days,
        total_requested: plan.total_requested,
        requires_acknowledgement: plan.has_loss(),
    })
}

/// Cancels a request, returning its days to cycles newest first.
///
/// If some days cannot be restored and `acknowledge_loss` is not set, the
/// call fails with `ConfirmationRequired` and nothing is written.
///
/// # Errors
///
/// Returns an error if:
/// - The request does not exist
/// - The request is already cancelled (`AlreadyCancelled`) or terminal
/// - Days would be lost without acknowledgement (`ConfirmationRequired`)
/// - Concurrent modifications outlast the retry cap (`Conflict`)
pub fn cancel_request(
    persistence: &mut SqlitePersistence,
    request_id: i64,
    request: CancelRequestRequest,
    ctx: &OperationContext,
) -> Result<CancelRequestResponse, ApiError> {
    let employee_id: i64 = employee_for_request(persistence, request_id)?;
    let command: Command = Command::CancelRequest {
        request_id,
        acknowledge_loss: request.acknowledge_loss,
    };

    let (result, persisted): (Box<TransitionResult>, PersistTransitionResult) =
        committed(execute_command(persistence, employee_id, &command, ctx, None)?)?;
    let stored: VacationRequest = load_request(persistence, request_id)?;

    let plan: RestorationPlan = match &result.outcome {
        LedgerOutcome::Cancelled(plan) => plan.clone(),
        _ => RestorationPlan::empty(),
    };
    if plan.has_loss() {
        info!(
            employee_id,
            request_id,
            lost_days = plan.lost_days,
            "Cancellation acknowledged with lost days"
        );
    }

    Ok(CancelRequestResponse {
        message: format!(
            "Cancelled request {request_id}; restored {} day(s), lost {}",
            plan.restored_days(),
            plan.lost_days
        ),
        request: RequestInfo::from_request(&stored),
        restored: PlanEntryInfo::from_entries(&plan.restorable),
        expired: PlanEntryInfo::from_entries(&plan.expired),
        lost_days: plan.lost_days,
        event_id: persisted.event_id,
    })
}

/// Lists the requests of an employee.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the employee does not exist.
pub fn list_requests_for_employee(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
) -> Result<ListRequestsResponse, ApiError> {
    persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?;
    let requests: Vec<VacationRequest> = persistence
        .list_requests_for_employee(employee_id)
        .map_err(translate_persistence_error)?;
    Ok(ListRequestsResponse {
        requests: requests.iter().map(RequestInfo::from_request).collect(),
    })
}

/// Lists the requests of an office.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list_requests_for_office(
    persistence: &mut SqlitePersistence,
    office_id: i64,
) -> Result<ListRequestsResponse, ApiError> {
    let requests: Vec<VacationRequest> = persistence
        .list_requests_for_office(office_id)
        .map_err(translate_persistence_error)?;
    Ok(ListRequestsResponse {
        requests: requests.iter().map(RequestInfo::from_request).collect(),
    })
}

/// Moves approved requests to in-progress or completed as their dates pass.
///
/// # Errors
///
/// Returns an error if the employee does not exist or the commit fails.
pub fn advance_request_statuses(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    ctx: &OperationContext,
) -> Result<AdvanceRequestStatusesResponse, ApiError> {
    let execution: Execution = execute_command(
        persistence,
        employee_id,
        &Command::AdvanceRequestStatuses,
        ctx,
        None,
    )?;

    let (result, event_id): (Box<TransitionResult>, Option<i64>) = match execution {
        Execution::Committed { result, persisted } => (result, Some(persisted.event_id)),
        Execution::Unchanged { result } => (result, None),
        Execution::Duplicate => {
            return Err(ApiError::Internal {
                message: String::from("Status advance carries no operation key"),
            });
        }
    };

    let advanced: Vec<AdvancedRequestInfo> = match &result.outcome {
        LedgerOutcome::StatusesAdvanced { advanced } => advanced
            .iter()
            .map(|(request_id, status)| AdvancedRequestInfo {
                request_id: *request_id,
                status: status.as_str().to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(AdvanceRequestStatusesResponse {
        employee_id,
        message: format!("Advanced {} request(s)", advanced.len()),
        advanced,
        event_id,
    })
}

// ============================================================================
// Adjustments
// ============================================================================

/// Replays an adjustment recorded under `operation_key`, if any.
fn replay_adjustment(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    operation_key: &str,
    action: &str,
    as_of: Date,
) -> Result<Option<AdjustmentResponse>, ApiError> {
    let Some(event) = persistence
        .find_event_by_operation_key(operation_key)
        .map_err(translate_persistence_error)?
    else {
        return Ok(None);
    };

    if event.employee_id != employee_id || event.action.name != action {
        return Err(ApiError::Conflict {
            message: format!(
                "Operation key '{operation_key}' is already used by {} for employee {}",
                event.action.name, event.employee_id
            ),
        });
    }

    let cycles: Vec<VacationCycle> = persistence
        .read_cycles(employee_id)
        .map_err(translate_persistence_error)?;
    debug!(employee_id, operation_key, "Replaying adjustment");

    Ok(Some(AdjustmentResponse {
        employee_id,
        operation_key: operation_key.to_string(),
        event_id: event.event_id,
        entries: PlanEntryInfo::from_moves(&event.action.moves, &cycles),
        days: event.action.moved_days(),
        balance: available_balance(&cycles, as_of),
        replayed: true,
        message: format!(
            "Operation key '{operation_key}' already recorded: {}",
            event.action.details.unwrap_or_default()
        ),
    }))
}

/// Resolves the adjustment key and replays it if it was already recorded.
fn prepare_adjustment(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    operation_key: Option<String>,
    action: &str,
    as_of: Date,
) -> Result<(String, Option<AdjustmentResponse>), ApiError> {
    let operation_key: String = match operation_key {
        Some(key) => {
            validate_key("operation_key", &key)?;
            key
        }
        None => generate_operation_key(),
    };
    let replayed: Option<AdjustmentResponse> =
        replay_adjustment(persistence, employee_id, &operation_key, action, as_of)?;
    Ok((operation_key, replayed))
}

/// Adds days to the employee's oldest active cycle.
///
/// Extends that cycle's entitlement. Idempotent on `operation_key`.
///
/// # Errors
///
/// Returns an error if:
/// - `days` is zero or the reason is empty
/// - The employee is inactive
/// - No cycle is active (`InvalidOperation`)
/// - Concurrent modifications outlast the retry cap (`Conflict`)
pub fn add_days(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    request: AddDaysRequest,
    ctx: &OperationContext,
) -> Result<AdjustmentResponse, ApiError> {
    let action: &str = "AddDays";
    let (operation_key, replayed): (String, Option<AdjustmentResponse>) = prepare_adjustment(
        persistence,
        employee_id,
        request.operation_key,
        action,
        ctx.as_of,
    )?;
    if let Some(replayed) = replayed {
        return Ok(replayed);
    }

    let command: Command = Command::AddDays {
        days: request.days,
        reason: request.reason,
    };
    let execution: Execution =
        execute_command(persistence, employee_id, &command, ctx, Some(&operation_key))?;
    if matches!(execution, Execution::Duplicate) {
        return replay_adjustment(persistence, employee_id, &operation_key, action, ctx.as_of)?
            .ok_or_else(|| ApiError::Conflict {
                message: format!("Operation key '{operation_key}' is recorded but cannot be found"),
            });
    }

    let (result, persisted): (Box<TransitionResult>, PersistTransitionResult) =
        committed(execution)?;
    let entries: Vec<PlanEntryInfo> = match &result.outcome {
        LedgerOutcome::ToppedUp(entry) => PlanEntryInfo::from_entries(std::slice::from_ref(entry)),
        _ => Vec::new(),
    };

    Ok(AdjustmentResponse {
        employee_id,
        message: format!("Added {} day(s)", request.days),
        operation_key,
        event_id: Some(persisted.event_id),
        entries,
        days: request.days,
        balance: available_balance(&result.new_state.cycles, ctx.as_of),
        replayed: false,
    })
}

/// Claws back days from the employee's active cycles, oldest first.
///
/// `absolute` removes exactly `days`; `target_remaining` removes whatever
/// brings the balance down to `target` and is a no-op at the current
/// balance. Idempotent on `operation_key`.
///
/// # Errors
///
/// Returns an error if:
/// - The amount is zero or the reason is empty
/// - The active balance is below an absolute amount (`InsufficientDays`)
/// - The target is above the current balance (`InvalidOperation`)
/// - Concurrent modifications outlast the retry cap (`Conflict`)
pub fn remove_days(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    request: RemoveDaysRequest,
    ctx: &OperationContext,
) -> Result<AdjustmentResponse, ApiError> {
    let action: &str = "RemoveDays";
    let (operation_key, replayed): (String, Option<AdjustmentResponse>) = prepare_adjustment(
        persistence,
        employee_id,
        request.operation_key,
        action,
        ctx.as_of,
    )?;
    if let Some(replayed) = replayed {
        return Ok(replayed);
    }

    let mode: RemovalMode = request.mode;
    let command: Command = Command::RemoveDays {
        mode,
        reason: request.reason,
    };
    let execution: Execution =
        execute_command(persistence, employee_id, &command, ctx, Some(&operation_key))?;
    if matches!(execution, Execution::Duplicate) {
        return replay_adjustment(persistence, employee_id, &operation_key, action, ctx.as_of)?
            .ok_or_else(|| ApiError::Conflict {
                message: format!("Operation key '{operation_key}' is recorded but cannot be found"),
            });
    }

    let (result, persisted): (Box<TransitionResult>, PersistTransitionResult) =
        committed(execution)?;
    let LedgerOutcome::Removed(plan) = &result.outcome else {
        return Err(ApiError::Internal {
            message: String::from("Claw-back produced no removal plan"),
        });
    };

    Ok(AdjustmentResponse {
        employee_id,
        message: if plan.is_noop() {
            format!("Balance already at {}; nothing removed", plan.previous_balance)
        } else {
            format!(
                "Removed {} day(s); balance {} -> {}",
                plan.removed_days, plan.previous_balance, plan.resulting_balance
            )
        },
        operation_key,
        event_id: Some(persisted.event_id),
        entries: PlanEntryInfo::from_entries(&plan.entries),
        days: plan.removed_days,
        balance: plan.resulting_balance,
        replayed: false,
    })
}

// ============================================================================
// Audit
// ============================================================================

/// Returns the employee's audit timeline in recording order.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the employee does not exist.
pub fn get_audit_timeline(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
) -> Result<AuditTimelineResponse, ApiError> {
    persistence
        .get_employee(employee_id)
        .map_err(translate_persistence_error)?;
    let events: Vec<AuditEvent> = persistence
        .get_audit_timeline(employee_id)
        .map_err(translate_persistence_error)?;

    Ok(AuditTimelineResponse {
        employee_id,
        events: events.iter().map(AuditEventInfo::from_event).collect(),
    })
}
