// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{LedgerChanges, LedgerOutcome, LedgerState, TransitionResult};
use time::Date;
use vacation_ledger_audit::{Action, Actor, AuditEvent, Cause, CycleMove, StateSnapshot};
use vacation_ledger_domain::{
    AllocationPlan, CycleSync, DomainError, PlanEntry, RemovalPlan, RequestStatus,
    RestorationPlan, VacationCycle, VacationRequest, apply_allocation, apply_cycle_sync,
    apply_removal, apply_restoration, apply_top_up, plan_allocation, plan_cycle_sync,
    plan_removal, plan_request_restoration, plan_top_up, validate_cycles, validate_reason,
    validate_request_fields, validate_status_transition,
};

/// Applies a command to an employee's ledger, producing a new state,
/// the store writes to reach it, and one audit event.
///
/// Every command first brings the cycles up to date for `as_of` (missing
/// cycles created, lapsed cycles expired); that housekeeping is part of the
/// same transition. `EnsureCycles` performs only the housekeeping. When it
/// finds nothing to do, `changes` is empty and the caller may skip persisting.
///
/// # Arguments
///
/// * `state` - The current ledger (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `as_of` - The reference date for activity and expiry
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state, writes and audit event
/// * `Err(CoreError)` if the command is invalid; nothing is changed
///
/// # Errors
///
/// Returns an error if:
/// - The command violates domain rules
/// - Cancelling would lose days and the loss was not acknowledged
#[allow(clippy::too_many_lines)]
pub fn apply(
    state: &LedgerState,
    command: Command,
    actor: Actor,
    cause: Cause,
    as_of: Date,
) -> Result<TransitionResult, CoreError> {
    let employee_id: i64 = state.employee_id()?;
    let action_name: &'static str = command.name();

    // Capture state before transition
    let before: StateSnapshot = state.to_snapshot();

    let mut new_state: LedgerState = state.clone();
    let cycle_sync: CycleSync = plan_cycle_sync(&state.employee, &state.cycles, as_of)?;
    apply_cycle_sync(&mut new_state.cycles, &cycle_sync);

    let (outcome, details): (LedgerOutcome, String) = match command {
        Command::EnsureCycles => {
            let details: String = format!(
                "Created {} cycle(s), expired {} cycle(s)",
                cycle_sync.created.len(),
                cycle_sync.newly_expired.len()
            );
            (LedgerOutcome::CyclesSynced(cycle_sync.clone()), details)
        }
        Command::SubmitRequest { request } => {
            let request: VacationRequest = prepare_new_request(state, employee_id, request)?;
            let details: String = format!(
                "Submitted request for {} day(s) from {} to {}",
                request.days_requested, request.start_date, request.end_date
            );
            new_state.requests.push(request);
            (LedgerOutcome::RequestSubmitted, details)
        }
        Command::CreateAndApproveRequest {
            request,
            approved_by,
        } => {
            let mut request: VacationRequest = prepare_new_request(state, employee_id, request)?;
            let plan: AllocationPlan =
                plan_allocation(&new_state.cycles, request.days_requested, as_of)?;
            apply_allocation(&mut new_state.cycles, &plan)?;

            request.status = RequestStatus::Approved;
            request.approved_by = Some(approved_by);
            request.allocation = plan.shares();
            let details: String = format!(
                "Created and approved request for {} day(s) from {} to {}; {}",
                request.days_requested,
                request.start_date,
                request.end_date,
                describe_entries("deducted", &plan.entries)
            );
            new_state.requests.push(request);
            (LedgerOutcome::Allocated(plan), details)
        }
        Command::ApproveRequest {
            request_id,
            approved_by,
        } => {
            ensure_active_employee(state, employee_id)?;
            let index: usize = request_index(&new_state, request_id)?;
            let current: RequestStatus = new_state.requests[index].status;
            validate_status_transition(request_id, current, RequestStatus::Approved)?;

            let days: u16 = new_state.requests[index].days_requested;
            let plan: AllocationPlan = plan_allocation(&new_state.cycles, days, as_of)?;
            apply_allocation(&mut new_state.cycles, &plan)?;

            let request: &mut VacationRequest = &mut new_state.requests[index];
            request.status = RequestStatus::Approved;
            request.approved_by = Some(approved_by);
            request.allocation = plan.shares();
            let details: String = format!(
                "Approved request {request_id} for {days} day(s); {}",
                describe_entries("deducted", &plan.entries)
            );
            (LedgerOutcome::Allocated(plan), details)
        }
        Command::RejectRequest { request_id, reason } => {
            validate_reason(&reason)?;
            let index: usize = request_index(&new_state, request_id)?;
            let current: RequestStatus = new_state.requests[index].status;
            validate_status_transition(request_id, current, RequestStatus::Rejected)?;

            let request: &mut VacationRequest = &mut new_state.requests[index];
            request.status = RequestStatus::Rejected;
            let details: String = format!("Rejected request {request_id}: {reason}");
            request.rejected_reason = Some(reason);
            (LedgerOutcome::RequestRejected, details)
        }
        Command::CancelRequest {
            request_id,
            acknowledge_loss,
        } => {
            let index: usize = request_index(&new_state, request_id)?;
            let current: RequestStatus = new_state.requests[index].status;
            validate_status_transition(request_id, current, RequestStatus::Cancelled)?;

            let held: &VacationRequest = &new_state.requests[index];
            let plan: RestorationPlan = if current.holds_allocation() {
                plan_request_restoration(
                    &new_state.cycles,
                    &held.allocation,
                    held.days_requested,
                    as_of,
                )?
            } else {
                RestorationPlan::empty()
            };

            if plan.has_loss() && !acknowledge_loss {
                return Err(CoreError::LossNotAcknowledged {
                    request_id,
                    lost_days: plan.lost_days,
                    plan,
                });
            }
            apply_restoration(&mut new_state.cycles, &plan)?;

            let request: &mut VacationRequest = &mut new_state.requests[index];
            request.status = RequestStatus::Cancelled;
            request.cancelled_by = Some(actor.id.clone());

            let details: String = if current.holds_allocation() {
                format!(
                    "Cancelled request {request_id}; {}; {} day(s) lost",
                    describe_entries("restored", &plan.restorable),
                    plan.lost_days
                )
            } else {
                format!("Cancelled pending request {request_id}; nothing to restore")
            };
            (LedgerOutcome::Cancelled(plan), details)
        }
        Command::AddDays { days, reason } => {
            validate_reason(&reason)?;
            ensure_active_employee(state, employee_id)?;
            let entry: PlanEntry = plan_top_up(employee_id, &new_state.cycles, days, as_of)?;
            apply_top_up(&mut new_state.cycles, &entry)?;

            let details: String = format!(
                "Added {days} day(s) to cycle for service year {}: {reason}",
                entry.years_of_service
            );
            (LedgerOutcome::ToppedUp(entry), details)
        }
        Command::RemoveDays { mode, reason } => {
            validate_reason(&reason)?;
            let plan: RemovalPlan = plan_removal(&new_state.cycles, mode, as_of)?;
            apply_removal(&mut new_state.cycles, &plan)?;

            let details: String = if plan.is_noop() {
                format!(
                    "Balance already at {}; nothing removed: {reason}",
                    plan.previous_balance
                )
            } else {
                format!(
                    "Removed {} day(s), balance {} -> {}; {}: {reason}",
                    plan.removed_days,
                    plan.previous_balance,
                    plan.resulting_balance,
                    describe_entries("deducted", &plan.entries)
                )
            };
            (LedgerOutcome::Removed(plan), details)
        }
        Command::AdvanceRequestStatuses => {
            let mut advanced: Vec<(i64, RequestStatus)> = Vec::new();
            for request in &mut new_state.requests {
                let Some(target) = scheduled_status(request, as_of) else {
                    continue;
                };
                let Some(request_id) = request.request_id else {
                    continue;
                };
                validate_status_transition(request_id, request.status, target)?;
                request.status = target;
                advanced.push((request_id, target));
            }
            let details: String = format!("Advanced {} request(s)", advanced.len());
            (LedgerOutcome::StatusesAdvanced { advanced }, details)
        }
    };

    validate_cycles(&new_state.cycles)?;

    // Capture state after transition
    let after: StateSnapshot = new_state.to_snapshot();

    let changes: LedgerChanges = LedgerChanges::between(state, &new_state);

    let action: Action =
        Action::new(String::from(action_name), Some(details)).with_moves(moves_of(&outcome));
    let audit_event: AuditEvent =
        AuditEvent::new(employee_id, actor, cause, action, before, after);

    Ok(TransitionResult {
        new_state,
        changes,
        outcome,
        cycle_sync,
        audit_event,
    })
}

/// Previews the restoration a cancellation would perform without changing anything.
///
/// Pending requests hold no days, so their preview is an empty plan.
///
/// # Errors
///
/// Returns an error if the request is missing or cannot be cancelled.
pub fn preview_cancellation(
    state: &LedgerState,
    request_id: i64,
    as_of: Date,
) -> Result<RestorationPlan, CoreError> {
    let request: &VacationRequest = state
        .find_request(request_id)
        .ok_or(DomainError::RequestNotFound { request_id })?;
    validate_status_transition(request_id, request.status, RequestStatus::Cancelled)?;

    if !request.status.holds_allocation() {
        return Ok(RestorationPlan::empty());
    }

    // Preview against the cycles as they will be once housekeeping runs.
    let mut cycles: Vec<VacationCycle> = state.cycles.clone();
    let sync: CycleSync = plan_cycle_sync(&state.employee, &state.cycles, as_of)?;
    apply_cycle_sync(&mut cycles, &sync);

    Ok(plan_request_restoration(
        &cycles,
        &request.allocation,
        request.days_requested,
        as_of,
    )?)
}

/// Returns the status a request should move to on `as_of`, if any.
fn scheduled_status(request: &VacationRequest, as_of: Date) -> Option<RequestStatus> {
    match request.status {
        RequestStatus::Approved if request.end_date < as_of => Some(RequestStatus::Completed),
        RequestStatus::Approved if request.start_date <= as_of => Some(RequestStatus::InProgress),
        RequestStatus::InProgress if request.end_date < as_of => Some(RequestStatus::Completed),
        _ => None,
    }
}

fn prepare_new_request(
    state: &LedgerState,
    employee_id: i64,
    mut request: VacationRequest,
) -> Result<VacationRequest, DomainError> {
    ensure_active_employee(state, employee_id)?;
    if request.employee_id != employee_id {
        return Err(DomainError::RequestEmployeeMismatch {
            request_id: request.request_id.unwrap_or_default(),
            employee_id,
        });
    }
    validate_request_fields(&request)?;

    request.request_id = None;
    request.office_id = state.employee.office_id;
    request.status = RequestStatus::Pending;
    request.approved_by = None;
    request.rejected_reason = None;
    request.cancelled_by = None;
    request.allocation = Vec::new();
    Ok(request)
}

const fn ensure_active_employee(state: &LedgerState, employee_id: i64) -> Result<(), DomainError> {
    if state.employee.is_active {
        Ok(())
    } else {
        Err(DomainError::EmployeeInactive { employee_id })
    }
}

fn request_index(state: &LedgerState, request_id: i64) -> Result<usize, DomainError> {
    state
        .requests
        .iter()
        .position(|r| r.request_id == Some(request_id))
        .ok_or(DomainError::RequestNotFound { request_id })
}

/// The per-cycle days an outcome moved, for the audit record.
fn moves_of(outcome: &LedgerOutcome) -> Vec<CycleMove> {
    let entries: &[PlanEntry] = match outcome {
        LedgerOutcome::Allocated(plan) => &plan.entries,
        LedgerOutcome::Cancelled(plan) => &plan.restorable,
        LedgerOutcome::ToppedUp(entry) => std::slice::from_ref(entry),
        LedgerOutcome::Removed(plan) => &plan.entries,
        LedgerOutcome::CyclesSynced(_)
        | LedgerOutcome::RequestSubmitted
        | LedgerOutcome::RequestRejected
        | LedgerOutcome::StatusesAdvanced { .. } => &[],
    };
    entries
        .iter()
        .map(|e| CycleMove {
            years_of_service: e.years_of_service,
            days: e.days,
        })
        .collect()
}

fn describe_entries(verb: &str, entries: &[PlanEntry]) -> String {
    if entries.is_empty() {
        return format!("{verb} nothing");
    }
    let parts: Vec<String> = entries
        .iter()
        .map(|e| format!("{} in service year {}", e.days, e.years_of_service))
        .collect();
    format!("{verb} {}", parts.join(", "))
}
