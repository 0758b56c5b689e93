// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates cross the boundary as ISO 8601 strings (`YYYY-MM-DD`) and are
//! parsed into domain types by the handlers.

use serde::{Deserialize, Serialize};
use time::Date;
use vacation_ledger_audit::{AuditEvent, CycleMove};
use vacation_ledger_domain::{
    AccrualBreakdown, Employee, PlanEntry, RemovalMode, VacationCycle, VacationRequest,
};

// ============================================================================
// Shared views
// ============================================================================

/// An employee as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInfo {
    /// The employee identifier.
    pub employee_id: i64,
    /// The employee's office.
    pub office_id: i64,
    /// The employee's full name.
    pub full_name: String,
    /// The date of hire.
    pub hire_date: String,
    /// Whether the employee is active.
    pub is_active: bool,
}

impl EmployeeInfo {
    pub(crate) fn from_employee(employee: &Employee) -> Self {
        Self {
            employee_id: employee.employee_id.unwrap_or_default(),
            office_id: employee.office_id,
            full_name: employee.full_name.clone(),
            hire_date: employee.hire_date.to_string(),
            is_active: employee.is_active,
        }
    }
}

/// A vacation cycle as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleInfo {
    /// The cycle identifier. Absent for cycles that were not stored.
    pub cycle_id: Option<i64>,
    /// The anniversary year the cycle represents.
    pub years_of_service: u16,
    /// First usable day.
    pub cycle_start_date: String,
    /// Last usable day.
    pub cycle_end_date: String,
    /// Entitlement, top-ups included.
    pub days_earned: u16,
    /// Days consumed.
    pub days_used: u16,
    /// Days remaining.
    pub days_available: u16,
    /// Whether the cycle is retired.
    pub is_expired: bool,
    /// Whether the cycle's days may be used on the reference date.
    pub is_active: bool,
    /// Optimistic concurrency stamp.
    pub version: i64,
}

impl CycleInfo {
    pub(crate) fn from_cycle(cycle: &VacationCycle, as_of: Date) -> Self {
        Self {
            cycle_id: cycle.cycle_id,
            years_of_service: cycle.years_of_service,
            cycle_start_date: cycle.cycle_start_date.to_string(),
            cycle_end_date: cycle.cycle_end_date.to_string(),
            days_earned: cycle.days_earned,
            days_used: cycle.days_used,
            days_available: cycle.days_available,
            is_expired: cycle.is_expired_on(as_of),
            is_active: cycle.is_active_on(as_of),
            version: cycle.version,
        }
    }
}

/// A vacation request as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The request identifier.
    pub request_id: i64,
    /// The requesting employee.
    pub employee_id: i64,
    /// The employee's office at request time.
    pub office_id: i64,
    /// First day of leave.
    pub start_date: String,
    /// Last day of leave.
    pub end_date: String,
    /// Days charged.
    pub days_requested: u16,
    /// Lifecycle status (`pending`, `approved`, ...).
    pub status: String,
    /// Reason supplied by the employee.
    pub reason: Option<String>,
    /// Who approved the request.
    pub approved_by: Option<String>,
    /// Why the request was rejected.
    pub rejected_reason: Option<String>,
    /// Who cancelled the request.
    pub cancelled_by: Option<String>,
    /// Client idempotency key.
    pub request_key: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: Option<String>,
    /// Last update timestamp (RFC 3339).
    pub updated_at: Option<String>,
}

impl RequestInfo {
    pub(crate) fn from_request(request: &VacationRequest) -> Self {
        Self {
            request_id: request.request_id.unwrap_or_default(),
            employee_id: request.employee_id,
            office_id: request.office_id,
            start_date: request.start_date.to_string(),
            end_date: request.end_date.to_string(),
            days_requested: request.days_requested,
            status: request.status.as_str().to_string(),
            reason: request.reason.clone(),
            approved_by: request.approved_by.clone(),
            rejected_reason: request.rejected_reason.clone(),
            cancelled_by: request.cancelled_by.clone(),
            request_key: request.request_key.clone(),
            created_at: request.created_at.clone(),
            updated_at: request.updated_at.clone(),
        }
    }
}

/// One line of a deduction, restoration or top-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntryInfo {
    /// The cycle identifier, if stored.
    pub cycle_id: Option<i64>,
    /// The cycle's anniversary year.
    pub years_of_service: u16,
    /// The cycle's start date.
    pub cycle_start_date: String,
    /// Days moved.
    pub days: u16,
}

impl PlanEntryInfo {
    /// Rebuilds entries from the moves recorded in an audit event, taking
    /// cycle identity from the employee's current cycles.
    pub(crate) fn from_moves(moves: &[CycleMove], cycles: &[VacationCycle]) -> Vec<Self> {
        moves
            .iter()
            .map(|m| {
                let cycle: Option<&VacationCycle> = cycles
                    .iter()
                    .find(|c| c.years_of_service == m.years_of_service);
                Self {
                    cycle_id: cycle.and_then(|c| c.cycle_id),
                    years_of_service: m.years_of_service,
                    cycle_start_date: cycle
                        .map_or_else(String::new, |c| c.cycle_start_date.to_string()),
                    days: m.days,
                }
            })
            .collect()
    }

    pub(crate) fn from_entries(entries: &[PlanEntry]) -> Vec<Self> {
        entries
            .iter()
            .map(|entry| Self {
                cycle_id: entry.cycle_id,
                years_of_service: entry.years_of_service,
                cycle_start_date: entry.cycle_start_date.to_string(),
                days: entry.days,
            })
            .collect()
    }
}

// ============================================================================
// Employees and cycles
// ============================================================================

/// API request to add an employee to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEmployeeRequest {
    /// The employee's office.
    pub office_id: i64,
    /// The employee's full name.
    pub full_name: String,
    /// The date of hire (ISO 8601).
    pub hire_date: String,
    /// Whether the employee is active. Defaults to active.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// API response for a registered employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEmployeeResponse {
    /// The stored employee.
    pub employee: EmployeeInfo,
    /// A success message.
    pub message: String,
}

/// API response for cycle housekeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureCyclesResponse {
    /// The employee.
    pub employee_id: i64,
    /// Cycles that were created.
    pub created: Vec<CycleInfo>,
    /// Anniversary years of cycles that were marked expired.
    pub newly_expired: Vec<u16>,
    /// The audit event, absent when nothing changed.
    pub event_id: Option<i64>,
    /// A summary message.
    pub message: String,
}

/// API response listing an employee's cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCyclesResponse {
    /// The employee.
    pub employee_id: i64,
    /// The reference date for the active and expired flags.
    pub as_of: String,
    /// Every stored cycle, oldest first.
    pub cycles: Vec<CycleInfo>,
}

/// API response for an employee's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// The employee.
    pub employee_id: i64,
    /// The reference date.
    pub as_of: String,
    /// Sum of `days_available` over active cycles.
    pub available_days: u32,
    /// The cycles contributing to the balance.
    pub active_cycles: Vec<CycleInfo>,
    /// How the current anniversary year's entitlement is derived.
    pub accrual: AccrualBreakdown,
}

// ============================================================================
// Requests
// ============================================================================

/// API request to create a vacation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVacationRequest {
    /// The requesting employee.
    pub employee_id: i64,
    /// First day of leave (ISO 8601).
    pub start_date: String,
    /// Last day of leave (ISO 8601).
    pub end_date: String,
    /// Days to charge.
    pub days_requested: u16,
    /// Free-form reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Client idempotency key. A repeated key returns the recorded request.
    #[serde(default)]
    pub request_key: Option<String>,
    /// Approve and allocate in the same step instead of recording a pending request.
    #[serde(default)]
    pub auto_approve: bool,
    /// Approver for auto-approved requests. Defaults to the acting operator.
    #[serde(default)]
    pub approved_by: Option<String>,
}

/// API request to approve a pending request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequestRequest {
    /// The approver. Defaults to the acting operator.
    #[serde(default)]
    pub approved_by: Option<String>,
}

/// API request to reject a pending request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequestRequest {
    /// Why the request is rejected.
    pub reason: String,
}

/// API request to cancel a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequestRequest {
    /// Proceed even if some days cannot be restored.
    #[serde(default)]
    pub acknowledge_loss: bool,
}

/// API response for request creation and decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationRequestResponse {
    /// The stored request.
    pub request: RequestInfo,
    /// Days deducted by this operation, oldest cycle first.
    pub deductions: Vec<PlanEntryInfo>,
    /// The audit event recording the operation.
    pub event_id: Option<i64>,
    /// Whether the response replays an earlier operation with the same key.
    pub replayed: bool,
    /// A summary message.
    pub message: String,
}

/// API response previewing a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationPreviewResponse {
    /// The request.
    pub request_id: i64,
    /// The request's current status.
    pub status: String,
    /// Days that would return to active cycles, newest first.
    pub restorable: Vec<PlanEntryInfo>,
    /// Days that could only return to expired cycles.
    pub expired: Vec<PlanEntryInfo>,
    /// Days that would be lost.
    pub lost_days: u16,
    /// Days the request holds.
    pub total_requested: u16,
    /// Whether the cancel call must set `acknowledge_loss`.
    pub requires_acknowledgement: bool,
}

/// API response for a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequestResponse {
    /// The cancelled request.
    pub request: RequestInfo,
    /// Days returned to active cycles.
    pub restored: Vec<PlanEntryInfo>,
    /// Days attributed to expired cycles.
    pub expired: Vec<PlanEntryInfo>,
    /// Days lost.
    pub lost_days: u16,
    /// The audit event recording the cancellation.
    pub event_id: i64,
    /// A summary message.
    pub message: String,
}

/// API response listing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequestsResponse {
    /// The requests, oldest first.
    pub requests: Vec<RequestInfo>,
}

/// One request moved by the date-driven status advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedRequestInfo {
    /// The request.
    pub request_id: i64,
    /// Its new status.
    pub status: String,
}

/// API response for the date-driven status advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRequestStatusesResponse {
    /// The employee.
    pub employee_id: i64,
    /// Requests that moved.
    pub advanced: Vec<AdvancedRequestInfo>,
    /// The audit event, absent when nothing changed.
    pub event_id: Option<i64>,
    /// A summary message.
    pub message: String,
}

// ============================================================================
// Adjustments
// ============================================================================

/// API request to top up an employee's oldest active cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDaysRequest {
    /// Days to add.
    pub days: u16,
    /// Mandatory justification.
    pub reason: String,
    /// Idempotency key. Generated when absent.
    #[serde(default)]
    pub operation_key: Option<String>,
}

/// API request to claw back days.
///
/// The amount is either `{"mode": "absolute", "days": n}` or
/// `{"mode": "target_remaining", "target": t}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDaysRequest {
    /// How the amount is expressed.
    #[serde(flatten)]
    pub mode: RemovalMode,
    /// Mandatory justification.
    pub reason: String,
    /// Idempotency key. Generated when absent.
    #[serde(default)]
    pub operation_key: Option<String>,
}

/// API response for an adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentResponse {
    /// The employee.
    pub employee_id: i64,
    /// The idempotency key the adjustment is recorded under.
    pub operation_key: String,
    /// The audit event recording the adjustment.
    pub event_id: Option<i64>,
    /// Cycles touched. On replay, rebuilt from the audit record.
    pub entries: Vec<PlanEntryInfo>,
    /// Days added or removed.
    pub days: u16,
    /// Active balance after the adjustment.
    pub balance: u32,
    /// Whether the response replays an earlier operation with the same key.
    pub replayed: bool,
    /// A summary message.
    pub message: String,
}

// ============================================================================
// Audit
// ============================================================================

/// An audit event as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    /// The event identifier.
    pub event_id: i64,
    /// The operation's idempotency key, if any.
    pub operation_key: Option<String>,
    /// Who performed the operation.
    pub actor_id: String,
    /// The actor's type.
    pub actor_type: String,
    /// Why the operation was performed.
    pub cause_id: String,
    /// Description of the cause.
    pub cause_description: String,
    /// The command name.
    pub action: String,
    /// What the command did.
    pub details: Option<String>,
    /// Ledger summary before the operation.
    pub before: String,
    /// Ledger summary after the operation.
    pub after: String,
    /// When the event was recorded (RFC 3339).
    pub recorded_at: Option<String>,
}

impl AuditEventInfo {
    pub(crate) fn from_event(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id.unwrap_or_default(),
            operation_key: event.operation_key.clone(),
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            action: event.action.name.clone(),
            details: event.action.details.clone(),
            before: event.before.data.clone(),
            after: event.after.data.clone(),
            recorded_at: event.recorded_at.clone(),
        }
    }
}

/// API response for an employee's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineResponse {
    /// The employee.
    pub employee_id: i64,
    /// Events in the order they were recorded.
    pub events: Vec<AuditEventInfo>,
}
