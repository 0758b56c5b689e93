// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the vacation-cycle ledger.
//!
//! This crate turns API requests into core commands, runs them against the
//! store and turns the outcome back into API responses. It owns the error
//! contract ([`ApiError`]) and the conflict-retry and idempotency rules:
//!
//! - every mutation reloads the employee's ledger, applies one command and
//!   commits the transition; a version conflict triggers a bounded number of
//!   re-applications before surfacing as [`ApiError::Conflict`]
//! - request keys and adjustment operation keys are unique; repeating a key
//!   returns the recorded outcome with `replayed: true`
//!
//! Handlers are synchronous and take the store by `&mut`. Per-employee
//! serialization of mutations is the caller's concern.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod execute;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use execute::{
    DEFAULT_MAX_CONFLICT_RETRIES, Execution, OperationContext, execute_command,
    execute_with_retry, generate_operation_key,
};
pub use handlers::{
    add_days, advance_request_statuses, approve_request, cancel_request, create_request,
    employee_for_request, ensure_cycles_up_to_date, get_audit_timeline, get_balance,
    get_employee, list_cycles, list_employees, list_requests_for_employee,
    list_requests_for_office, preview_cancellation, register_employee, reject_request,
    remove_days,
};
pub use request_response::{
    AddDaysRequest, AdjustmentResponse, AdvanceRequestStatusesResponse, AdvancedRequestInfo,
    ApproveRequestRequest, AuditEventInfo, AuditTimelineResponse, BalanceResponse,
    CancelRequestRequest, CancelRequestResponse, CancellationPreviewResponse,
    CreateVacationRequest, CycleInfo, EmployeeInfo, EnsureCyclesResponse, ListCyclesResponse,
    ListRequestsResponse, PlanEntryInfo, RegisterEmployeeRequest, RegisterEmployeeResponse,
    RejectRequestRequest, RemoveDaysRequest, RequestInfo, VacationRequestResponse,
};
