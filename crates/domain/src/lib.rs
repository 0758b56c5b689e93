// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod accrual;
mod adjustment;
mod allocation;
mod cycles;
mod error;
mod restoration;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use accrual::{
    AccrualBreakdown, CYCLE_WINDOW_MONTHS, add_months, anniversary, cycle_window,
    entitlement_for_years, explain_entitlement, parse_date, years_of_service,
};
pub use adjustment::{
    RemovalMode, RemovalPlan, apply_removal, apply_top_up, plan_removal, plan_top_up,
};
pub use allocation::{AllocationPlan, apply_allocation, plan_allocation};
pub use cycles::{
    CycleSync, apply_cycle_sync, available_balance, expected_cycles, plan_cycle_sync,
    sort_cycles, validate_cycles,
};
pub use error::DomainError;
pub use restoration::{
    RestorationPlan, apply_restoration, plan_request_restoration, plan_restoration,
};
pub use types::{
    AllocationShare, Employee, PlanEntry, RequestStatus, VacationCycle, VacationRequest,
};
pub use validation::{
    validate_employee_fields, validate_reason, validate_request_fields,
    validate_status_transition,
};
