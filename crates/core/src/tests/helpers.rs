// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, LedgerState, TransitionResult, apply};
use time::Date;
use time::macros::date;
use vacation_ledger_audit::{Actor, Cause};
use vacation_ledger_domain::{Employee, VacationCycle, VacationRequest};

/// Reference date used by most tests: years 3 and 4 are open for [`create_test_employee`].
pub const AS_OF: Date = date!(2024 - 06 - 01);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("hr-ops-1"), String::from("operator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("ticket-100"), String::from("Operator request"))
}

/// Persisted employee hired 2020-03-15.
pub fn create_test_employee() -> Employee {
    Employee::with_id(7, 2, String::from("Ana Ruiz"), date!(2020 - 03 - 15), true)
}

/// Ledger state after cycle housekeeping with persisted ids assigned, as the
/// store would return it.
pub fn create_synced_state() -> LedgerState {
    let state: LedgerState = LedgerState::new(create_test_employee(), Vec::new(), Vec::new());
    let result: TransitionResult = apply(
        &state,
        Command::EnsureCycles,
        create_test_actor(),
        create_test_cause(),
        AS_OF,
    )
    .unwrap();
    persisted(result.new_state)
}

/// Assigns ids to unsaved cycles and requests, as the store does on commit.
pub fn persisted(mut state: LedgerState) -> LedgerState {
    let mut next_cycle_id: i64 = state
        .cycles
        .iter()
        .filter_map(|c| c.cycle_id)
        .max()
        .unwrap_or(0);
    for cycle in &mut state.cycles {
        if cycle.cycle_id.is_none() {
            next_cycle_id += 1;
            cycle.cycle_id = Some(next_cycle_id);
        }
    }
    let mut next_request_id: i64 = state
        .requests
        .iter()
        .filter_map(|r| r.request_id)
        .max()
        .unwrap_or(0);
    for request in &mut state.requests {
        if request.request_id.is_none() {
            next_request_id += 1;
            request.request_id = Some(next_request_id);
        }
    }
    state
}

pub fn create_test_request(start: Date, end: Date, days: u16) -> VacationRequest {
    VacationRequest::new(7, 2, start, end, days)
}

pub fn cycle_by_year(state: &LedgerState, years: u16) -> &VacationCycle {
    state
        .cycles
        .iter()
        .find(|c| c.years_of_service == years)
        .unwrap()
}
