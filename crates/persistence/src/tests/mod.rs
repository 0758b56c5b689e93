// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod request_tests;
mod transition_tests;

use crate::{PersistTransitionResult, SqlitePersistence};
use time::Date;
use time::macros::date;
use vacation_ledger::{Command, LedgerState, TransitionResult, apply};
use vacation_ledger_audit::{Actor, Cause};
use vacation_ledger_domain::{Employee, VacationCycle, VacationRequest};

/// Years 3 and 4 are open on this date for [`create_test_employee`].
pub const AS_OF: Date = date!(2024 - 06 - 01);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("hr-ops-1"), String::from("operator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("ticket-100"), String::from("Operator request"))
}

/// Unsaved employee of office 2, hired 2020-03-15.
pub fn create_test_employee() -> Employee {
    Employee::new(2, String::from("Ana Ruiz"), date!(2020 - 03 - 15))
}

/// A fresh store holding one employee and no cycles.
pub fn create_persistence_with_employee() -> (SqlitePersistence, i64) {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    let employee_id: i64 = persistence
        .insert_employee(&create_test_employee())
        .unwrap();
    (persistence, employee_id)
}

/// A store whose employee has had cycle housekeeping committed for [`AS_OF`].
pub fn create_synced_persistence() -> (SqlitePersistence, i64) {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    apply_and_persist(&mut persistence, employee_id, Command::EnsureCycles);
    (persistence, employee_id)
}

/// Applies a command to the stored ledger without persisting the result.
pub fn apply_to_stored(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    command: Command,
) -> TransitionResult {
    let state: LedgerState = persistence.load_ledger_state(employee_id).unwrap();
    apply(
        &state,
        command,
        create_test_actor(),
        create_test_cause(),
        AS_OF,
    )
    .unwrap()
}

/// Applies a command to the stored ledger and commits it.
pub fn apply_and_persist(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    command: Command,
) -> PersistTransitionResult {
    let result: TransitionResult = apply_to_stored(persistence, employee_id, command);
    persistence.persist_transition(&result).unwrap()
}

pub fn create_test_request(employee_id: i64, start: Date, end: Date, days: u16) -> VacationRequest {
    VacationRequest::new(employee_id, 2, start, end, days)
}

pub fn cycle_by_year(cycles: &[VacationCycle], years: u16) -> &VacationCycle {
    cycles
        .iter()
        .find(|c| c.years_of_service == years)
        .unwrap()
}
