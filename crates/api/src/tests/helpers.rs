// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use time::Date;
use time::macros::date;
use vacation_ledger_audit::{Actor, Cause};
use vacation_ledger_persistence::SqlitePersistence;

use crate::{
    CreateVacationRequest, OperationContext, RegisterEmployeeRequest, RegisterEmployeeResponse,
    ensure_cycles_up_to_date, register_employee,
};

/// Service years 3 (16 days) and 4 (18 days) are open on this date for the
/// employee from [`create_register_request`]; the balance is 34.
pub const AS_OF: Date = date!(2024 - 06 - 01);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("hr-ops-1"), String::from("operator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("ticket-200"), String::from("Operator request"))
}

pub fn create_test_context() -> OperationContext {
    create_context_on(AS_OF)
}

pub fn create_context_on(as_of: Date) -> OperationContext {
    OperationContext::new(create_test_actor(), create_test_cause(), as_of)
}

/// An active employee of office 2 hired 2020-03-15.
pub fn create_register_request() -> RegisterEmployeeRequest {
    RegisterEmployeeRequest {
        office_id: 2,
        full_name: String::from("Ana Ruiz"),
        hire_date: String::from("2020-03-15"),
        is_active: None,
    }
}

/// A fresh store holding one employee and no cycles.
pub fn create_persistence_with_employee() -> (SqlitePersistence, i64) {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    let response: RegisterEmployeeResponse =
        register_employee(&mut persistence, create_register_request()).unwrap();
    (persistence, response.employee.employee_id)
}

/// A store whose employee has cycles for service years 3 and 4.
pub fn create_synced_persistence() -> (SqlitePersistence, i64) {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    ensure_cycles_up_to_date(&mut persistence, employee_id, &create_test_context()).unwrap();
    (persistence, employee_id)
}

/// A request for `days` days between 2024-07-01 and 2024-08-15.
pub fn create_vacation_request(
    employee_id: i64,
    days: u16,
    auto_approve: bool,
) -> CreateVacationRequest {
    CreateVacationRequest {
        employee_id,
        start_date: String::from("2024-07-01"),
        end_date: String::from("2024-08-15"),
        days_requested: days,
        reason: Some(String::from("Summer leave")),
        request_key: None,
        auto_approve,
        approved_by: None,
    }
}
