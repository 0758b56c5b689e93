// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Manual top-ups and claw-backs.

use vacation_ledger_domain::RemovalMode;
use vacation_ledger_persistence::SqlitePersistence;

use crate::{
    AddDaysRequest, AdjustmentResponse, ApiError, RegisterEmployeeRequest, RemoveDaysRequest,
    add_days, register_employee, remove_days,
};

use super::helpers::{create_register_request, create_synced_persistence, create_test_context};

fn top_up(days: u16) -> AddDaysRequest {
    AddDaysRequest {
        days,
        reason: String::from("Overtime compensation"),
        operation_key: None,
    }
}

fn claw_back(mode: RemovalMode) -> RemoveDaysRequest {
    RemoveDaysRequest {
        mode,
        reason: String::from("Payroll correction"),
        operation_key: None,
    }
}

fn years_and_days(response: &AdjustmentResponse) -> Vec<(u16, u16)> {
    response
        .entries
        .iter()
        .map(|e| (e.years_of_service, e.days))
        .collect()
}

// ============================================================================
// Top-up
// ============================================================================

#[test]
fn test_add_days_tops_up_oldest_active_cycle() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let response: AdjustmentResponse =
        add_days(&mut persistence, employee_id, top_up(3), &create_test_context()).unwrap();

    assert_eq!(years_and_days(&response), vec![(3, 3)]);
    assert_eq!(response.balance, 37);
    assert!(response.operation_key.starts_with("adj_"));
    assert!(response.event_id.is_some());
    assert!(!response.replayed);

    let cycles = persistence.read_cycles(employee_id).unwrap();
    assert_eq!(cycles[0].days_earned, 19);
    assert_eq!(cycles[0].days_available, 19);
}

#[test]
fn test_add_days_rejects_zero_and_blank_reason() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let zero: Result<AdjustmentResponse, ApiError> =
        add_days(&mut persistence, employee_id, top_up(0), &create_test_context());
    assert!(matches!(
        zero,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "days"
    ));

    let blank: Result<AdjustmentResponse, ApiError> = add_days(
        &mut persistence,
        employee_id,
        AddDaysRequest {
            reason: String::from("  "),
            ..top_up(2)
        },
        &create_test_context(),
    );
    assert!(matches!(
        blank,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "reason"
    ));
}

#[test]
fn test_add_days_without_active_cycle_is_invalid_operation() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    // Hired this year: no anniversary reached, so no cycle exists
    let request: RegisterEmployeeRequest = RegisterEmployeeRequest {
        hire_date: String::from("2024-01-10"),
        ..create_register_request()
    };
    let employee_id: i64 = register_employee(&mut persistence, request)
        .unwrap()
        .employee
        .employee_id;

    let result: Result<AdjustmentResponse, ApiError> =
        add_days(&mut persistence, employee_id, top_up(2), &create_test_context());

    assert!(matches!(
        result,
        Err(ApiError::InvalidOperation { hint: Some(_), .. })
    ));
}

#[test]
fn test_add_days_to_inactive_employee_is_rejected() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    let request: RegisterEmployeeRequest = RegisterEmployeeRequest {
        is_active: Some(false),
        ..create_register_request()
    };
    let employee_id: i64 = register_employee(&mut persistence, request)
        .unwrap()
        .employee
        .employee_id;

    let result: Result<AdjustmentResponse, ApiError> =
        add_days(&mut persistence, employee_id, top_up(2), &create_test_context());

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "active_employee"
    ));
}

// ============================================================================
// Claw-back
// ============================================================================

#[test]
fn test_remove_absolute_takes_oldest_first() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let response: AdjustmentResponse = remove_days(
        &mut persistence,
        employee_id,
        claw_back(RemovalMode::Absolute { days: 20 }),
        &create_test_context(),
    )
    .unwrap();

    assert_eq!(years_and_days(&response), vec![(3, 16), (4, 4)]);
    assert_eq!(response.days, 20);
    assert_eq!(response.balance, 14);
}

#[test]
fn test_remove_absolute_beyond_balance_is_insufficient() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let result: Result<AdjustmentResponse, ApiError> = remove_days(
        &mut persistence,
        employee_id,
        claw_back(RemovalMode::Absolute { days: 40 }),
        &create_test_context(),
    );

    assert_eq!(
        result,
        Err(ApiError::InsufficientDays {
            requested: 40,
            available: 34,
            shortfall: 6,
        })
    );
}

#[test]
fn test_remove_to_target_takes_the_difference() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let response: AdjustmentResponse = remove_days(
        &mut persistence,
        employee_id,
        claw_back(RemovalMode::TargetRemaining { target: 10 }),
        &create_test_context(),
    )
    .unwrap();

    assert_eq!(years_and_days(&response), vec![(3, 16), (4, 8)]);
    assert_eq!(response.days, 24);
    assert_eq!(response.balance, 10);
}

#[test]
fn test_remove_to_current_balance_is_a_noop() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let response: AdjustmentResponse = remove_days(
        &mut persistence,
        employee_id,
        claw_back(RemovalMode::TargetRemaining { target: 34 }),
        &create_test_context(),
    )
    .unwrap();

    assert!(response.entries.is_empty());
    assert_eq!(response.days, 0);
    assert_eq!(response.balance, 34);
}

#[test]
fn test_remove_to_higher_target_points_to_top_up() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let result: Result<AdjustmentResponse, ApiError> = remove_days(
        &mut persistence,
        employee_id,
        claw_back(RemovalMode::TargetRemaining { target: 40 }),
        &create_test_context(),
    );

    let Err(ApiError::InvalidOperation { hint, .. }) = result else {
        panic!("expected InvalidOperation, got {result:?}");
    };
    assert!(hint.unwrap().contains("top-up"));
}
