// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use futures::future::join_all;
use serde_json::json;
use std::time::Duration;
use tokio::sync::{MutexGuard, OwnedMutexGuard};
use tokio::time::Instant;
use vacation_ledger_api::{AdjustmentResponse, BalanceResponse};
use vacation_ledger_persistence::SqlitePersistence;

use super::helpers::{
    AS_OF, allocation_body, create_app_state_with, get_ok, operator_request,
    register_synced_employee, send, send_ok,
};
use crate::AppState;
use crate::config::LedgerConfig;
use crate::error::ErrorResponse;
use crate::routes::build_router;

#[tokio::test]
async fn test_concurrent_allocations_never_overdraw() {
    let app: Router = build_router(create_app_state_with(LedgerConfig::default()));
    let employee_id: i64 = register_synced_employee(&app).await;
    let trimmed: AdjustmentResponse = send_ok(
        &app,
        operator_request(
            "POST",
            &format!("/employees/{employee_id}/adjustments/remove"),
            AS_OF,
            Some(&json!({
                "mode": "target_remaining",
                "target": 5,
                "reason": "Payroll correction",
            })),
        ),
    )
    .await;
    assert_eq!(trimmed.balance, 5);

    let body: serde_json::Value = allocation_body(employee_id, 5);
    let results: Vec<(StatusCode, Vec<u8>)> = join_all(
        (0..2).map(|_| send(&app, operator_request("POST", "/requests", AS_OF, Some(&body)))),
    )
    .await;

    let successes: usize = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .count();
    let rejected: usize = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::UNPROCESSABLE_ENTITY)
        .count();
    assert_eq!(successes, 1);
    assert_eq!(rejected, 1);

    let balance: BalanceResponse = get_ok(
        &app,
        &format!("/employees/{employee_id}/balance?as_of={AS_OF}"),
    )
    .await;
    assert_eq!(balance.available_days, 0);
}

#[tokio::test]
async fn test_held_employee_lock_yields_busy() {
    let app_state: AppState = create_app_state_with(LedgerConfig::new(50, 3));
    let app: Router = build_router(app_state.clone());
    let employee_id: i64 = register_synced_employee(&app).await;

    let _held: OwnedMutexGuard<()> = app_state
        .locks
        .acquire(employee_id, Instant::now() + Duration::from_secs(1))
        .await
        .unwrap();
    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "POST",
            &format!("/employees/{employee_id}/adjustments/add"),
            AS_OF,
            Some(&json!({ "days": 1, "reason": "Holiday worked" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.kind, "busy");
}

#[tokio::test]
async fn test_reads_do_not_wait_for_employee_lock() {
    let app_state: AppState = create_app_state_with(LedgerConfig::new(50, 3));
    let app: Router = build_router(app_state.clone());
    let employee_id: i64 = register_synced_employee(&app).await;

    let _held: OwnedMutexGuard<()> = app_state
        .locks
        .acquire(employee_id, Instant::now() + Duration::from_secs(1))
        .await
        .unwrap();
    let balance: BalanceResponse = get_ok(
        &app,
        &format!("/employees/{employee_id}/balance?as_of={AS_OF}"),
    )
    .await;

    assert_eq!(balance.available_days, 34);
}

fn add_one_day(employee_id: i64) -> Request<Body> {
    operator_request(
        "POST",
        &format!("/employees/{employee_id}/adjustments/add"),
        AS_OF,
        Some(&json!({ "days": 1, "reason": "Holiday worked" })),
    )
}

#[tokio::test]
async fn test_mutation_gives_up_when_store_is_held() {
    let app_state: AppState = create_app_state_with(LedgerConfig::new(50, 3));
    let app: Router = build_router(app_state.clone());
    let employee_id: i64 = register_synced_employee(&app).await;

    let _store: MutexGuard<'_, SqlitePersistence> = app_state.persistence.lock().await;
    let started: Instant = Instant::now();
    let (status, body): (StatusCode, Vec<u8>) = send(&app, add_one_day(employee_id)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.kind, "busy");
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_read_gives_up_when_store_is_held() {
    let app_state: AppState = create_app_state_with(LedgerConfig::new(50, 3));
    let app: Router = build_router(app_state.clone());
    let employee_id: i64 = register_synced_employee(&app).await;

    let _store: MutexGuard<'_, SqlitePersistence> = app_state.persistence.lock().await;
    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "GET",
            &format!("/employees/{employee_id}/balance?as_of={AS_OF}"),
            AS_OF,
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.kind, "busy");
}

#[tokio::test]
async fn test_other_employees_mutate_while_one_is_locked() {
    let app_state: AppState = create_app_state_with(LedgerConfig::new(50, 3));
    let app: Router = build_router(app_state.clone());
    let locked: i64 = register_synced_employee(&app).await;
    let free: i64 = register_synced_employee(&app).await;

    let _held: OwnedMutexGuard<()> = app_state
        .locks
        .acquire(locked, Instant::now() + Duration::from_secs(1))
        .await
        .unwrap();
    let topped_up: AdjustmentResponse = send_ok(&app, add_one_day(free)).await;

    assert_eq!(topped_up.balance, 35);
}
