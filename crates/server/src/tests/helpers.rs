// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, request::Builder},
    response::Response,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;
use vacation_ledger_api::{EnsureCyclesResponse, RegisterEmployeeResponse};
use vacation_ledger_persistence::SqlitePersistence;

use crate::AppState;
use crate::config::LedgerConfig;
use crate::operator::{ACTOR_ID_HEADER, AS_OF_HEADER, CAUSE_DESCRIPTION_HEADER, CAUSE_ID_HEADER};
use crate::routes::build_router;

/// Service years 3 (16 days) and 4 (18 days) are open on this date for the
/// employee from [`register_body`]; the balance is 34.
pub const AS_OF: &str = "2024-06-01";

pub fn create_test_app_state() -> AppState {
    create_app_state_with(LedgerConfig::default())
}

pub fn create_app_state_with(config: LedgerConfig) -> AppState {
    let persistence: SqlitePersistence =
        SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState::new(persistence, config)
}

pub fn create_test_app() -> Router {
    build_router(create_test_app_state())
}

pub fn register_body() -> Value {
    json!({
        "office_id": 2,
        "full_name": "Ana Ruiz",
        "hire_date": "2020-03-15",
    })
}

/// Builds a request carrying the operator headers, acting on `as_of`.
pub fn operator_request(
    method: &str,
    uri: &str,
    as_of: &str,
    body: Option<&Value>,
) -> Request<Body> {
    let builder: Builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_ID_HEADER, "hr-ops-1")
        .header(CAUSE_ID_HEADER, "ticket-200")
        .header(CAUSE_DESCRIPTION_HEADER, "Operator request")
        .header(AS_OF_HEADER, as_of);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends a request and returns the status and the raw body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response: Response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let body_bytes: axum::body::Bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body_bytes.to_vec())
}

/// Sends a request that must succeed and decodes its body.
pub async fn send_ok<T: DeserializeOwned>(app: &Router, request: Request<Body>) -> T {
    let (status, body): (StatusCode, Vec<u8>) = send(app, request).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "unexpected body: {}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).unwrap()
}

pub async fn get_ok<T: DeserializeOwned>(app: &Router, uri: &str) -> T {
    let request: Request<Body> = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send_ok(app, request).await
}

/// Registers the employee from [`register_body`] and brings its cycles up
/// to date on [`AS_OF`].
pub async fn register_synced_employee(app: &Router) -> i64 {
    let registered: RegisterEmployeeResponse = send_ok(
        app,
        operator_request("POST", "/employees", AS_OF, Some(&register_body())),
    )
    .await;
    let employee_id: i64 = registered.employee.employee_id;

    let ensured: EnsureCyclesResponse = send_ok(
        app,
        operator_request(
            "POST",
            &format!("/employees/{employee_id}/cycles/ensure"),
            AS_OF,
            None,
        ),
    )
    .await;
    assert_eq!(ensured.created.len(), 2);
    employee_id
}

pub fn allocation_body(employee_id: i64, days: u16) -> Value {
    json!({
        "employee_id": employee_id,
        "start_date": "2024-07-01",
        "end_date": "2024-08-15",
        "days_requested": days,
        "reason": "Summer leave",
        "auto_approve": true,
    })
}
