// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use vacation_ledger_api::{
    AdjustmentResponse, AuditTimelineResponse, BalanceResponse, CancelRequestResponse,
    CancellationPreviewResponse, EmployeeInfo, ListCyclesResponse, ListRequestsResponse,
    VacationRequestResponse,
};

use super::helpers::{
    AS_OF, allocation_body, create_test_app, get_ok, operator_request, register_synced_employee,
    send, send_ok,
};
use crate::error::ErrorResponse;
use crate::routes::ListEmployeesResponse;

fn error_kind(body: &[u8]) -> String {
    let error: ErrorResponse = serde_json::from_slice(body).unwrap();
    assert!(error.error);
    error.kind
}

#[tokio::test]
async fn test_register_and_read_employee() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;

    let employee: EmployeeInfo = get_ok(&app, &format!("/employees/{employee_id}")).await;
    assert_eq!(employee.full_name, "Ana Ruiz");
    assert_eq!(employee.hire_date, "2020-03-15");
    assert!(employee.is_active);

    let listed: ListEmployeesResponse = get_ok(&app, "/employees").await;
    assert_eq!(listed.employees.len(), 1);
}

#[tokio::test]
async fn test_unknown_employee_is_not_found() {
    let app: Router = create_test_app();

    let request: Request<Body> = Request::builder()
        .uri("/employees/999")
        .body(Body::empty())
        .unwrap();
    let (status, body): (StatusCode, Vec<u8>) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_kind(&body), "not_found");
}

#[tokio::test]
async fn test_invalid_registration_is_bad_request() {
    let app: Router = create_test_app();
    let body: serde_json::Value = json!({
        "office_id": 2,
        "full_name": "Ana Ruiz",
        "hire_date": "15/03/2020",
    });

    let (status, response): (StatusCode, Vec<u8>) =
        send(&app, operator_request("POST", "/employees", AS_OF, Some(&body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&response), "invalid_input");
}

#[tokio::test]
async fn test_cycles_and_balance_reads() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;

    let cycles: ListCyclesResponse = get_ok(
        &app,
        &format!("/employees/{employee_id}/cycles?as_of={AS_OF}"),
    )
    .await;
    let years: Vec<u16> = cycles.cycles.iter().map(|c| c.years_of_service).collect();
    assert_eq!(years, vec![3, 4]);

    let balance: BalanceResponse = get_ok(
        &app,
        &format!("/employees/{employee_id}/balance?as_of={AS_OF}"),
    )
    .await;
    assert_eq!(balance.available_days, 34);
    assert_eq!(balance.accrual.days_earned, 18);
}

#[tokio::test]
async fn test_malformed_as_of_is_bad_request() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;

    let request: Request<Body> = Request::builder()
        .uri(format!("/employees/{employee_id}/balance?as_of=June"))
        .body(Body::empty())
        .unwrap();
    let (status, _): (StatusCode, Vec<u8>) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mutation_without_actor_is_bad_request() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;

    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/requests")
        .header("content-type", "application/json")
        .body(Body::from(allocation_body(employee_id, 5).to_string()))
        .unwrap();
    let (status, body): (StatusCode, Vec<u8>) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(error.message.contains("x-actor-id"));
}

#[tokio::test]
async fn test_create_and_approve_deducts_oldest_first() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;

    let created: VacationRequestResponse = send_ok(
        &app,
        operator_request(
            "POST",
            "/requests",
            AS_OF,
            Some(&allocation_body(employee_id, 20)),
        ),
    )
    .await;

    assert_eq!(created.request.status, "approved");
    assert_eq!(created.request.approved_by.as_deref(), Some("hr-ops-1"));
    let deductions: Vec<(u16, u16)> = created
        .deductions
        .iter()
        .map(|e| (e.years_of_service, e.days))
        .collect();
    assert_eq!(deductions, vec![(3, 16), (4, 4)]);

    let balance: BalanceResponse = get_ok(
        &app,
        &format!("/employees/{employee_id}/balance?as_of={AS_OF}"),
    )
    .await;
    assert_eq!(balance.available_days, 14);

    let by_employee: ListRequestsResponse =
        get_ok(&app, &format!("/employees/{employee_id}/requests")).await;
    let by_office: ListRequestsResponse = get_ok(&app, "/offices/2/requests").await;
    assert_eq!(by_employee.requests.len(), 1);
    assert_eq!(by_office.requests, by_employee.requests);
}

#[tokio::test]
async fn test_insufficient_balance_is_unprocessable() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;

    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "POST",
            "/requests",
            AS_OF,
            Some(&allocation_body(employee_id, 40)),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_kind(&body), "insufficient_days");
}

#[tokio::test]
async fn test_pending_request_approve_and_reject() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;
    let mut pending: serde_json::Value = allocation_body(employee_id, 5);
    pending["auto_approve"] = json!(false);

    let first: VacationRequestResponse =
        send_ok(&app, operator_request("POST", "/requests", AS_OF, Some(&pending))).await;
    let second: VacationRequestResponse =
        send_ok(&app, operator_request("POST", "/requests", AS_OF, Some(&pending))).await;
    assert_eq!(first.request.status, "pending");

    let approved: VacationRequestResponse = send_ok(
        &app,
        operator_request(
            "POST",
            &format!("/requests/{}/approve", first.request.request_id),
            AS_OF,
            Some(&json!({ "approved_by": "manager-7" })),
        ),
    )
    .await;
    assert_eq!(approved.request.status, "approved");
    assert_eq!(approved.request.approved_by.as_deref(), Some("manager-7"));

    let rejected: VacationRequestResponse = send_ok(
        &app,
        operator_request(
            "POST",
            &format!("/requests/{}/reject", second.request.request_id),
            AS_OF,
            Some(&json!({ "reason": "Team coverage" })),
        ),
    )
    .await;
    assert_eq!(rejected.request.status, "rejected");

    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "POST",
            &format!("/requests/{}/approve", second.request.request_id),
            AS_OF,
            Some(&json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_kind(&body), "domain_rule_violation");
}

#[tokio::test]
async fn test_cancellation_with_loss_requires_acknowledgement() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;
    let created: VacationRequestResponse = send_ok(
        &app,
        operator_request(
            "POST",
            "/requests",
            AS_OF,
            Some(&allocation_body(employee_id, 20)),
        ),
    )
    .await;
    let request_id: i64 = created.request.request_id;
    // Service year 3 closes on 2024-09-15
    let later: &str = "2024-10-01";

    let preview: CancellationPreviewResponse = get_ok(
        &app,
        &format!("/requests/{request_id}/cancellation?as_of={later}"),
    )
    .await;
    assert_eq!(preview.lost_days, 16);
    assert!(preview.requires_acknowledgement);

    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "POST",
            &format!("/requests/{request_id}/cancel"),
            later,
            Some(&json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_kind(&body), "confirmation_required");

    let cancelled: CancelRequestResponse = send_ok(
        &app,
        operator_request(
            "POST",
            &format!("/requests/{request_id}/cancel"),
            later,
            Some(&json!({ "acknowledge_loss": true })),
        ),
    )
    .await;
    assert_eq!(cancelled.request.status, "cancelled");
    assert_eq!(cancelled.lost_days, 16);

    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "POST",
            &format!("/requests/{request_id}/cancel"),
            later,
            Some(&json!({ "acknowledge_loss": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(&body), "already_cancelled");
}

#[tokio::test]
async fn test_adjustments_and_audit_trail() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;

    let added: AdjustmentResponse = send_ok(
        &app,
        operator_request(
            "POST",
            &format!("/employees/{employee_id}/adjustments/add"),
            AS_OF,
            Some(&json!({ "days": 3, "reason": "Overtime compensation" })),
        ),
    )
    .await;
    assert_eq!(added.balance, 37);

    let removed: AdjustmentResponse = send_ok(
        &app,
        operator_request(
            "POST",
            &format!("/employees/{employee_id}/adjustments/remove"),
            AS_OF,
            Some(&json!({
                "mode": "target_remaining",
                "target": 10,
                "reason": "Payroll correction",
            })),
        ),
    )
    .await;
    assert_eq!(removed.days, 27);
    assert_eq!(removed.balance, 10);

    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "POST",
            &format!("/employees/{employee_id}/adjustments/remove"),
            AS_OF,
            Some(&json!({
                "mode": "target_remaining",
                "target": 20,
                "reason": "Payroll correction",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_kind(&body), "invalid_operation");

    let timeline: AuditTimelineResponse =
        get_ok(&app, &format!("/employees/{employee_id}/audit")).await;
    let actions: Vec<&str> = timeline
        .events
        .iter()
        .map(|e| e.action.as_str())
        .collect();
    assert_eq!(actions, vec!["EnsureCycles", "AddDays", "RemoveDays"]);
}

#[tokio::test]
async fn test_advance_statuses_over_http() {
    let app: Router = create_test_app();
    let employee_id: i64 = register_synced_employee(&app).await;
    send_ok::<VacationRequestResponse>(
        &app,
        operator_request(
            "POST",
            "/requests",
            AS_OF,
            Some(&allocation_body(employee_id, 5)),
        ),
    )
    .await;

    let (status, body): (StatusCode, Vec<u8>) = send(
        &app,
        operator_request(
            "POST",
            &format!("/employees/{employee_id}/requests/advance"),
            "2024-07-10",
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["advanced"][0]["status"], "in_progress");
}
