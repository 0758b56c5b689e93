// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{
    apply_and_persist, create_persistence_with_employee, create_synced_persistence,
    create_test_request,
};
use crate::{PersistenceError, SqlitePersistence};
use time::macros::date;
use vacation_ledger::Command;
use vacation_ledger_domain::{AllocationShare, Employee, RequestStatus, VacationRequest};

fn july_request(employee_id: i64) -> VacationRequest {
    let mut request: VacationRequest =
        create_test_request(employee_id, date!(2024 - 07 - 01), date!(2024 - 07 - 05), 5);
    request.reason = Some(String::from("Family trip"));
    request
}

#[test]
fn test_insert_and_get_request() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();

    let request_id: i64 = persistence.insert_request(&july_request(employee_id)).unwrap();
    let stored: VacationRequest = persistence.get_request(request_id).unwrap();

    assert_eq!(stored.request_id, Some(request_id));
    assert_eq!(stored.employee_id, employee_id);
    assert_eq!(stored.start_date, date!(2024 - 07 - 01));
    assert_eq!(stored.end_date, date!(2024 - 07 - 05));
    assert_eq!(stored.days_requested, 5);
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(stored.reason.as_deref(), Some("Family trip"));
    assert!(stored.created_at.is_some());
    assert_eq!(stored.created_at, stored.updated_at);
}

#[test]
fn test_get_missing_request() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();

    let result: Result<VacationRequest, PersistenceError> = persistence.get_request(404);

    assert_eq!(result, Err(PersistenceError::RequestNotFound(404)));
}

#[test]
fn test_request_key_is_unique() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    let mut request: VacationRequest = july_request(employee_id);
    request.request_key = Some(String::from("req-7f3a"));

    persistence.insert_request(&request).unwrap();
    let result: Result<i64, PersistenceError> = persistence.insert_request(&request);

    assert!(matches!(result, Err(PersistenceError::DuplicateOperation(_))));
    assert_eq!(
        persistence
            .list_requests_for_employee(employee_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_find_request_by_key() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    let mut request: VacationRequest = july_request(employee_id);
    request.request_key = Some(String::from("req-7f3a"));
    let request_id: i64 = persistence.insert_request(&request).unwrap();

    let found: Option<VacationRequest> = persistence.find_request_by_key("req-7f3a").unwrap();
    let missing: Option<VacationRequest> = persistence.find_request_by_key("req-none").unwrap();

    assert_eq!(found.and_then(|r| r.request_id), Some(request_id));
    assert!(missing.is_none());
}

#[test]
fn test_list_requests_by_office_and_employee() {
    let (mut persistence, ana): (SqlitePersistence, i64) = create_persistence_with_employee();
    let bo: i64 = persistence
        .insert_employee(&Employee::new(
            9,
            String::from("Bo Lindqvist"),
            date!(2018 - 11 - 30),
        ))
        .unwrap();
    persistence.insert_request(&july_request(ana)).unwrap();
    let mut other_office: VacationRequest =
        VacationRequest::new(bo, 9, date!(2024 - 08 - 01), date!(2024 - 08 - 02), 2);
    other_office.status = RequestStatus::Approved;
    persistence.insert_request(&other_office).unwrap();

    assert_eq!(persistence.list_requests_for_office(2).unwrap().len(), 1);
    assert_eq!(persistence.list_requests_for_office(9).unwrap().len(), 1);
    assert_eq!(persistence.list_requests_for_employee(ana).unwrap().len(), 1);
    let bos: Vec<VacationRequest> = persistence.list_requests_for_employee(bo).unwrap();
    assert_eq!(bos[0].status, RequestStatus::Approved);
}

#[test]
fn test_cancel_request_is_guarded_by_status() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    let request_id: i64 = persistence.insert_request(&july_request(employee_id)).unwrap();

    persistence
        .cancel_request(request_id, RequestStatus::Pending, "hr-ops-1")
        .unwrap();
    let again: Result<(), PersistenceError> =
        persistence.cancel_request(request_id, RequestStatus::Pending, "hr-ops-1");

    assert!(matches!(again, Err(PersistenceError::VersionConflict(_))));
    let stored: VacationRequest = persistence.get_request(request_id).unwrap();
    assert_eq!(stored.status, RequestStatus::Cancelled);
    assert_eq!(stored.cancelled_by.as_deref(), Some("hr-ops-1"));
}

#[test]
fn test_store_rejects_inverted_dates() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    let inverted: VacationRequest =
        create_test_request(employee_id, date!(2024 - 07 - 05), date!(2024 - 07 - 01), 1);

    let result: Result<i64, PersistenceError> = persistence.insert_request(&inverted);

    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
}

#[test]
fn test_allocation_is_stored_with_the_request() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    let mut request: VacationRequest = july_request(employee_id);
    request.status = RequestStatus::Approved;
    request.allocation = vec![
        AllocationShare {
            years_of_service: 3,
            days: 2,
        },
        AllocationShare {
            years_of_service: 4,
            days: 3,
        },
    ];

    let request_id: i64 = persistence.insert_request(&request).unwrap();
    let stored: VacationRequest = persistence.get_request(request_id).unwrap();

    assert_eq!(stored.allocation, request.allocation);
}

#[test]
fn test_approval_writes_allocation_to_pending_row() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();
    let request: VacationRequest =
        create_test_request(employee_id, date!(2024 - 12 - 02), date!(2024 - 12 - 31), 20);
    apply_and_persist(
        &mut persistence,
        employee_id,
        Command::SubmitRequest { request },
    );
    let pending: VacationRequest = persistence
        .list_requests_for_employee(employee_id)
        .unwrap()
        .remove(0);
    assert!(pending.allocation.is_empty());
    let request_id: i64 = pending.request_id.unwrap();

    apply_and_persist(
        &mut persistence,
        employee_id,
        Command::ApproveRequest {
            request_id,
            approved_by: String::from("manager-1"),
        },
    );

    let approved: VacationRequest = persistence.get_request(request_id).unwrap();
    let drawn: Vec<(u16, u16)> = approved
        .allocation
        .iter()
        .map(|s| (s.years_of_service, s.days))
        .collect();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(drawn, vec![(3, 16), (4, 4)]);
}
