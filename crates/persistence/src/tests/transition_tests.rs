// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{
    AS_OF, apply_and_persist, apply_to_stored, create_persistence_with_employee,
    create_synced_persistence, create_test_request, cycle_by_year,
};
use crate::{PersistTransitionResult, PersistenceError, SqlitePersistence};
use time::macros::date;
use vacation_ledger::{Command, TransitionResult};
use vacation_ledger_audit::AuditEvent;
use vacation_ledger_domain::{RequestStatus, VacationCycle, VacationRequest, available_balance};

fn create_and_approve(employee_id: i64, days: u16) -> Command {
    Command::CreateAndApproveRequest {
        request: create_test_request(
            employee_id,
            date!(2024 - 07 - 01),
            date!(2024 - 07 - 20),
            days,
        ),
        approved_by: String::from("lead-1"),
    }
}

#[test]
fn test_ensure_cycles_commits_created_cycles() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();

    let persisted: PersistTransitionResult =
        apply_and_persist(&mut persistence, employee_id, Command::EnsureCycles);

    assert_eq!(persisted.created_cycle_ids.len(), 2);
    let cycles: Vec<VacationCycle> = persistence.read_cycles(employee_id).unwrap();
    let years: Vec<u16> = cycles.iter().map(|c| c.years_of_service).collect();
    assert_eq!(years, vec![3, 4]);
    let timeline: Vec<AuditEvent> = persistence.get_audit_timeline(employee_id).unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].action.name, "EnsureCycles");
}

#[test]
fn test_reloaded_ledger_needs_no_further_housekeeping() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let result: TransitionResult =
        apply_to_stored(&mut persistence, employee_id, Command::EnsureCycles);

    assert!(result.changes.is_empty());
}

#[test]
fn test_create_and_approve_commits_request_and_debit() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    let persisted: PersistTransitionResult =
        apply_and_persist(&mut persistence, employee_id, create_and_approve(employee_id, 5));

    assert_eq!(persisted.request_ids.len(), 1);
    let request: VacationRequest = persistence.get_request(persisted.request_ids[0]).unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert_eq!(request.approved_by.as_deref(), Some("lead-1"));

    let cycles: Vec<VacationCycle> = persistence.read_cycles(employee_id).unwrap();
    assert_eq!(cycle_by_year(&cycles, 3).days_used, 5);
    assert_eq!(cycle_by_year(&cycles, 3).version, 1);
    assert_eq!(cycle_by_year(&cycles, 4).version, 0);
    assert_eq!(available_balance(&cycles, AS_OF), 29);
}

#[test]
fn test_stale_transition_conflicts_and_rolls_back() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();

    // Both computed from the same read
    let first: TransitionResult =
        apply_to_stored(&mut persistence, employee_id, create_and_approve(employee_id, 10));
    let second: TransitionResult =
        apply_to_stored(&mut persistence, employee_id, create_and_approve(employee_id, 10));

    persistence.persist_transition(&first).unwrap();
    let result: Result<PersistTransitionResult, PersistenceError> =
        persistence.persist_transition(&second);

    assert!(matches!(result, Err(PersistenceError::VersionConflict(_))));
    assert_eq!(
        persistence
            .list_requests_for_employee(employee_id)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(persistence.get_audit_timeline(employee_id).unwrap().len(), 2);
    let cycles: Vec<VacationCycle> = persistence.read_cycles(employee_id).unwrap();
    assert_eq!(available_balance(&cycles, AS_OF), 24);
}

#[test]
fn test_concurrent_cycle_creation_conflicts() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) =
        create_persistence_with_employee();
    let first: TransitionResult =
        apply_to_stored(&mut persistence, employee_id, Command::EnsureCycles);
    let second: TransitionResult =
        apply_to_stored(&mut persistence, employee_id, Command::EnsureCycles);

    persistence.persist_transition(&first).unwrap();
    let result: Result<PersistTransitionResult, PersistenceError> =
        persistence.persist_transition(&second);

    assert!(matches!(result, Err(PersistenceError::VersionConflict(_))));
    assert_eq!(persistence.read_cycles(employee_id).unwrap().len(), 2);
    assert_eq!(persistence.get_audit_timeline(employee_id).unwrap().len(), 1);
}

#[test]
fn test_duplicate_operation_key_rolls_back() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();
    let add_days = || Command::AddDays {
        days: 2,
        reason: String::from("Overtime compensation"),
    };

    let mut first: TransitionResult = apply_to_stored(&mut persistence, employee_id, add_days());
    first.audit_event = first
        .audit_event
        .with_operation_key(Some(String::from("adj_1718000000_ab12")));
    persistence.persist_transition(&first).unwrap();

    let mut replay: TransitionResult = apply_to_stored(&mut persistence, employee_id, add_days());
    replay.audit_event = replay
        .audit_event
        .with_operation_key(Some(String::from("adj_1718000000_ab12")));
    let result: Result<PersistTransitionResult, PersistenceError> =
        persistence.persist_transition(&replay);

    assert!(matches!(result, Err(PersistenceError::DuplicateOperation(_))));
    let cycles: Vec<VacationCycle> = persistence.read_cycles(employee_id).unwrap();
    assert_eq!(available_balance(&cycles, AS_OF), 36, "topped up exactly once");
}

#[test]
fn test_cancel_restores_days_and_keeps_the_row() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();
    let created: PersistTransitionResult =
        apply_and_persist(&mut persistence, employee_id, create_and_approve(employee_id, 5));
    let request_id: i64 = created.request_ids[0];

    apply_and_persist(
        &mut persistence,
        employee_id,
        Command::CancelRequest {
            request_id,
            acknowledge_loss: false,
        },
    );

    let request: VacationRequest = persistence.get_request(request_id).unwrap();
    assert_eq!(request.status, RequestStatus::Cancelled);
    assert_eq!(request.cancelled_by.as_deref(), Some("hr-ops-1"));
    let cycles: Vec<VacationCycle> = persistence.read_cycles(employee_id).unwrap();
    assert_eq!(cycle_by_year(&cycles, 3).days_used, 0);
    assert_eq!(cycle_by_year(&cycles, 3).version, 2);
    assert_eq!(available_balance(&cycles, AS_OF), 34);
}

#[test]
fn test_status_write_conflicts_when_request_moved() {
    let (mut persistence, employee_id): (SqlitePersistence, i64) = create_synced_persistence();
    let submitted: PersistTransitionResult = apply_and_persist(
        &mut persistence,
        employee_id,
        Command::SubmitRequest {
            request: create_test_request(
                employee_id,
                date!(2024 - 07 - 01),
                date!(2024 - 07 - 03),
                3,
            ),
        },
    );
    let request_id: i64 = submitted.request_ids[0];

    let reject: TransitionResult = apply_to_stored(
        &mut persistence,
        employee_id,
        Command::RejectRequest {
            request_id,
            reason: String::from("Coverage gap"),
        },
    );
    persistence
        .cancel_request(request_id, RequestStatus::Pending, "hr-ops-2")
        .unwrap();
    let result: Result<PersistTransitionResult, PersistenceError> =
        persistence.persist_transition(&reject);

    assert!(matches!(result, Err(PersistenceError::VersionConflict(_))));
    let request: VacationRequest = persistence.get_request(request_id).unwrap();
    assert_eq!(request.status, RequestStatus::Cancelled);
}
