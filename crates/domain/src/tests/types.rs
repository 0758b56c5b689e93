// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, RequestStatus, VacationCycle};
use std::str::FromStr;
use time::macros::date;

const ALL_STATUSES: [RequestStatus; 6] = [
    RequestStatus::Pending,
    RequestStatus::Approved,
    RequestStatus::Rejected,
    RequestStatus::InProgress,
    RequestStatus::Completed,
    RequestStatus::Cancelled,
];

#[test]
fn test_request_status_string_round_trip() {
    for status in ALL_STATUSES {
        let parsed: RequestStatus = RequestStatus::from_str(status.as_str()).unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_request_status_rejects_unknown_string() {
    let result: Result<RequestStatus, DomainError> = RequestStatus::from_str("Approved");
    assert_eq!(result, Err(DomainError::InvalidStatus("Approved".to_string())));
}

#[test]
fn test_terminal_statuses_allow_no_transitions() {
    for from in ALL_STATUSES.iter().filter(|s| s.is_terminal()) {
        for to in ALL_STATUSES {
            assert!(!from.can_transition_to(to), "{from} -> {to}");
        }
    }
}

#[test]
fn test_pending_transitions() {
    let pending: RequestStatus = RequestStatus::Pending;
    assert!(pending.can_transition_to(RequestStatus::Approved));
    assert!(pending.can_transition_to(RequestStatus::Rejected));
    assert!(pending.can_transition_to(RequestStatus::Cancelled));
    assert!(!pending.can_transition_to(RequestStatus::InProgress));
    assert!(!pending.can_transition_to(RequestStatus::Completed));
}

#[test]
fn test_only_approved_and_in_progress_hold_days() {
    let holders: Vec<RequestStatus> = ALL_STATUSES
        .into_iter()
        .filter(RequestStatus::holds_allocation)
        .collect();
    assert_eq!(
        holders,
        vec![RequestStatus::Approved, RequestStatus::InProgress]
    );
}

#[test]
fn test_cycle_activity_window_is_inclusive() {
    let cycle: VacationCycle =
        VacationCycle::new(1, 1, date!(2024 - 01 - 10), date!(2025 - 07 - 10), 12);

    assert!(!cycle.is_active_on(date!(2024 - 01 - 09)));
    assert!(cycle.is_active_on(date!(2024 - 01 - 10)));
    assert!(cycle.is_active_on(date!(2025 - 07 - 10)));
    assert!(!cycle.is_active_on(date!(2025 - 07 - 11)));
    assert!(cycle.is_expired_on(date!(2025 - 07 - 11)));
}

#[test]
fn test_new_cycle_is_unused_and_consistent() {
    let cycle: VacationCycle =
        VacationCycle::new(1, 3, date!(2024 - 01 - 10), date!(2025 - 07 - 10), 16);
    assert_eq!(cycle.days_used, 0);
    assert_eq!(cycle.days_available, 16);
    assert_eq!(cycle.restorable_headroom(), 0);
    assert!(cycle.satisfies_invariant());
    assert!(cycle.cycle_id.is_none());
}
