// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vacation_ledger::CoreError;
use vacation_ledger_domain::{DomainError, RequestStatus, RestorationPlan};
use vacation_ledger_persistence::PersistenceError;

use crate::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};

#[test]
fn test_error_kinds_are_stable() {
    let cases: Vec<(ApiError, &str)> = vec![
        (
            ApiError::InvalidInput {
                field: String::from("days"),
                message: String::from("zero"),
            },
            "invalid_input",
        ),
        (
            ApiError::InsufficientDays {
                requested: 5,
                available: 2,
                shortfall: 3,
            },
            "insufficient_days",
        ),
        (ApiError::AlreadyCancelled { request_id: 4 }, "already_cancelled"),
        (
            ApiError::ConfirmationRequired {
                request_id: 4,
                lost_days: 2,
            },
            "confirmation_required",
        ),
        (
            ApiError::Busy {
                message: String::from("locked"),
            },
            "busy",
        ),
    ];

    for (err, kind) in cases {
        assert_eq!(err.kind(), kind);
    }
}

#[test]
fn test_display_includes_shortfall_and_hint() {
    let insufficient: ApiError = ApiError::InsufficientDays {
        requested: 40,
        available: 34,
        shortfall: 6,
    };
    assert_eq!(
        insufficient.to_string(),
        "Insufficient vacation days: requested 40, available 34 (short by 6)"
    );

    let invalid: ApiError = ApiError::InvalidOperation {
        message: String::from("no cycle"),
        hint: Some(String::from("sync first")),
    };
    assert_eq!(invalid.to_string(), "Invalid operation: no cycle (sync first)");
}

#[test]
fn test_insufficient_days_keeps_figures() {
    let err: ApiError = translate_domain_error(DomainError::InsufficientDays {
        requested: 10,
        available: 4,
        shortfall: 6,
    });

    assert_eq!(
        err,
        ApiError::InsufficientDays {
            requested: 10,
            available: 4,
            shortfall: 6,
        }
    );
}

#[test]
fn test_target_above_balance_hints_at_top_up() {
    let err: ApiError = translate_domain_error(DomainError::TargetExceedsBalance {
        target: 40,
        current: 34,
    });

    assert!(matches!(
        err,
        ApiError::InvalidOperation { hint: Some(ref hint), .. } if hint.contains("top-up")
    ));
}

#[test]
fn test_status_transition_is_rule_violation() {
    let err: ApiError = translate_domain_error(DomainError::InvalidStatusTransition {
        from: RequestStatus::Rejected,
        to: RequestStatus::Approved,
    });

    assert!(matches!(
        err,
        ApiError::DomainRuleViolation { ref rule, .. } if rule == "request_status_transition"
    ));
}

#[test]
fn test_unacknowledged_loss_requires_confirmation() {
    let err: ApiError = translate_core_error(CoreError::LossNotAcknowledged {
        request_id: 9,
        lost_days: 16,
        plan: RestorationPlan::empty(),
    });

    assert_eq!(
        err,
        ApiError::ConfirmationRequired {
            request_id: 9,
            lost_days: 16,
        }
    );
}

#[test]
fn test_persistence_errors_translate() {
    assert!(matches!(
        translate_persistence_error(PersistenceError::EmployeeNotFound(3)),
        ApiError::ResourceNotFound { ref resource_type, .. } if resource_type == "Employee"
    ));
    assert!(matches!(
        translate_persistence_error(PersistenceError::VersionConflict(String::from("cycle 1"))),
        ApiError::Conflict { .. }
    ));
    assert!(matches!(
        translate_persistence_error(PersistenceError::QueryFailed(String::from("boom"))),
        ApiError::Internal { .. }
    ));
}
