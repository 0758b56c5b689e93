// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{Employee, RequestStatus, VacationRequest};

/// Validates an employee's basic field constraints.
///
/// # Arguments
///
/// * `employee` - The employee to validate
///
/// # Errors
///
/// Returns an error if the employee's name is empty.
pub fn validate_employee_fields(employee: &Employee) -> Result<(), DomainError> {
    // Rule: name must not be empty
    if employee.full_name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }

    Ok(())
}

/// Validates the shape of a vacation request before it touches any cycle.
///
/// # Arguments
///
/// * `request` - The request to validate
///
/// # Errors
///
/// Returns an error if:
/// - `days_requested` is zero
/// - The start date is after the end date
/// - More days are requested than the date range contains
pub fn validate_request_fields(request: &VacationRequest) -> Result<(), DomainError> {
    if request.days_requested == 0 {
        return Err(DomainError::InvalidDayCount {
            operation: "vacation request",
        });
    }

    if request.start_date > request.end_date {
        return Err(DomainError::InvalidDateRange {
            start_date: request.start_date,
            end_date: request.end_date,
        });
    }

    // Discrete days must fit inside the inclusive span.
    let span: i64 = (request.end_date - request.start_date).whole_days() + 1;
    let span_days: u32 = u32::try_from(span).unwrap_or(u32::MAX);
    if u32::from(request.days_requested) > span_days {
        return Err(DomainError::DaysExceedDateRange {
            days_requested: request.days_requested,
            span_days,
        });
    }

    Ok(())
}

/// Validates that an adjustment reason was supplied.
///
/// # Errors
///
/// Returns an error if the reason is empty or whitespace.
pub fn validate_reason(reason: &str) -> Result<(), DomainError> {
    if reason.trim().is_empty() {
        return Err(DomainError::InvalidReason(String::from(
            "A reason is required for manual adjustments",
        )));
    }
    Ok(())
}

/// Validates a request status transition.
///
/// Cancelling a cancelled request is reported as [`DomainError::AlreadyCancelled`].
///
/// # Arguments
///
/// * `request_id` - The request being transitioned
/// * `from` - Current status
/// * `to` - Requested status
///
/// # Errors
///
/// Returns an error if the transition is not permitted.
pub fn validate_status_transition(
    request_id: i64,
    from: RequestStatus,
    to: RequestStatus,
) -> Result<(), DomainError> {
    if from == RequestStatus::Cancelled && to == RequestStatus::Cancelled {
        return Err(DomainError::AlreadyCancelled { request_id });
    }
    if !from.can_transition_to(to) {
        return Err(DomainError::InvalidStatusTransition { from, to });
    }
    Ok(())
}
