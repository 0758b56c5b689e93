// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::RequestStatus;
use time::Date;

/// Errors that can occur while applying ledger rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A day count was zero where at least one day is required.
    InvalidDayCount {
        /// The operation that received the day count.
        operation: &'static str,
    },
    /// A day count does not fit the ledger's day counters.
    DayCountOverflow {
        /// The operation that overflowed.
        operation: &'static str,
    },
    /// Employee name is empty or invalid.
    InvalidName(String),
    /// An adjustment reason is missing or invalid.
    InvalidReason(String),
    /// A request's start date falls after its end date.
    InvalidDateRange {
        /// The requested start date.
        start_date: Date,
        /// The requested end date.
        end_date: Date,
    },
    /// A request asks for more days than its date range contains.
    DaysExceedDateRange {
        /// The number of days requested.
        days_requested: u16,
        /// The number of calendar days in the range.
        span_days: u32,
    },
    /// Not enough active days to satisfy a deduction.
    InsufficientDays {
        /// The number of days asked for.
        requested: u32,
        /// The number of days available across active cycles.
        available: u32,
        /// `requested - available`.
        shortfall: u32,
    },
    /// A target-remaining claw-back would raise the balance instead of lowering it.
    TargetExceedsBalance {
        /// The requested remaining balance.
        target: u32,
        /// The current active balance.
        current: u32,
    },
    /// No active cycle exists to receive a top-up.
    NoActiveCycle {
        /// The employee that was inspected.
        employee_id: i64,
    },
    /// The employee is inactive and cannot receive new entitlement or allocations.
    EmployeeInactive {
        /// The inactive employee.
        employee_id: i64,
    },
    /// Employee does not exist.
    EmployeeNotFound {
        /// The missing employee.
        employee_id: i64,
    },
    /// Vacation request does not exist.
    RequestNotFound {
        /// The missing request.
        request_id: i64,
    },
    /// The request belongs to a different employee than the one addressed.
    RequestEmployeeMismatch {
        /// The request.
        request_id: i64,
        /// The employee the caller addressed.
        employee_id: i64,
    },
    /// The request is already cancelled.
    AlreadyCancelled {
        /// The cancelled request.
        request_id: i64,
    },
    /// Failed to parse a request status from its string form.
    InvalidStatus(String),
    /// A request status transition is not permitted.
    InvalidStatusTransition {
        /// Current status.
        from: RequestStatus,
        /// Requested status.
        to: RequestStatus,
    },
    /// A plan references a cycle that is not present in the ledger.
    PlanCycleMissing {
        /// The anniversary year of the missing cycle.
        years_of_service: u16,
    },
    /// A cycle's counters do not satisfy `days_used + days_available == days_earned`.
    CycleInvariantViolated {
        /// The anniversary year of the cycle.
        years_of_service: u16,
        /// Entitlement of the cycle.
        days_earned: u16,
        /// Days consumed.
        days_used: u16,
        /// Days remaining.
        days_available: u16,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDayCount { operation } => {
                write!(f, "Invalid day count for {operation}: must be at least 1")
            }
            Self::DayCountOverflow { operation } => {
                write!(f, "Day count overflow while {operation}")
            }
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidReason(msg) => write!(f, "Invalid reason: {msg}"),
            Self::InvalidDateRange {
                start_date,
                end_date,
            } => {
                write!(
                    f,
                    "Start date {start_date} must not be after end date {end_date}"
                )
            }
            Self::DaysExceedDateRange {
                days_requested,
                span_days,
            } => {
                write!(
                    f,
                    "Requested {days_requested} days but the date range only spans {span_days} days"
                )
            }
            Self::InsufficientDays {
                requested,
                available,
                shortfall,
            } => {
                write!(
                    f,
                    "Insufficient vacation days: requested {requested}, available {available} (short by {shortfall})"
                )
            }
            Self::TargetExceedsBalance { target, current } => {
                write!(
                    f,
                    "Target balance {target} exceeds current balance {current}; use a top-up to add days"
                )
            }
            Self::NoActiveCycle { employee_id } => {
                write!(f, "Employee {employee_id} has no active vacation cycle")
            }
            Self::EmployeeInactive { employee_id } => {
                write!(f, "Employee {employee_id} is inactive")
            }
            Self::EmployeeNotFound { employee_id } => {
                write!(f, "Employee {employee_id} not found")
            }
            Self::RequestNotFound { request_id } => {
                write!(f, "Vacation request {request_id} not found")
            }
            Self::RequestEmployeeMismatch {
                request_id,
                employee_id,
            } => {
                write!(
                    f,
                    "Vacation request {request_id} does not belong to employee {employee_id}"
                )
            }
            Self::AlreadyCancelled { request_id } => {
                write!(f, "Vacation request {request_id} is already cancelled")
            }
            Self::InvalidStatus(status) => write!(f, "Invalid request status: {status}"),
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Cannot transition request from {from} to {to}")
            }
            Self::PlanCycleMissing { years_of_service } => {
                write!(
                    f,
                    "Plan references cycle for service year {years_of_service}, which does not exist"
                )
            }
            Self::CycleInvariantViolated {
                years_of_service,
                days_earned,
                days_used,
                days_available,
            } => {
                write!(
                    f,
                    "Cycle for service year {years_of_service} is inconsistent: used {days_used} + available {days_available} != earned {days_earned}"
                )
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
