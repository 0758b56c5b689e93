// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use vacation_ledger::CoreError;
use vacation_ledger_domain::DomainError;
use vacation_ledger_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent the
/// API contract. Every lower-level error reaches callers through one of the
/// `translate_*` functions below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The active balance cannot cover a deduction.
    InsufficientDays {
        /// Days asked for.
        requested: u32,
        /// Days available across active cycles.
        available: u32,
        /// `requested - available`.
        shortfall: u32,
    },
    /// The operation does not make sense for the current ledger.
    InvalidOperation {
        /// A human-readable description of the problem.
        message: String,
        /// What to do instead, if anything.
        hint: Option<String>,
    },
    /// The request is already cancelled.
    AlreadyCancelled {
        /// The cancelled request.
        request_id: i64,
    },
    /// Cancelling would lose days; the caller must acknowledge the loss.
    ConfirmationRequired {
        /// The request being cancelled.
        request_id: i64,
        /// Days that would not be recoverable.
        lost_days: u16,
    },
    /// A concurrent modification won; retrying with the same key is safe.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The employee's ledger stayed locked past the lock timeout.
    Busy {
        /// A human-readable description.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns a stable machine-readable name for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DomainRuleViolation { .. } => "domain_rule_violation",
            Self::InvalidInput { .. } => "invalid_input",
            Self::ResourceNotFound { .. } => "not_found",
            Self::InsufficientDays { .. } => "insufficient_days",
            Self::InvalidOperation { .. } => "invalid_operation",
            Self::AlreadyCancelled { .. } => "already_cancelled",
            Self::ConfirmationRequired { .. } => "confirmation_required",
            Self::Conflict { .. } => "conflict",
            Self::Busy { .. } => "busy",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
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
            Self::InvalidOperation { message, hint } => match hint {
                Some(hint) => write!(f, "Invalid operation: {message} ({hint})"),
                None => write!(f, "Invalid operation: {message}"),
            },
            Self::AlreadyCancelled { request_id } => {
                write!(f, "Vacation request {request_id} is already cancelled")
            }
            Self::ConfirmationRequired {
                request_id,
                lost_days,
            } => {
                write!(
                    f,
                    "Cancelling request {request_id} would lose {lost_days} day(s); resubmit with acknowledge_loss to proceed"
                )
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Busy { message } => write!(f, "Busy: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidDayCount { operation } => ApiError::InvalidInput {
            field: String::from("days"),
            message: format!("Day count for {operation} must be at least 1"),
        },
        DomainError::DayCountOverflow { operation } => ApiError::InvalidInput {
            field: String::from("days"),
            message: format!("Day count too large while {operation}"),
        },
        DomainError::InvalidName(msg) => ApiError::InvalidInput {
            field: String::from("full_name"),
            message: msg,
        },
        DomainError::InvalidReason(msg) => ApiError::InvalidInput {
            field: String::from("reason"),
            message: msg,
        },
        DomainError::InvalidDateRange {
            start_date,
            end_date,
        } => ApiError::InvalidInput {
            field: String::from("end_date"),
            message: format!("Start date {start_date} must not be after end date {end_date}"),
        },
        DomainError::DaysExceedDateRange {
            days_requested,
            span_days,
        } => ApiError::InvalidInput {
            field: String::from("days_requested"),
            message: format!(
                "Requested {days_requested} days but the date range only spans {span_days} days"
            ),
        },
        DomainError::InsufficientDays {
            requested,
            available,
            shortfall,
        } => ApiError::InsufficientDays {
            requested,
            available,
            shortfall,
        },
        DomainError::TargetExceedsBalance { target, current } => ApiError::InvalidOperation {
            message: format!(
                "Target balance {target} is above the current balance {current}"
            ),
            hint: Some(String::from("use a top-up to add days")),
        },
        DomainError::NoActiveCycle { employee_id } => ApiError::InvalidOperation {
            message: format!("Employee {employee_id} has no active vacation cycle"),
            hint: Some(String::from("bring the employee's cycles up to date first")),
        },
        DomainError::EmployeeInactive { employee_id } => ApiError::DomainRuleViolation {
            rule: String::from("active_employee"),
            message: format!(
                "Employee {employee_id} is inactive and cannot receive allocations or top-ups"
            ),
        },
        DomainError::EmployeeNotFound { employee_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Employee"),
            message: format!("Employee {employee_id} does not exist"),
        },
        DomainError::RequestNotFound { request_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Vacation request"),
            message: format!("Vacation request {request_id} does not exist"),
        },
        DomainError::RequestEmployeeMismatch {
            request_id,
            employee_id,
        } => ApiError::InvalidInput {
            field: String::from("employee_id"),
            message: format!(
                "Vacation request {request_id} does not belong to employee {employee_id}"
            ),
        },
        DomainError::AlreadyCancelled { request_id } => ApiError::AlreadyCancelled { request_id },
        DomainError::InvalidStatus(status) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown request status '{status}'"),
        },
        DomainError::InvalidStatusTransition { from, to } => ApiError::DomainRuleViolation {
            rule: String::from("request_status_transition"),
            message: format!("Cannot move a request from {from} to {to}"),
        },
        DomainError::PlanCycleMissing { years_of_service } => ApiError::Internal {
            message: format!("Plan references missing cycle for service year {years_of_service}"),
        },
        DomainError::CycleInvariantViolated {
            years_of_service,
            days_earned,
            days_used,
            days_available,
        } => ApiError::Internal {
            message: format!(
                "Cycle for service year {years_of_service} would break its invariant: {days_used} used + {days_available} available != {days_earned} earned"
            ),
        },
        DomainError::DateArithmeticOverflow { operation } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Date arithmetic overflow while {operation}"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::LossNotAcknowledged {
            request_id,
            lost_days,
            ..
        } => ApiError::ConfirmationRequired {
            request_id,
            lost_days,
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Store failures other than lookups and concurrency outcomes are internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::EmployeeNotFound(employee_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Employee"),
            message: format!("Employee {employee_id} does not exist"),
        },
        PersistenceError::RequestNotFound(request_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Vacation request"),
            message: format!("Vacation request {request_id} does not exist"),
        },
        PersistenceError::EventNotFound(event_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit event"),
            message: format!("Audit event {event_id} does not exist"),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::VersionConflict(msg) => ApiError::Conflict { message: msg },
        PersistenceError::DuplicateOperation(msg) => ApiError::Conflict {
            message: format!("Operation already recorded: {msg}"),
        },
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::ReconstructionError(_)
        | PersistenceError::SerializationError(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
