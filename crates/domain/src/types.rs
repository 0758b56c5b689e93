// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Lifecycle status of a vacation request.
///
/// Only `Approved` and `InProgress` requests hold days deducted from cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, awaiting a decision. Nothing deducted yet.
    #[default]
    Pending,
    /// Approved. Days have been allocated from cycles.
    Approved,
    /// Declined. Terminal.
    Rejected,
    /// The leave period has started.
    InProgress,
    /// The leave period has ended. Terminal.
    Completed,
    /// Withdrawn. Terminal; days held were restored.
    Cancelled,
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RequestStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Pending → Approved | Rejected | Cancelled
    /// - Approved → `InProgress` | Completed | Cancelled
    /// - `InProgress` → Completed | Cancelled
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Approved | Self::Rejected | Self::Cancelled
            ) | (
                Self::Approved,
                Self::InProgress | Self::Completed | Self::Cancelled
            ) | (Self::InProgress, Self::Completed | Self::Cancelled)
        )
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// Returns whether the request currently holds days deducted from cycles.
    #[must_use]
    pub const fn holds_allocation(&self) -> bool {
        matches!(self, Self::Approved | Self::InProgress)
    }

    /// Returns whether the request is part of the active ledger.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved | Self::InProgress)
    }
}

/// An employee as seen by the ledger.
///
/// The hire date drives years of service and every cycle anniversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The store-assigned identifier. `None` until persisted.
    pub employee_id: Option<i64>,
    /// The office the employee belongs to.
    pub office_id: i64,
    /// The employee's full name.
    pub full_name: String,
    /// The date of hire.
    pub hire_date: Date,
    /// Whether the employee is currently active.
    pub is_active: bool,
}

impl Employee {
    /// Creates a new active `Employee` without a persisted ID.
    ///
    /// # Arguments
    ///
    /// * `office_id` - The office the employee belongs to
    /// * `full_name` - The employee's full name
    /// * `hire_date` - The date of hire
    #[must_use]
    pub const fn new(office_id: i64, full_name: String, hire_date: Date) -> Self {
        Self {
            employee_id: None,
            office_id,
            full_name,
            hire_date,
            is_active: true,
        }
    }

    /// Creates an `Employee` loaded from the store.
    ///
    /// # Arguments
    ///
    /// * `employee_id` - The persisted identifier
    /// * `office_id` - The office the employee belongs to
    /// * `full_name` - The employee's full name
    /// * `hire_date` - The date of hire
    /// * `is_active` - Whether the employee is active
    #[must_use]
    pub const fn with_id(
        employee_id: i64,
        office_id: i64,
        full_name: String,
        hire_date: Date,
        is_active: bool,
    ) -> Self {
        Self {
            employee_id: Some(employee_id),
            office_id,
            full_name,
            hire_date,
            is_active,
        }
    }
}

/// One entitlement period for one employee.
///
/// Invariant: `days_used + days_available == days_earned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationCycle {
    /// The store-assigned identifier. `None` until persisted.
    pub cycle_id: Option<i64>,
    /// The owning employee.
    pub employee_id: i64,
    /// The anniversary year this cycle represents.
    pub years_of_service: u16,
    /// First day the cycle's days may be used.
    pub cycle_start_date: Date,
    /// Last day the cycle's days may be used.
    pub cycle_end_date: Date,
    /// Entitlement granted by the accrual policy, plus any top-ups.
    pub days_earned: u16,
    /// Days consumed.
    pub days_used: u16,
    /// Days still available.
    pub days_available: u16,
    /// Whether the cycle has been retired.
    pub is_expired: bool,
    /// Optimistic concurrency stamp maintained by the store.
    pub version: i64,
}

impl VacationCycle {
    /// Creates a fresh, unused cycle.
    ///
    /// # Arguments
    ///
    /// * `employee_id` - The owning employee
    /// * `years_of_service` - The anniversary year
    /// * `cycle_start_date` - Start of the usable window
    /// * `cycle_end_date` - End of the usable window
    /// * `days_earned` - Entitlement for the anniversary year
    #[must_use]
    pub const fn new(
        employee_id: i64,
        years_of_service: u16,
        cycle_start_date: Date,
        cycle_end_date: Date,
        days_earned: u16,
    ) -> Self {
        Self {
            cycle_id: None,
            employee_id,
            years_of_service,
            cycle_start_date,
            cycle_end_date,
            days_earned,
            days_used: 0,
            days_available: days_earned,
            is_expired: false,
            version: 0,
        }
    }

    /// Returns whether the usable window closed before `as_of`.
    #[must_use]
    pub fn has_lapsed_on(&self, as_of: Date) -> bool {
        self.cycle_end_date < as_of
    }

    /// Returns whether the cycle is expired, either by flag or by date.
    #[must_use]
    pub fn is_expired_on(&self, as_of: Date) -> bool {
        self.is_expired || self.has_lapsed_on(as_of)
    }

    /// Returns whether the cycle's days may be used on `as_of`.
    #[must_use]
    pub fn is_active_on(&self, as_of: Date) -> bool {
        !self.is_expired_on(as_of) && self.cycle_start_date <= as_of
    }

    /// Returns how many days can be given back before available reaches earned.
    #[must_use]
    pub const fn restorable_headroom(&self) -> u16 {
        self.days_earned.saturating_sub(self.days_available)
    }

    /// Returns whether the counters are consistent.
    #[must_use]
    pub const fn satisfies_invariant(&self) -> bool {
        match self.days_used.checked_add(self.days_available) {
            Some(total) => total == self.days_earned,
            None => false,
        }
    }
}

/// A vacation request recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationRequest {
    /// The store-assigned identifier. `None` until persisted.
    pub request_id: Option<i64>,
    /// The requesting employee.
    pub employee_id: i64,
    /// The employee's office at request time.
    pub office_id: i64,
    /// First day of leave.
    pub start_date: Date,
    /// Last day of leave.
    pub end_date: Date,
    /// Number of vacation days charged.
    pub days_requested: u16,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Free-form reason supplied by the employee.
    pub reason: Option<String>,
    /// Who approved the request.
    pub approved_by: Option<String>,
    /// Why the request was rejected.
    pub rejected_reason: Option<String>,
    /// Who cancelled the request.
    pub cancelled_by: Option<String>,
    /// Client idempotency key.
    pub request_key: Option<String>,
    /// Days drawn from each cycle when the request was approved. Empty until then.
    pub allocation: Vec<AllocationShare>,
    /// Creation timestamp (RFC 3339), set by the store.
    pub created_at: Option<String>,
    /// Last update timestamp (RFC 3339), set by the store.
    pub updated_at: Option<String>,
}

impl VacationRequest {
    /// Creates a new pending request without a persisted ID.
    ///
    /// # Arguments
    ///
    /// * `employee_id` - The requesting employee
    /// * `office_id` - The employee's office
    /// * `start_date` - First day of leave
    /// * `end_date` - Last day of leave
    /// * `days_requested` - Number of days charged
    #[must_use]
    pub const fn new(
        employee_id: i64,
        office_id: i64,
        start_date: Date,
        end_date: Date,
        days_requested: u16,
    ) -> Self {
        Self {
            request_id: None,
            employee_id,
            office_id,
            start_date,
            end_date,
            days_requested,
            status: RequestStatus::Pending,
            reason: None,
            approved_by: None,
            rejected_reason: None,
            cancelled_by: None,
            request_key: None,
            allocation: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Days a request drew from one cycle.
///
/// Cycles are identified by anniversary year, which is unique per employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationShare {
    /// The anniversary year of the source cycle.
    pub years_of_service: u16,
    /// Days taken from that cycle.
    pub days: u16,
}

/// One line of a deduction, restoration or top-up plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// The persisted cycle identifier, if the cycle has one.
    pub cycle_id: Option<i64>,
    /// The anniversary year identifying the cycle within an employee's ledger.
    pub years_of_service: u16,
    /// The cycle's start date, for display.
    pub cycle_start_date: Date,
    /// Days moved by this entry.
    pub days: u16,
}

impl PlanEntry {
    /// Creates a plan entry for `days` against `cycle`.
    #[must_use]
    pub const fn for_cycle(cycle: &VacationCycle, days: u16) -> Self {
        Self {
            cycle_id: cycle.cycle_id,
            years_of_service: cycle.years_of_service,
            cycle_start_date: cycle.cycle_start_date,
            days,
        }
    }
}
