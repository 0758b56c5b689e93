// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cycle rules: which cycles an employee should hold, when they expire,
//! and how balances are read across them.

use crate::accrual::{cycle_window, entitlement_for_years, years_of_service};
use crate::error::DomainError;
use crate::types::{Employee, VacationCycle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::Date;

/// Changes required to bring an employee's cycles up to date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSync {
    /// Cycles that should exist but do not.
    pub created: Vec<VacationCycle>,
    /// Anniversary years of existing cycles that must now be marked expired.
    pub newly_expired: Vec<u16>,
}

impl CycleSync {
    /// Returns whether nothing needs to change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.created.is_empty() && self.newly_expired.is_empty()
    }
}

/// Returns the cycles an employee should hold on `as_of`.
///
/// One cycle per anniversary year whose window has not closed on `as_of`.
/// Windows that closed before the ledger knew the employee are not
/// reconstructed.
///
/// # Arguments
///
/// * `employee_id` - The persisted employee identifier
/// * `hire_date` - The employee's hire date
/// * `as_of` - The reference date
///
/// # Errors
///
/// Returns an error if a cycle window cannot be computed.
pub fn expected_cycles(
    employee_id: i64,
    hire_date: Date,
    as_of: Date,
) -> Result<Vec<VacationCycle>, DomainError> {
    let completed_years: u16 = years_of_service(hire_date, as_of);
    let mut cycles: Vec<VacationCycle> = Vec::new();

    for years in 1..=completed_years {
        let (start, end) = cycle_window(hire_date, years)?;
        if end < as_of {
            continue;
        }
        cycles.push(VacationCycle::new(
            employee_id,
            years,
            start,
            end,
            entitlement_for_years(years),
        ));
    }

    Ok(cycles)
}

/// Computes which cycles to create and which to mark expired.
///
/// Creation never duplicates an anniversary year already present in
/// `existing`. Inactive employees receive no new cycles, but their
/// existing cycles still expire.
///
/// # Arguments
///
/// * `employee` - The employee; must be persisted
/// * `existing` - The employee's current cycles
/// * `as_of` - The reference date
///
/// # Errors
///
/// Returns an error if the employee has no identifier or a window cannot be computed.
pub fn plan_cycle_sync(
    employee: &Employee,
    existing: &[VacationCycle],
    as_of: Date,
) -> Result<CycleSync, DomainError> {
    let employee_id: i64 = employee
        .employee_id
        .ok_or(DomainError::EmployeeNotFound { employee_id: 0 })?;

    let known_years: HashSet<u16> = existing.iter().map(|c| c.years_of_service).collect();

    let created: Vec<VacationCycle> = if employee.is_active {
        expected_cycles(employee_id, employee.hire_date, as_of)?
            .into_iter()
            .filter(|c| !known_years.contains(&c.years_of_service))
            .collect()
    } else {
        Vec::new()
    };

    let newly_expired: Vec<u16> = existing
        .iter()
        .filter(|c| !c.is_expired && c.has_lapsed_on(as_of))
        .map(|c| c.years_of_service)
        .collect();

    Ok(CycleSync {
        created,
        newly_expired,
    })
}

/// Applies a [`CycleSync`] to an in-memory cycle list and restores start-date order.
pub fn apply_cycle_sync(cycles: &mut Vec<VacationCycle>, sync: &CycleSync) {
    for cycle in cycles.iter_mut() {
        if sync.newly_expired.contains(&cycle.years_of_service) {
            cycle.is_expired = true;
        }
    }
    cycles.extend(sync.created.iter().cloned());
    sort_cycles(cycles);
}

/// Orders cycles oldest first by start date.
pub fn sort_cycles(cycles: &mut [VacationCycle]) {
    cycles.sort_by(|a, b| {
        a.cycle_start_date
            .cmp(&b.cycle_start_date)
            .then(a.years_of_service.cmp(&b.years_of_service))
    });
}

/// Sums `days_available` over cycles active on `as_of`.
#[must_use]
pub fn available_balance(cycles: &[VacationCycle], as_of: Date) -> u32 {
    cycles
        .iter()
        .filter(|c| c.is_active_on(as_of))
        .map(|c| u32::from(c.days_available))
        .sum()
}

/// Validates the counter invariant of every cycle.
///
/// # Errors
///
/// Returns the first cycle that violates `days_used + days_available == days_earned`.
pub fn validate_cycles(cycles: &[VacationCycle]) -> Result<(), DomainError> {
    cycles
        .iter()
        .find(|c| !c.satisfies_invariant())
        .map_or(Ok(()), |c| {
            Err(DomainError::CycleInvariantViolated {
                years_of_service: c.years_of_service,
                days_earned: c.days_earned,
                days_used: c.days_used,
                days_available: c.days_available,
            })
        })
}

/// Finds the cycle for an anniversary year.
pub(crate) fn find_cycle_mut(
    cycles: &mut [VacationCycle],
    years_of_service: u16,
) -> Result<&mut VacationCycle, DomainError> {
    cycles
        .iter_mut()
        .find(|c| c.years_of_service == years_of_service)
        .ok_or(DomainError::PlanCycleMissing { years_of_service })
}

/// Returns indices of `cycles` ordered oldest first.
pub(crate) fn indices_oldest_first(cycles: &[VacationCycle]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..cycles.len()).collect();
    indices.sort_by(|&a, &b| {
        cycles[a]
            .cycle_start_date
            .cmp(&cycles[b].cycle_start_date)
            .then(cycles[a].years_of_service.cmp(&cycles[b].years_of_service))
    });
    indices
}
