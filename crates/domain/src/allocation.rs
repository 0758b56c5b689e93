// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Allocation engine.
//!
//! Consumes entitlement oldest-active-first. Planning is pure; applying a
//! plan mutates the supplied cycles only after the whole plan is known to fit.

use crate::cycles::{available_balance, find_cycle_mut, indices_oldest_first};
use crate::error::DomainError;
use crate::types::{AllocationShare, PlanEntry, VacationCycle};
use serde::{Deserialize, Serialize};
use time::Date;

/// Per-cycle deduction plan for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    /// Deductions in the order they are taken, oldest cycle first.
    pub entries: Vec<PlanEntry>,
    /// Total days deducted.
    pub total_days: u16,
}

impl AllocationPlan {
    /// The per-cycle draw to record on the request, so a later
    /// cancellation can give the days back where they came from.
    #[must_use]
    pub fn shares(&self) -> Vec<AllocationShare> {
        self.entries
            .iter()
            .map(|e| AllocationShare {
                years_of_service: e.years_of_service,
                days: e.days,
            })
            .collect()
    }
}

/// Plans the deduction of `days_requested` from the active cycles.
///
/// Eligible cycles are active on `as_of` with at least one available day.
/// Cycles whose window has not opened yet are excluded.
///
/// # Arguments
///
/// * `cycles` - The employee's cycles, in any order
/// * `days_requested` - Days to deduct
/// * `as_of` - The reference date
///
/// # Returns
///
/// The deduction plan. Nothing is mutated.
///
/// # Errors
///
/// Returns an error if:
/// - `days_requested` is zero
/// - The active balance is below `days_requested`
pub fn plan_allocation(
    cycles: &[VacationCycle],
    days_requested: u16,
    as_of: Date,
) -> Result<AllocationPlan, DomainError> {
    if days_requested == 0 {
        return Err(DomainError::InvalidDayCount {
            operation: "allocation",
        });
    }

    let entries: Vec<PlanEntry> = take_oldest_first(cycles, days_requested, as_of)?;

    Ok(AllocationPlan {
        entries,
        total_days: days_requested,
    })
}

/// Applies an allocation plan: `days_used += take`, `days_available -= take`.
///
/// # Errors
///
/// Returns an error if a planned cycle is missing or lacks the planned days.
/// The cycles are left untouched in that case.
pub fn apply_allocation(
    cycles: &mut [VacationCycle],
    plan: &AllocationPlan,
) -> Result<(), DomainError> {
    debit_cycles(cycles, &plan.entries)
}

/// Greedy oldest-first walk shared by allocation and absolute claw-back.
pub(crate) fn take_oldest_first(
    cycles: &[VacationCycle],
    days: u16,
    as_of: Date,
) -> Result<Vec<PlanEntry>, DomainError> {
    let mut remaining: u16 = days;
    let mut entries: Vec<PlanEntry> = Vec::new();

    for index in indices_oldest_first(cycles) {
        if remaining == 0 {
            break;
        }
        let cycle: &VacationCycle = &cycles[index];
        if !cycle.is_active_on(as_of) || cycle.days_available == 0 {
            continue;
        }
        let take: u16 = remaining.min(cycle.days_available);
        entries.push(PlanEntry::for_cycle(cycle, take));
        remaining -= take;
    }

    if remaining > 0 {
        let available: u32 = available_balance(cycles, as_of);
        let requested: u32 = u32::from(days);
        return Err(DomainError::InsufficientDays {
            requested,
            available,
            shortfall: requested.saturating_sub(available),
        });
    }

    Ok(entries)
}

/// Moves planned days from available to used.
pub(crate) fn debit_cycles(
    cycles: &mut [VacationCycle],
    entries: &[PlanEntry],
) -> Result<(), DomainError> {
    // Validate every entry first so a bad plan leaves the cycles untouched.
    for entry in entries {
        let cycle: &VacationCycle = cycles
            .iter()
            .find(|c| c.years_of_service == entry.years_of_service)
            .ok_or(DomainError::PlanCycleMissing {
                years_of_service: entry.years_of_service,
            })?;
        if cycle.days_available < entry.days {
            return Err(DomainError::InsufficientDays {
                requested: u32::from(entry.days),
                available: u32::from(cycle.days_available),
                shortfall: u32::from(entry.days - cycle.days_available),
            });
        }
    }

    for entry in entries {
        let cycle: &mut VacationCycle = find_cycle_mut(cycles, entry.years_of_service)?;
        cycle.days_used += entry.days;
        cycle.days_available -= entry.days;
    }

    Ok(())
}
