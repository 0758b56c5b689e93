// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Manual top-up and claw-back outside the request flow.

use crate::allocation::{debit_cycles, take_oldest_first};
use crate::cycles::{available_balance, find_cycle_mut, indices_oldest_first};
use crate::error::DomainError;
use crate::types::{PlanEntry, VacationCycle};
use serde::{Deserialize, Serialize};
use time::Date;

/// How a claw-back amount is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RemovalMode {
    /// Remove exactly `days`.
    Absolute {
        /// Days to remove.
        days: u16,
    },
    /// Remove whatever brings the active balance down to `target`.
    TargetRemaining {
        /// The balance to leave behind.
        target: u32,
    },
}

/// Planned claw-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalPlan {
    /// Deductions, oldest cycle first. Empty for a no-op.
    pub entries: Vec<PlanEntry>,
    /// Total days removed.
    pub removed_days: u16,
    /// Active balance before the claw-back.
    pub previous_balance: u32,
    /// Active balance after the claw-back.
    pub resulting_balance: u32,
}

impl RemovalPlan {
    /// Returns whether the claw-back changes nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.removed_days == 0
    }
}

/// Plans a top-up of `days` into the oldest active cycle.
///
/// # Arguments
///
/// * `employee_id` - The employee, for error reporting
/// * `cycles` - The employee's cycles
/// * `days` - Days to add; at least 1
/// * `as_of` - The reference date
///
/// # Errors
///
/// Returns an error if:
/// - `days` is zero
/// - No cycle is active on `as_of`
/// - The cycle's entitlement would overflow
pub fn plan_top_up(
    employee_id: i64,
    cycles: &[VacationCycle],
    days: u16,
    as_of: Date,
) -> Result<PlanEntry, DomainError> {
    if days == 0 {
        return Err(DomainError::InvalidDayCount { operation: "top-up" });
    }

    let target: &VacationCycle = indices_oldest_first(cycles)
        .into_iter()
        .map(|i| &cycles[i])
        .find(|c| c.is_active_on(as_of))
        .ok_or(DomainError::NoActiveCycle { employee_id })?;

    if target.days_earned.checked_add(days).is_none() {
        return Err(DomainError::DayCountOverflow {
            operation: "adding days to a cycle",
        });
    }

    Ok(PlanEntry::for_cycle(target, days))
}

/// Applies a top-up: `days_earned += n`, `days_available += n`.
///
/// # Errors
///
/// Returns an error if the cycle is missing or its counters would overflow.
pub fn apply_top_up(cycles: &mut [VacationCycle], entry: &PlanEntry) -> Result<(), DomainError> {
    let cycle: &mut VacationCycle = find_cycle_mut(cycles, entry.years_of_service)?;
    let overflow = || DomainError::DayCountOverflow {
        operation: "adding days to a cycle",
    };
    let earned: u16 = cycle.days_earned.checked_add(entry.days).ok_or_else(overflow)?;
    let available: u16 = cycle
        .days_available
        .checked_add(entry.days)
        .ok_or_else(overflow)?;
    cycle.days_earned = earned;
    cycle.days_available = available;
    Ok(())
}

/// Plans a claw-back from the active cycles, oldest first.
///
/// # Arguments
///
/// * `cycles` - The employee's cycles
/// * `mode` - Absolute amount or target remaining balance
/// * `as_of` - The reference date
///
/// # Errors
///
/// Returns an error if:
/// - An absolute amount is zero
/// - An absolute amount exceeds the active balance
/// - A target exceeds the active balance
pub fn plan_removal(
    cycles: &[VacationCycle],
    mode: RemovalMode,
    as_of: Date,
) -> Result<RemovalPlan, DomainError> {
    let previous_balance: u32 = available_balance(cycles, as_of);

    let days: u16 = match mode {
        RemovalMode::Absolute { days } => {
            if days == 0 {
                return Err(DomainError::InvalidDayCount {
                    operation: "claw-back",
                });
            }
            days
        }
        RemovalMode::TargetRemaining { target } => {
            if target > previous_balance {
                return Err(DomainError::TargetExceedsBalance {
                    target,
                    current: previous_balance,
                });
            }
            u16::try_from(previous_balance - target).map_err(|_| {
                DomainError::DayCountOverflow {
                    operation: "computing the claw-back amount",
                }
            })?
        }
    };

    if days == 0 {
        return Ok(RemovalPlan {
            entries: Vec::new(),
            removed_days: 0,
            previous_balance,
            resulting_balance: previous_balance,
        });
    }

    let entries: Vec<PlanEntry> = take_oldest_first(cycles, days, as_of)?;

    Ok(RemovalPlan {
        entries,
        removed_days: days,
        previous_balance,
        resulting_balance: previous_balance - u32::from(days),
    })
}

/// Applies a claw-back with the same bookkeeping as an allocation.
///
/// # Errors
///
/// Returns an error if a planned cycle is missing or lacks the planned days.
pub fn apply_removal(cycles: &mut [VacationCycle], plan: &RemovalPlan) -> Result<(), DomainError> {
    debit_cycles(cycles, &plan.entries)
}
