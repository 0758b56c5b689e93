// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Restoration engine.
//!
//! Gives consumed days back newest-first. A cancelled request's days return
//! to the cycles it drew from; anything else goes to the newest cycle with
//! room, until its available balance is back at its entitlement. Days that
//! only fit into expired cycles, or fit nowhere, are lost; loss is an outcome
//! the caller must surface, never an error.

use crate::cycles::find_cycle_mut;
use crate::error::DomainError;
use crate::types::{AllocationShare, PlanEntry, VacationCycle};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::Date;

/// Result of planning a restoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorationPlan {
    /// Days returned to active cycles, newest first.
    pub restorable: Vec<PlanEntry>,
    /// Days that could only be returned to expired cycles. Counted as lost.
    pub expired: Vec<PlanEntry>,
    /// Days that will not be recoverable (expired entries plus residual).
    pub lost_days: u16,
    /// Days the caller asked to restore.
    pub total_requested: u16,
}

impl RestorationPlan {
    /// Returns whether any days will be lost.
    #[must_use]
    pub const fn has_loss(&self) -> bool {
        self.lost_days > 0
    }

    /// Days that will actually come back to active cycles.
    #[must_use]
    pub fn restored_days(&self) -> u16 {
        self.restorable.iter().map(|e| e.days).sum()
    }

    /// A plan that restores nothing and loses nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            restorable: Vec::new(),
            expired: Vec::new(),
            lost_days: 0,
            total_requested: 0,
        }
    }
}

/// Plans the restoration of `days_to_restore` days with no record of where
/// they came from.
///
/// Pass 1 fills active cycles newest first up to their entitlement. Pass 2
/// walks expired cycles in the same order; those days are recorded but lost.
/// Whatever remains after both passes is lost too.
///
/// # Arguments
///
/// * `cycles` - The employee's cycles, in any order
/// * `days_to_restore` - Days to give back
/// * `as_of` - The reference date
///
/// # Errors
///
/// Returns an error if `days_to_restore` is zero.
pub fn plan_restoration(
    cycles: &[VacationCycle],
    days_to_restore: u16,
    as_of: Date,
) -> Result<RestorationPlan, DomainError> {
    plan_request_restoration(cycles, &[], days_to_restore, as_of)
}

/// Plans giving back the days of a request that drew `allocation`.
///
/// Days first go back to the cycles they were drawn from, newest first, each
/// bounded by its share and by its headroom. A source cycle that has expired
/// since takes its share as lost. Days that no longer fit their source (an
/// adjustment shrank it) fall through as in [`plan_restoration`].
///
/// Restoring right after allocating returns every cycle to its previous
/// counters.
///
/// # Errors
///
/// Returns an error if `days_to_restore` is zero.
pub fn plan_request_restoration(
    cycles: &[VacationCycle],
    allocation: &[AllocationShare],
    days_to_restore: u16,
    as_of: Date,
) -> Result<RestorationPlan, DomainError> {
    if days_to_restore == 0 {
        return Err(DomainError::InvalidDayCount {
            operation: "restoration",
        });
    }

    let mut slots: Vec<Slot<'_>> = cycles
        .iter()
        .map(|cycle| Slot {
            cycle,
            room: cycle.restorable_headroom(),
        })
        .collect();
    slots.sort_by(|a, b| newest_first(a.cycle, b.cycle));

    let mut remaining: u16 = days_to_restore;
    let mut restorable: Vec<PlanEntry> = Vec::new();
    let mut expired: Vec<PlanEntry> = Vec::new();

    for slot in &mut slots {
        let drawn: u16 = allocation
            .iter()
            .filter(|share| share.years_of_service == slot.cycle.years_of_service)
            .map(|share| share.days)
            .sum();
        if slot.cycle.is_active_on(as_of) {
            place(slot, drawn, &mut remaining, &mut restorable);
        } else if slot.cycle.is_expired_on(as_of) {
            place(slot, drawn, &mut remaining, &mut expired);
        }
    }
    for slot in slots.iter_mut().filter(|s| s.cycle.is_active_on(as_of)) {
        place(slot, u16::MAX, &mut remaining, &mut restorable);
    }
    for slot in slots.iter_mut().filter(|s| s.cycle.is_expired_on(as_of)) {
        place(slot, u16::MAX, &mut remaining, &mut expired);
    }

    for entries in [&mut restorable, &mut expired] {
        entries.sort_by(|a, b| {
            b.cycle_start_date
                .cmp(&a.cycle_start_date)
                .then(b.years_of_service.cmp(&a.years_of_service))
        });
    }

    let expired_days: u16 = expired.iter().map(|e| e.days).sum();

    Ok(RestorationPlan {
        restorable,
        expired,
        lost_days: expired_days + remaining,
        total_requested: days_to_restore,
    })
}

/// Applies the restorable part of a plan: `days_used -= n`, `days_available += n`.
///
/// Expired entries and residual loss are not written to any cycle.
///
/// # Errors
///
/// Returns an error if a planned cycle is missing.
pub fn apply_restoration(
    cycles: &mut [VacationCycle],
    plan: &RestorationPlan,
) -> Result<(), DomainError> {
    for entry in &plan.restorable {
        find_cycle_mut(cycles, entry.years_of_service)?;
    }

    for entry in &plan.restorable {
        let cycle: &mut VacationCycle = find_cycle_mut(cycles, entry.years_of_service)?;
        let amount: u16 = entry.days.min(cycle.days_used);
        cycle.days_used -= amount;
        cycle.days_available = (cycle.days_available + amount).min(cycle.days_earned);
    }

    Ok(())
}

/// A cycle with the days it can still absorb during planning.
struct Slot<'a> {
    cycle: &'a VacationCycle,
    room: u16,
}

fn newest_first(a: &VacationCycle, b: &VacationCycle) -> Ordering {
    b.cycle_start_date
        .cmp(&a.cycle_start_date)
        .then(b.years_of_service.cmp(&a.years_of_service))
}

/// Moves up to `limit` of the remaining days into `slot`, merging with any
/// entry already planned for the same cycle.
fn place(slot: &mut Slot<'_>, limit: u16, remaining: &mut u16, entries: &mut Vec<PlanEntry>) {
    let amount: u16 = (*remaining).min(limit).min(slot.room);
    if amount == 0 {
        return;
    }
    slot.room -= amount;
    *remaining -= amount;

    match entries
        .iter_mut()
        .find(|e| e.years_of_service == slot.cycle.years_of_service)
    {
        Some(entry) => entry.days += amount,
        None => entries.push(PlanEntry::for_cycle(slot.cycle, amount)),
    }
}
