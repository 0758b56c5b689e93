// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Accrual policy.
//!
//! Maps years of service to an annual day entitlement and to the calendar
//! window of the cycle representing each anniversary year. Everything here is
//! pure and deterministic; callers pass the reference date explicitly.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

/// Length of a cycle's usable window, in months, counted from its anniversary.
pub const CYCLE_WINDOW_MONTHS: u32 = 18;

/// Entitlement step table: `(first_year, last_year, days)`.
const ENTITLEMENT_TIERS: [(u16, u16, u16); 11] = [
    (1, 1, 12),
    (2, 2, 14),
    (3, 3, 16),
    (4, 4, 18),
    (5, 5, 20),
    (6, 10, 22),
    (11, 15, 24),
    (16, 20, 26),
    (21, 25, 28),
    (26, 30, 30),
    (31, 35, 32),
];

/// Explanation of how an employee's entitlement was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualBreakdown {
    /// Whole anniversaries elapsed at the reference date.
    pub years_of_service: u16,
    /// First service year of the tier that was applied.
    pub tier_first_year: u16,
    /// Last service year of the tier that was applied.
    pub tier_last_year: u16,
    /// Annual entitlement in days.
    pub days_earned: u16,
    /// Whether the years of service fell outside the table and were clamped.
    pub clamped: bool,
}

/// Returns the annual entitlement for a number of years of service.
///
/// Years below the first tier map to the first tier; years above the last
/// tier map to the last tier.
///
/// # Arguments
///
/// * `years` - Whole years of service
///
/// # Returns
///
/// The entitlement in days.
#[must_use]
pub fn entitlement_for_years(years: u16) -> u16 {
    explain_entitlement(years).days_earned
}

/// Returns the entitlement for `years` together with the tier that produced it.
#[must_use]
pub fn explain_entitlement(years: u16) -> AccrualBreakdown {
    let (first_tier, last_tier) = (ENTITLEMENT_TIERS[0], ENTITLEMENT_TIERS[10]);

    let clamped: bool = years < first_tier.0 || years > last_tier.1;
    let lookup_years: u16 = years.clamp(first_tier.0, last_tier.1);

    let tier: (u16, u16, u16) = ENTITLEMENT_TIERS
        .iter()
        .copied()
        .find(|(first, last, _)| (*first..=*last).contains(&lookup_years))
        .unwrap_or(last_tier);

    AccrualBreakdown {
        years_of_service: years,
        tier_first_year: tier.0,
        tier_last_year: tier.1,
        days_earned: tier.2,
        clamped,
    }
}

/// Calculates the number of whole anniversaries between `hire_date` and `as_of`.
///
/// An anniversary that falls on a day missing from the target month (Feb 29
/// in a common year) is observed on the last day of that month.
///
/// # Arguments
///
/// * `hire_date` - The date of hire
/// * `as_of` - The date to calculate service as of
///
/// # Returns
///
/// The number of complete years of service, 0 when `as_of` precedes the hire date.
#[must_use]
pub fn years_of_service(hire_date: Date, as_of: Date) -> u16 {
    if as_of < hire_date {
        return 0;
    }

    let years_diff: i32 = as_of.year() - hire_date.year();
    let candidate: u16 = u16::try_from(years_diff).unwrap_or(0);

    match anniversary(hire_date, candidate) {
        Ok(date) if date <= as_of => candidate,
        _ => candidate.saturating_sub(1),
    }
}

/// Returns the `years`-th anniversary of `hire_date`.
///
/// # Errors
///
/// Returns an error if the resulting date is out of range.
pub fn anniversary(hire_date: Date, years: u16) -> Result<Date, DomainError> {
    add_months(hire_date, u32::from(years) * 12)
}

/// Returns the usable window `(start, end)` of the cycle for anniversary year `years`.
///
/// The window opens on the anniversary and closes 18 months later.
///
/// # Arguments
///
/// * `hire_date` - The date of hire
/// * `years` - The anniversary year (1-based)
///
/// # Errors
///
/// Returns an error if either boundary is out of range.
pub fn cycle_window(hire_date: Date, years: u16) -> Result<(Date, Date), DomainError> {
    let start_months: u32 = u32::from(years) * 12;
    let start: Date = add_months(hire_date, start_months)?;
    let end: Date = add_months(hire_date, start_months + CYCLE_WINDOW_MONTHS)?;
    Ok((start, end))
}

/// Adds calendar months to a date, clamping the day to the target month's length.
///
/// # Errors
///
/// Returns an error if the resulting year is out of range.
pub fn add_months(date: Date, months: u32) -> Result<Date, DomainError> {
    let overflow = || DomainError::DateArithmeticOverflow {
        operation: format!("adding {months} months to {date}"),
    };

    let month_index: i64 = i64::from(u8::from(date.month())) - 1;
    let total: i64 = i64::from(date.year()) * 12 + month_index + i64::from(months);

    let year: i32 = i32::try_from(total.div_euclid(12)).map_err(|_| overflow())?;
    let month_number: u8 = u8::try_from(total.rem_euclid(12) + 1).map_err(|_| overflow())?;
    let month: Month = Month::try_from(month_number).map_err(|_| overflow())?;

    // Walk back from the original day until the month accepts it.
    let mut day: u8 = date.day();
    loop {
        match Date::from_calendar_date(year, month, day) {
            Ok(result) => return Ok(result),
            Err(_) if day > 28 => day -= 1,
            Err(_) => return Err(overflow()),
        }
    }
}

/// Parses an ISO 8601 calendar date.
///
/// # Errors
///
/// Returns an error if the string is not a valid date.
pub fn parse_date(date_string: &str) -> Result<Date, DomainError> {
    Date::parse(
        date_string,
        &time::format_description::well_known::Iso8601::DEFAULT,
    )
    .map_err(|e| DomainError::DateParseError {
        date_string: date_string.to_string(),
        error: e.to_string(),
    })
}
