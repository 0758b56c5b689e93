// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee, cycle and request writes.
//!
//! Cycle writes are versioned: an update names the version it read and
//! fails with `VersionConflict` if another writer got there first. Request
//! status writes are guarded the same way by the status read.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use vacation_ledger::CycleUpdate;
use vacation_ledger_domain::{Employee, RequestStatus, VacationCycle, VacationRequest};

use crate::diesel_schema::{employees, vacation_cycles, vacation_requests};
use crate::error::PersistenceError;
use crate::mutations::now_rfc3339;
use crate::queries::ledger::find_cycle;

/// Inserts an employee into the directory.
///
/// # Returns
///
/// The employee ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_employee(
    conn: &mut SqliteConnection,
    employee: &Employee,
) -> Result<i64, PersistenceError> {
    let created_at: String = now_rfc3339()?;

    let employee_id: i64 = diesel::insert_into(employees::table)
        .values((
            employees::office_id.eq(employee.office_id),
            employees::full_name.eq(employee.full_name.as_str()),
            employees::hire_date.eq(employee.hire_date.to_string()),
            employees::is_active.eq(i32::from(employee.is_active)),
            employees::created_at.eq(created_at),
        ))
        .returning(employees::employee_id)
        .get_result::<i64>(conn)?;

    debug!(employee_id, office_id = employee.office_id, "Inserted employee");
    Ok(employee_id)
}

/// Inserts a cycle unless one already exists for its anniversary year.
///
/// Only the `(employee_id, years_of_service)` conflict is skipped; check and
/// foreign key violations still fail.
///
/// # Returns
///
/// The number of rows inserted (0 or 1).
fn insert_cycle_if_absent(
    conn: &mut SqliteConnection,
    cycle: &VacationCycle,
) -> Result<usize, PersistenceError> {
    Ok(diesel::insert_into(vacation_cycles::table)
        .values((
            vacation_cycles::employee_id.eq(cycle.employee_id),
            vacation_cycles::years_of_service.eq(i32::from(cycle.years_of_service)),
            vacation_cycles::cycle_start_date.eq(cycle.cycle_start_date.to_string()),
            vacation_cycles::cycle_end_date.eq(cycle.cycle_end_date.to_string()),
            vacation_cycles::days_earned.eq(i32::from(cycle.days_earned)),
            vacation_cycles::days_used.eq(i32::from(cycle.days_used)),
            vacation_cycles::days_available.eq(i32::from(cycle.days_available)),
            vacation_cycles::is_expired.eq(i32::from(cycle.is_expired)),
            vacation_cycles::version.eq(0_i64),
        ))
        .on_conflict((vacation_cycles::employee_id, vacation_cycles::years_of_service))
        .do_nothing()
        .execute(conn)?)
}

/// Creates a cycle, idempotent on `(employee_id, years_of_service)`.
///
/// When the cycle already exists the stored row is returned unchanged.
///
/// # Errors
///
/// Returns an error if the insert or the read-back fails.
pub fn create_cycle(
    conn: &mut SqliteConnection,
    cycle: &VacationCycle,
) -> Result<VacationCycle, PersistenceError> {
    let inserted: usize = insert_cycle_if_absent(conn, cycle)?;
    debug!(
        employee_id = cycle.employee_id,
        years_of_service = cycle.years_of_service,
        inserted,
        "Created cycle"
    );

    find_cycle(conn, cycle.employee_id, cycle.years_of_service)?.ok_or_else(|| {
        PersistenceError::NotFound(format!(
            "cycle for service year {} of employee {}",
            cycle.years_of_service, cycle.employee_id
        ))
    })
}

/// Inserts a cycle computed by a transition.
///
/// Unlike [`create_cycle`], finding the anniversary year already present
/// means another writer created it after this transition read the ledger.
///
/// # Returns
///
/// The cycle ID assigned by the database.
///
/// # Errors
///
/// Returns `VersionConflict` if the cycle already exists.
pub fn insert_new_cycle(
    conn: &mut SqliteConnection,
    cycle: &VacationCycle,
) -> Result<i64, PersistenceError> {
    let inserted: usize = insert_cycle_if_absent(conn, cycle)?;
    if inserted == 0 {
        return Err(PersistenceError::VersionConflict(format!(
            "cycle for service year {} of employee {} was created concurrently",
            cycle.years_of_service, cycle.employee_id
        )));
    }

    let stored: VacationCycle = find_cycle(conn, cycle.employee_id, cycle.years_of_service)?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!(
                "cycle for service year {} of employee {}",
                cycle.years_of_service, cycle.employee_id
            ))
        })?;
    stored.cycle_id.ok_or_else(|| {
        PersistenceError::ReconstructionError(String::from("stored cycle has no ID"))
    })
}

/// Writes versioned counter updates to existing cycles of one employee.
///
/// Each successful update increments the row's version.
///
/// # Errors
///
/// Returns `VersionConflict` if any cycle's version moved since it was read.
pub fn write_cycle_updates(
    conn: &mut SqliteConnection,
    employee_id: i64,
    updates: &[CycleUpdate],
) -> Result<(), PersistenceError> {
    for update in updates {
        let updated: usize = diesel::update(
            vacation_cycles::table
                .filter(vacation_cycles::cycle_id.eq(update.cycle_id))
                .filter(vacation_cycles::employee_id.eq(employee_id))
                .filter(vacation_cycles::version.eq(update.expected_version)),
        )
        .set((
            vacation_cycles::days_earned.eq(i32::from(update.days_earned)),
            vacation_cycles::days_used.eq(i32::from(update.days_used)),
            vacation_cycles::days_available.eq(i32::from(update.days_available)),
            vacation_cycles::is_expired.eq(i32::from(update.is_expired)),
            vacation_cycles::version.eq(vacation_cycles::version + 1_i64),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(PersistenceError::VersionConflict(format!(
                "cycle {} (service year {}) changed since version {}",
                update.cycle_id, update.years_of_service, update.expected_version
            )));
        }

        debug!(
            employee_id,
            cycle_id = update.cycle_id,
            days_used = update.days_used,
            days_available = update.days_available,
            is_expired = update.is_expired,
            "Updated cycle"
        );
    }
    Ok(())
}

/// Inserts a request row.
///
/// # Returns
///
/// The request ID assigned by the database.
///
/// # Errors
///
/// Returns `DuplicateOperation` if the request key was already recorded.
pub fn insert_request(
    conn: &mut SqliteConnection,
    request: &VacationRequest,
) -> Result<i64, PersistenceError> {
    let now: String = now_rfc3339()?;
    let allocation_json: String = serde_json::to_string(&request.allocation)?;

    let request_id: i64 = diesel::insert_into(vacation_requests::table)
        .values((
            vacation_requests::employee_id.eq(request.employee_id),
            vacation_requests::office_id.eq(request.office_id),
            vacation_requests::start_date.eq(request.start_date.to_string()),
            vacation_requests::end_date.eq(request.end_date.to_string()),
            vacation_requests::days_requested.eq(i32::from(request.days_requested)),
            vacation_requests::status.eq(request.status.as_str()),
            vacation_requests::reason.eq(request.reason.as_deref()),
            vacation_requests::approved_by.eq(request.approved_by.as_deref()),
            vacation_requests::rejected_reason.eq(request.rejected_reason.as_deref()),
            vacation_requests::cancelled_by.eq(request.cancelled_by.as_deref()),
            vacation_requests::request_key.eq(request.request_key.as_deref()),
            vacation_requests::allocation_json.eq(allocation_json.as_str()),
            vacation_requests::created_at.eq(now.as_str()),
            vacation_requests::updated_at.eq(now.as_str()),
        ))
        .returning(vacation_requests::request_id)
        .get_result::<i64>(conn)?;

    debug!(
        request_id,
        employee_id = request.employee_id,
        status = request.status.as_str(),
        "Inserted request"
    );
    Ok(request_id)
}

/// Writes a request's status, decision fields and recorded allocation,
/// guarded by the status read.
///
/// # Errors
///
/// Returns `RequestNotFound` if the request has no ID, or `VersionConflict`
/// if its stored status is no longer `expected_status`.
pub fn update_request_status(
    conn: &mut SqliteConnection,
    expected_status: RequestStatus,
    request: &VacationRequest,
) -> Result<i64, PersistenceError> {
    let request_id: i64 = request
        .request_id
        .ok_or(PersistenceError::RequestNotFound(0))?;
    let now: String = now_rfc3339()?;
    let allocation_json: String = serde_json::to_string(&request.allocation)?;

    let updated: usize = diesel::update(
        vacation_requests::table
            .filter(vacation_requests::request_id.eq(request_id))
            .filter(vacation_requests::status.eq(expected_status.as_str())),
    )
    .set((
        vacation_requests::status.eq(request.status.as_str()),
        vacation_requests::approved_by.eq(request.approved_by.as_deref()),
        vacation_requests::rejected_reason.eq(request.rejected_reason.as_deref()),
        vacation_requests::cancelled_by.eq(request.cancelled_by.as_deref()),
        vacation_requests::allocation_json.eq(allocation_json),
        vacation_requests::updated_at.eq(now),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::VersionConflict(format!(
            "request {request_id} is no longer {expected_status}"
        )));
    }

    debug!(
        request_id,
        from = expected_status.as_str(),
        to = request.status.as_str(),
        "Updated request status"
    );
    Ok(request_id)
}

/// Marks a request cancelled, guarded by the status read.
///
/// This is the bare row write. Returning days to cycles is the job of a
/// `CancelRequest` transition, which writes the cycles in the same commit.
///
/// # Errors
///
/// Returns `VersionConflict` if the stored status is no longer `expected_status`.
pub fn cancel_request(
    conn: &mut SqliteConnection,
    request_id: i64,
    expected_status: RequestStatus,
    cancelled_by: &str,
) -> Result<(), PersistenceError> {
    let now: String = now_rfc3339()?;

    let updated: usize = diesel::update(
        vacation_requests::table
            .filter(vacation_requests::request_id.eq(request_id))
            .filter(vacation_requests::status.eq(expected_status.as_str())),
    )
    .set((
        vacation_requests::status.eq(RequestStatus::Cancelled.as_str()),
        vacation_requests::cancelled_by.eq(cancelled_by),
        vacation_requests::updated_at.eq(now),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::VersionConflict(format!(
            "request {request_id} is no longer {expected_status}"
        )));
    }
    debug!(request_id, "Cancelled request");
    Ok(())
}
