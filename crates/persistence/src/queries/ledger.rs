// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Employee, cycle and request queries.
//!
//! Dates are stored as ISO 8601 text and small counters as `INTEGER`;
//! every row is checked on the way back into a domain value.

use std::str::FromStr;

use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use time::Date;
use tracing::debug;
use vacation_ledger::LedgerState;
use vacation_ledger_domain::{
    Employee, RequestStatus, VacationCycle, VacationRequest, parse_date,
};

use crate::diesel_schema::{employees, vacation_cycles, vacation_requests};
use crate::error::PersistenceError;

/// Diesel Queryable struct for employee rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = employees)]
struct EmployeeRow {
    employee_id: i64,
    office_id: i64,
    full_name: String,
    hire_date: String,
    is_active: i32,
}

/// Diesel Queryable struct for cycle rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vacation_cycles)]
struct CycleRow {
    cycle_id: i64,
    employee_id: i64,
    years_of_service: i32,
    cycle_start_date: String,
    cycle_end_date: String,
    days_earned: i32,
    days_used: i32,
    days_available: i32,
    is_expired: i32,
    version: i64,
}

/// Diesel Queryable struct for request rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vacation_requests)]
struct RequestRow {
    request_id: i64,
    employee_id: i64,
    office_id: i64,
    start_date: String,
    end_date: String,
    days_requested: i32,
    status: String,
    reason: Option<String>,
    approved_by: Option<String>,
    rejected_reason: Option<String>,
    cancelled_by: Option<String>,
    request_key: Option<String>,
    allocation_json: String,
    created_at: String,
    updated_at: String,
}

fn stored_date(column: &str, value: &str) -> Result<Date, PersistenceError> {
    parse_date(value)
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column}: {e}")))
}

fn stored_count(column: &str, value: i32) -> Result<u16, PersistenceError> {
    value.to_u16().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!("{column} out of range: {value}"))
    })
}

impl EmployeeRow {
    fn into_employee(self) -> Result<Employee, PersistenceError> {
        let hire_date: Date = stored_date("hire_date", &self.hire_date)?;
        Ok(Employee::with_id(
            self.employee_id,
            self.office_id,
            self.full_name,
            hire_date,
            self.is_active != 0,
        ))
    }
}

impl CycleRow {
    fn into_cycle(self) -> Result<VacationCycle, PersistenceError> {
        Ok(VacationCycle {
            cycle_id: Some(self.cycle_id),
            employee_id: self.employee_id,
            years_of_service: stored_count("years_of_service", self.years_of_service)?,
            cycle_start_date: stored_date("cycle_start_date", &self.cycle_start_date)?,
            cycle_end_date: stored_date("cycle_end_date", &self.cycle_end_date)?,
            days_earned: stored_count("days_earned", self.days_earned)?,
            days_used: stored_count("days_used", self.days_used)?,
            days_available: stored_count("days_available", self.days_available)?,
            is_expired: self.is_expired != 0,
            version: self.version,
        })
    }
}

impl RequestRow {
    fn into_request(self) -> Result<VacationRequest, PersistenceError> {
        let status: RequestStatus = RequestStatus::from_str(&self.status)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        Ok(VacationRequest {
            request_id: Some(self.request_id),
            employee_id: self.employee_id,
            office_id: self.office_id,
            start_date: stored_date("start_date", &self.start_date)?,
            end_date: stored_date("end_date", &self.end_date)?,
            days_requested: stored_count("days_requested", self.days_requested)?,
            status,
            reason: self.reason,
            approved_by: self.approved_by,
            rejected_reason: self.rejected_reason,
            cancelled_by: self.cancelled_by,
            request_key: self.request_key,
            allocation: serde_json::from_str(&self.allocation_json)?,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// Retrieves an employee by ID.
///
/// # Errors
///
/// Returns `EmployeeNotFound` if no such employee exists.
pub fn get_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Employee, PersistenceError> {
    let row: EmployeeRow = employees::table
        .filter(employees::employee_id.eq(employee_id))
        .select(EmployeeRow::as_select())
        .first::<EmployeeRow>(conn)
        .optional()?
        .ok_or(PersistenceError::EmployeeNotFound(employee_id))?;

    row.into_employee()
}

/// Lists every employee, ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_employees(conn: &mut SqliteConnection) -> Result<Vec<Employee>, PersistenceError> {
    let rows: Vec<EmployeeRow> = employees::table
        .order(employees::employee_id.asc())
        .select(EmployeeRow::as_select())
        .load::<EmployeeRow>(conn)?;

    rows.into_iter().map(EmployeeRow::into_employee).collect()
}

/// Reads every cycle of an employee, expired ones included, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn read_cycles(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<VacationCycle>, PersistenceError> {
    let rows: Vec<CycleRow> = vacation_cycles::table
        .filter(vacation_cycles::employee_id.eq(employee_id))
        .order((
            vacation_cycles::cycle_start_date.asc(),
            vacation_cycles::years_of_service.asc(),
        ))
        .select(CycleRow::as_select())
        .load::<CycleRow>(conn)?;

    debug!(employee_id, count = rows.len(), "Read cycles");
    rows.into_iter().map(CycleRow::into_cycle).collect()
}

/// Finds the cycle of an employee for one anniversary year.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_cycle(
    conn: &mut SqliteConnection,
    employee_id: i64,
    years_of_service: u16,
) -> Result<Option<VacationCycle>, PersistenceError> {
    let row: Option<CycleRow> = vacation_cycles::table
        .filter(vacation_cycles::employee_id.eq(employee_id))
        .filter(vacation_cycles::years_of_service.eq(i32::from(years_of_service)))
        .select(CycleRow::as_select())
        .first::<CycleRow>(conn)
        .optional()?;

    row.map(CycleRow::into_cycle).transpose()
}

/// Retrieves a request by ID.
///
/// # Errors
///
/// Returns `RequestNotFound` if no such request exists.
pub fn get_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<VacationRequest, PersistenceError> {
    let row: RequestRow = vacation_requests::table
        .filter(vacation_requests::request_id.eq(request_id))
        .select(RequestRow::as_select())
        .first::<RequestRow>(conn)
        .optional()?
        .ok_or(PersistenceError::RequestNotFound(request_id))?;

    row.into_request()
}

/// Finds the request recorded under a client idempotency key.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_request_by_key(
    conn: &mut SqliteConnection,
    request_key: &str,
) -> Result<Option<VacationRequest>, PersistenceError> {
    let row: Option<RequestRow> = vacation_requests::table
        .filter(vacation_requests::request_key.eq(request_key))
        .select(RequestRow::as_select())
        .first::<RequestRow>(conn)
        .optional()?;

    row.map(RequestRow::into_request).transpose()
}

/// Lists every request of an employee, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_requests_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<VacationRequest>, PersistenceError> {
    let rows: Vec<RequestRow> = vacation_requests::table
        .filter(vacation_requests::employee_id.eq(employee_id))
        .order((
            vacation_requests::start_date.asc(),
            vacation_requests::request_id.asc(),
        ))
        .select(RequestRow::as_select())
        .load::<RequestRow>(conn)?;

    rows.into_iter().map(RequestRow::into_request).collect()
}

/// Lists every request of an office, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_requests_for_office(
    conn: &mut SqliteConnection,
    office_id: i64,
) -> Result<Vec<VacationRequest>, PersistenceError> {
    let rows: Vec<RequestRow> = vacation_requests::table
        .filter(vacation_requests::office_id.eq(office_id))
        .order((
            vacation_requests::start_date.asc(),
            vacation_requests::request_id.asc(),
        ))
        .select(RequestRow::as_select())
        .load::<RequestRow>(conn)?;

    rows.into_iter().map(RequestRow::into_request).collect()
}

/// Loads the complete ledger of one employee.
///
/// # Errors
///
/// Returns `EmployeeNotFound` if the employee does not exist, or an error if
/// any row cannot be read.
pub fn load_ledger_state(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<LedgerState, PersistenceError> {
    let employee: Employee = get_employee(conn, employee_id)?;
    let cycles: Vec<VacationCycle> = read_cycles(conn, employee_id)?;
    let requests: Vec<VacationRequest> = list_requests_for_employee(conn, employee_id)?;

    Ok(LedgerState::new(employee, cycles, requests))
}
