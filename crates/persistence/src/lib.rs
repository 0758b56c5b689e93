// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the vacation-cycle ledger.
//!
//! This crate is the transactional store behind the ledger: the employee
//! directory, vacation cycles, vacation requests and the audit trail. It is
//! built on Diesel with the `SQLite` backend.
//!
//! ## Transactions
//!
//! Every write goes through an immediate (`BEGIN IMMEDIATE`) transaction, so
//! concurrent writers serialize at the database instead of failing on lock
//! upgrade. [`SqlitePersistence::persist_transition`] commits all writes of
//! one ledger command (cycle creation, versioned cycle updates, the request
//! write and the audit event) or none of them.
//!
//! ## Optimistic Concurrency
//!
//! Cycle rows carry a `version` that every update increments. An update
//! naming a stale version, or a request status write whose guard status has
//! moved, fails with [`PersistenceError::VersionConflict`]. Callers reload
//! the ledger and re-apply the command.
//!
//! ## Idempotency
//!
//! Request keys and operation keys are unique. Recording either twice fails
//! with [`PersistenceError::DuplicateOperation`]; the earlier outcome can be
//! found with [`SqlitePersistence::find_event_by_operation_key`] and
//! [`SqlitePersistence::find_request_by_key`].
//!
//! ## Testing
//!
//! Tests use uniquely named shared in-memory databases, one per
//! [`SqlitePersistence::new_in_memory`] call.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use vacation_ledger::{CycleUpdate, LedgerState, TransitionResult};
use vacation_ledger_audit::AuditEvent;
use vacation_ledger_domain::{Employee, RequestStatus, VacationCycle, VacationRequest};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::MIGRATIONS;
pub use error::PersistenceError;
pub use mutations::PersistTransitionResult;

/// Persistence adapter for the ledger store.
pub struct SqlitePersistence {
    conn: SqliteConnection,
}

impl SqlitePersistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared in-memory database, so tests are
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::configure_file_database(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Employee Directory
    // ========================================================================

    /// Inserts an employee into the directory.
    ///
    /// # Returns
    ///
    /// The employee ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_employee(&mut self, employee: &Employee) -> Result<i64, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::insert_employee(conn, employee))
    }

    /// Retrieves an employee by ID.
    ///
    /// # Errors
    ///
    /// Returns `EmployeeNotFound` if no such employee exists.
    pub fn get_employee(&mut self, employee_id: i64) -> Result<Employee, PersistenceError> {
        queries::get_employee(&mut self.conn, employee_id)
    }

    /// Lists every employee in the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_employees(&mut self) -> Result<Vec<Employee>, PersistenceError> {
        queries::list_employees(&mut self.conn)
    }

    // ========================================================================
    // Cycles
    // ========================================================================

    /// Reads every cycle of an employee, oldest first. Never creates cycles.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn read_cycles(&mut self, employee_id: i64) -> Result<Vec<VacationCycle>, PersistenceError> {
        queries::read_cycles(&mut self.conn, employee_id)
    }

    /// Creates a cycle, idempotent on `(employee_id, years_of_service)`.
    ///
    /// # Returns
    ///
    /// The stored cycle: the new row, or the existing one untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn create_cycle(
        &mut self,
        cycle: &VacationCycle,
    ) -> Result<VacationCycle, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::create_cycle(conn, cycle))
    }

    /// Writes a set of versioned cycle updates for one employee atomically.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if any cycle changed since it was read;
    /// no update is written in that case.
    pub fn write_cycles(
        &mut self,
        employee_id: i64,
        updates: &[CycleUpdate],
    ) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::write_cycle_updates(conn, employee_id, updates)
        })
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Inserts a request row as given.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateOperation` if the request key was already recorded.
    pub fn insert_request(&mut self, request: &VacationRequest) -> Result<i64, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::insert_request(conn, request))
    }

    /// Marks a request cancelled without touching cycles.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if the stored status is no longer `expected_status`.
    pub fn cancel_request(
        &mut self,
        request_id: i64,
        expected_status: RequestStatus,
        cancelled_by: &str,
    ) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::cancel_request(conn, request_id, expected_status, cancelled_by)
        })
    }

    /// Retrieves a request by ID.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` if no such request exists.
    pub fn get_request(&mut self, request_id: i64) -> Result<VacationRequest, PersistenceError> {
        queries::get_request(&mut self.conn, request_id)
    }

    /// Finds the request recorded under a client idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn find_request_by_key(
        &mut self,
        request_key: &str,
    ) -> Result<Option<VacationRequest>, PersistenceError> {
        queries::find_request_by_key(&mut self.conn, request_key)
    }

    /// Lists every request of an office.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_requests_for_office(
        &mut self,
        office_id: i64,
    ) -> Result<Vec<VacationRequest>, PersistenceError> {
        queries::list_requests_for_office(&mut self.conn, office_id)
    }

    /// Lists every request of an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_requests_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<VacationRequest>, PersistenceError> {
        queries::list_requests_for_employee(&mut self.conn, employee_id)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Loads the complete ledger of one employee.
    ///
    /// # Errors
    ///
    /// Returns `EmployeeNotFound` if the employee does not exist.
    pub fn load_ledger_state(&mut self, employee_id: i64) -> Result<LedgerState, PersistenceError> {
        queries::load_ledger_state(&mut self.conn, employee_id)
    }

    /// Persists a transition result atomically.
    ///
    /// # Arguments
    ///
    /// * `result` - The transition result to persist
    ///
    /// # Returns
    ///
    /// The IDs assigned to the audit event, created cycles and written requests.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` or `DuplicateOperation` for concurrent or
    /// repeated operations, or another error if a write fails. Nothing is
    /// written on error.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::persist_transition(&mut self.conn, result)
    }

    // ========================================================================
    // Audit Event Queries
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::get_audit_event(&mut self.conn, event_id)
    }

    /// Finds the event recorded under an operation's idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn find_event_by_operation_key(
        &mut self,
        operation_key: &str,
    ) -> Result<Option<AuditEvent>, PersistenceError> {
        queries::find_event_by_operation_key(&mut self.conn, operation_key)
    }

    /// Retrieves the ordered audit timeline of an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if events cannot be retrieved or deserialized.
    pub fn get_audit_timeline(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::get_audit_timeline(&mut self.conn, employee_id)
    }
}
