// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transition orchestration.
//!
//! Commits every write of one `TransitionResult` (created cycles, versioned
//! cycle updates, request writes and the audit event) in a single
//! `BEGIN IMMEDIATE` transaction. Any failure rolls all of them back.

use diesel::SqliteConnection;
use tracing::info;
use vacation_ledger::{RequestWrite, TransitionResult};

use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::ledger::{
    insert_new_cycle, insert_request, update_request_status, write_cycle_updates,
};

/// IDs assigned while persisting a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The audit event recording the transition.
    pub event_id: i64,
    /// IDs of the cycles the transition created, in creation order.
    pub created_cycle_ids: Vec<i64>,
    /// IDs of the requests the transition wrote, in write order.
    pub request_ids: Vec<i64>,
}

/// Persists a transition result atomically.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The transition result to persist
///
/// # Errors
///
/// Returns `VersionConflict` if any row changed since the ledger was read,
/// `DuplicateOperation` if the request key or operation key was already
/// recorded, or another error if a write fails. Nothing is written on error.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let employee_id: i64 = result.audit_event.employee_id;

        let mut created_cycle_ids: Vec<i64> = Vec::new();
        for cycle in &result.changes.created_cycles {
            created_cycle_ids.push(insert_new_cycle(conn, cycle)?);
        }

        write_cycle_updates(conn, employee_id, &result.changes.cycle_updates)?;

        let mut request_ids: Vec<i64> = Vec::new();
        for write in &result.changes.request_writes {
            let request_id: i64 = match write {
                RequestWrite::Insert(request) => insert_request(conn, request)?,
                RequestWrite::UpdateStatus {
                    expected_status,
                    request,
                } => update_request_status(conn, *expected_status, request)?,
            };
            request_ids.push(request_id);
        }

        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        info!(
            event_id,
            employee_id,
            action = %result.audit_event.action.name,
            created_cycles = created_cycle_ids.len(),
            cycle_updates = result.changes.cycle_updates.len(),
            request_writes = request_ids.len(),
            "Persisted transition"
        );

        Ok(PersistTransitionResult {
            event_id,
            created_cycle_ids,
            request_ids,
        })
    })
}
