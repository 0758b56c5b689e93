// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use vacation_ledger_audit::{Action, Actor, AuditEvent, Cause, CycleMove, StateSnapshot};

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventFullRow {
    event_id: i64,
    employee_id: i64,
    operation_key: Option<String>,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    recorded_at: String,
}

impl AuditEventFullRow {
    fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor_data: ActorData = serde_json::from_str(&self.actor_json)?;
        let cause_data: CauseData = serde_json::from_str(&self.cause_json)?;
        let action_data: ActionData = serde_json::from_str(&self.action_json)?;
        let before_data: StateSnapshotData = serde_json::from_str(&self.before_snapshot_json)?;
        let after_data: StateSnapshotData = serde_json::from_str(&self.after_snapshot_json)?;

        let mut event: AuditEvent = AuditEvent::new(
            self.employee_id,
            Actor::new(actor_data.id, actor_data.actor_type),
            Cause::new(cause_data.id, cause_data.description),
            Action::new(action_data.name, action_data.details).with_moves(
                action_data
                    .moves
                    .iter()
                    .map(|m| CycleMove {
                        years_of_service: m.years_of_service,
                        days: m.days,
                    })
                    .collect(),
            ),
            StateSnapshot::new(before_data.data),
            StateSnapshot::new(after_data.data),
        )
        .with_operation_key(self.operation_key);
        event.event_id = Some(self.event_id);
        event.recorded_at = Some(self.recorded_at);
        Ok(event)
    }
}

/// Retrieves an audit event by ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `event_id` - The event ID to retrieve
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let result: Result<AuditEventFullRow, diesel::result::Error> = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventFullRow::as_select())
        .first::<AuditEventFullRow>(conn);

    let row: AuditEventFullRow = match result {
        Ok(r) => r,
        Err(diesel::result::Error::NotFound) => {
            return Err(PersistenceError::EventNotFound(event_id));
        }
        Err(e) => return Err(PersistenceError::from(e)),
    };

    row.into_event()
}

/// Finds the event recorded under an operation's idempotency key.
///
/// # Errors
///
/// Returns an error if the query fails or the event cannot be deserialized.
pub fn find_event_by_operation_key(
    conn: &mut SqliteConnection,
    operation_key: &str,
) -> Result<Option<AuditEvent>, PersistenceError> {
    let row: Option<AuditEventFullRow> = audit_events::table
        .filter(audit_events::operation_key.eq(operation_key))
        .select(AuditEventFullRow::as_select())
        .first::<AuditEventFullRow>(conn)
        .optional()?;

    row.map(AuditEventFullRow::into_event).transpose()
}

/// Retrieves the complete audit timeline of an employee in commit order.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `employee_id` - The employee whose ledger history to read
///
/// # Errors
///
/// Returns an error if events cannot be retrieved or deserialized.
pub fn get_audit_timeline(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    tracing::debug!(employee_id, "Retrieving audit timeline");

    let rows: Vec<AuditEventFullRow> = audit_events::table
        .filter(audit_events::employee_id.eq(employee_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventFullRow::as_select())
        .load::<AuditEventFullRow>(conn)?;

    rows.into_iter().map(AuditEventFullRow::into_event).collect()
}
