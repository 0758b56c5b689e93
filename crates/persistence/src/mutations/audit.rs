// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use vacation_ledger_audit::AuditEvent;

use crate::data_models::{
    ActionData, ActorData, CauseData, CycleMoveData, StateSnapshotData,
};
use crate::diesel_schema;
use crate::error::PersistenceError;
use crate::mutations::now_rfc3339;

/// Persists an audit event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns `DuplicateOperation` if the event's operation key was already
/// recorded, or an error if persistence or serialization fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };

    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };

    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
        moves: event
            .action
            .moves
            .iter()
            .map(|m| CycleMoveData {
                years_of_service: m.years_of_service,
                days: m.days,
            })
            .collect(),
    };

    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };

    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    // Serialize JSON fields
    let actor_json: String = serde_json::to_string(&actor_data)?;
    let cause_json: String = serde_json::to_string(&cause_data)?;
    let action_json: String = serde_json::to_string(&action_data)?;
    let before_json: String = serde_json::to_string(&before_data)?;
    let after_json: String = serde_json::to_string(&after_data)?;
    let recorded_at: String = now_rfc3339()?;

    let event_id: i64 = diesel::insert_into(diesel_schema::audit_events::table)
        .values((
            diesel_schema::audit_events::employee_id.eq(event.employee_id),
            diesel_schema::audit_events::operation_key.eq(event.operation_key.as_deref()),
            diesel_schema::audit_events::actor_json.eq(actor_json),
            diesel_schema::audit_events::cause_json.eq(cause_json),
            diesel_schema::audit_events::action_json.eq(action_json),
            diesel_schema::audit_events::before_snapshot_json.eq(before_json),
            diesel_schema::audit_events::after_snapshot_json.eq(after_json),
            diesel_schema::audit_events::recorded_at.eq(recorded_at),
        ))
        .returning(diesel_schema::audit_events::event_id)
        .get_result::<i64>(conn)?;

    debug!(
        event_id,
        employee_id = event.employee_id,
        action = %event.action.name,
        "Persisted audit event"
    );

    Ok(event_id)
}
