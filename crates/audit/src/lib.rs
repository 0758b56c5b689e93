// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

/// Represents the entity performing an action.
///
/// An actor is a person or process that changes an employee's ledger:
/// an HR operator, the employee themselves, or a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "operator", "employee", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The actor used for scheduled housekeeping such as cycle expiration.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., ticket or request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Days an action moved in or out of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleMove {
    /// The anniversary year identifying the cycle.
    pub years_of_service: u16,
    /// Days moved.
    pub days: u16,
}

/// Represents the ledger operation performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`ApproveRequest`", "`RemoveDays`").
    pub name: String,
    /// Human-readable details: the plan applied, days lost, the adjustment reason.
    pub details: Option<String>,
    /// Per-cycle days deducted, restored or added. Empty for actions that
    /// move no days.
    pub moves: Vec<CycleMove>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self {
            name,
            details,
            moves: Vec::new(),
        }
    }

    /// Records the per-cycle days the action moved.
    #[must_use]
    pub fn with_moves(mut self, moves: Vec<CycleMove>) -> Self {
        self.moves = moves;
        self
    }

    /// Total days moved across all cycles.
    #[must_use]
    pub fn moved_days(&self) -> u16 {
        self.moves.iter().map(|m| m.days).sum()
    }
}

/// A serialized view of an employee's ledger at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// The serialized ledger state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `data` - A string representation of the state
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable audit event representing one ledger transition.
///
/// Every successful ledger mutation produces exactly one audit event,
/// committed in the same transaction as the mutation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The store-assigned identifier. `None` until persisted.
    pub event_id: Option<i64>,
    /// The employee whose ledger changed.
    pub employee_id: i64,
    /// Idempotency key of the operation, when the caller supplied one.
    pub operation_key: Option<String>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
    /// When the store recorded the event (RFC 3339).
    pub recorded_at: Option<String>,
}

impl AuditEvent {
    /// Creates a new, unpersisted `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `employee_id` - The employee whose ledger changed
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        employee_id: i64,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            employee_id,
            operation_key: None,
            actor,
            cause,
            action,
            before,
            after,
            recorded_at: None,
        }
    }

    /// Attaches the operation's idempotency key.
    #[must_use]
    pub fn with_operation_key(mut self, operation_key: Option<String>) -> Self {
        self.operation_key = operation_key;
        self
    }
}
