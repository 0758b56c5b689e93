// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-apply-commit with bounded conflict retry.
//!
//! A command is applied to a freshly loaded ledger and the resulting
//! transition is committed. When the store reports that a cycle or request
//! moved in between, the ledger is reloaded and the command re-applied, up
//! to `max_conflict_retries` times.

use std::time::{SystemTime, UNIX_EPOCH};
use time::Date;
use tracing::{debug, error, info, warn};
use vacation_ledger::{Command, LedgerState, TransitionResult, apply};
use vacation_ledger_audit::{Actor, Cause};
use vacation_ledger_persistence::{PersistTransitionResult, PersistenceError, SqlitePersistence};

use crate::error::{ApiError, translate_core_error, translate_persistence_error};

/// Default number of times a conflicting command is re-applied.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Who is acting, why, and against which date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    /// The operator performing the operation.
    pub actor: Actor,
    /// The cause recorded in the audit trail.
    pub cause: Cause,
    /// The reference date for activity, expiry and status advance.
    pub as_of: Date,
    /// How many times a version conflict is retried before giving up.
    pub max_conflict_retries: u32,
}

impl OperationContext {
    /// Creates a context with the default retry cap.
    #[must_use]
    pub const fn new(actor: Actor, cause: Cause, as_of: Date) -> Self {
        Self {
            actor,
            cause,
            as_of,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    /// Sets the retry cap.
    #[must_use]
    pub const fn with_max_conflict_retries(mut self, max_conflict_retries: u32) -> Self {
        self.max_conflict_retries = max_conflict_retries;
        self
    }
}

/// How an execution ended.
#[derive(Debug)]
pub enum Execution {
    /// The transition was committed.
    Committed {
        /// The applied transition.
        result: Box<TransitionResult>,
        /// IDs assigned by the store.
        persisted: PersistTransitionResult,
    },
    /// A housekeeping command found nothing to do; nothing was written.
    Unchanged {
        /// The (empty) transition.
        result: Box<TransitionResult>,
    },
    /// The idempotency key was already recorded by an earlier operation.
    Duplicate,
}

/// Applies `command` to the employee's stored ledger and commits the result.
///
/// Housekeeping commands that change nothing are not committed.
///
/// # Errors
///
/// Returns an error if the command is rejected, the retry cap is exhausted
/// (`Conflict`), or the store fails.
pub fn execute_command(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    command: &Command,
    ctx: &OperationContext,
    operation_key: Option<&str>,
) -> Result<Execution, ApiError> {
    execute_with_retry(
        persistence,
        employee_id,
        ctx,
        operation_key,
        command.is_housekeeping(),
        |state| {
            apply(
                state,
                command.clone(),
                ctx.actor.clone(),
                ctx.cause.clone(),
                ctx.as_of,
            )
            .map_err(translate_core_error)
        },
    )
}

/// Runs the load-transition-commit loop with a caller-supplied transition.
///
/// `transition` is called once per attempt with the freshly loaded ledger.
///
/// # Errors
///
/// Returns the transition's error unchanged, `Conflict` once the retry cap
/// is exhausted, or the translated store error.
pub fn execute_with_retry<F>(
    persistence: &mut SqlitePersistence,
    employee_id: i64,
    ctx: &OperationContext,
    operation_key: Option<&str>,
    skip_if_unchanged: bool,
    mut transition: F,
) -> Result<Execution, ApiError>
where
    F: FnMut(&LedgerState) -> Result<TransitionResult, ApiError>,
{
    let mut attempt: u32 = 0;
    loop {
        let state: LedgerState = persistence
            .load_ledger_state(employee_id)
            .map_err(translate_persistence_error)?;
        let mut result: TransitionResult = transition(&state)?;

        if skip_if_unchanged && result.changes.is_empty() {
            debug!(employee_id, action = %result.audit_event.action.name, "Nothing to commit");
            return Ok(Execution::Unchanged {
                result: Box::new(result),
            });
        }

        result.audit_event = result
            .audit_event
            .with_operation_key(operation_key.map(String::from));

        match persistence.persist_transition(&result) {
            Ok(persisted) => {
                info!(
                    employee_id,
                    event_id = persisted.event_id,
                    action = %result.audit_event.action.name,
                    attempts = attempt + 1,
                    "Committed ledger operation"
                );
                return Ok(Execution::Committed {
                    result: Box::new(result),
                    persisted,
                });
            }
            Err(PersistenceError::VersionConflict(message))
                if attempt < ctx.max_conflict_retries =>
            {
                attempt += 1;
                warn!(employee_id, attempt, %message, "Version conflict, retrying");
            }
            Err(PersistenceError::VersionConflict(message)) => {
                warn!(employee_id, attempts = attempt + 1, %message, "Version conflict, giving up");
                return Err(ApiError::Conflict {
                    message: format!(
                        "Ledger of employee {employee_id} kept changing after {} attempt(s): {message}",
                        attempt + 1
                    ),
                });
            }
            Err(PersistenceError::DuplicateOperation(message)) if operation_key.is_some() => {
                info!(employee_id, %message, "Operation key already recorded");
                return Ok(Execution::Duplicate);
            }
            Err(err) => {
                error!(employee_id, error = %err, "Failed to commit ledger operation");
                return Err(translate_persistence_error(err));
            }
        }
    }
}

/// Generates an idempotency key for an adjustment submitted without one.
#[must_use]
pub fn generate_operation_key() -> String {
    let timestamp: u128 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0))
        .as_nanos();
    format!("adj_{timestamp}_{}", rand::random::<u64>())
}
