// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-employee mutation locks and the bounded wait for the shared store.
//!
//! Every mutating handler holds its employee's lock across the whole
//! read-validate-write sequence. Locks for different employees never
//! contend. Waiting for a lock, or for the store behind it, gives up at a
//! deadline derived from the configured timeout.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, warn};
use vacation_ledger_api::ApiError;

/// Lock acquisition failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("ledger of employee {employee_id} is busy; gave up after {waited_ms} ms")]
    Timeout { employee_id: i64, waited_ms: u128 },
    #[error("ledger store is busy; gave up after {waited_ms} ms")]
    StoreBusy { waited_ms: u128 },
}

impl From<LockError> for ApiError {
    fn from(err: LockError) -> Self {
        Self::Busy {
            message: err.to_string(),
        }
    }
}

/// Registry of one async mutex per employee.
#[derive(Debug, Default)]
pub struct EmployeeLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl EmployeeLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the employee's lock until `deadline`.
    ///
    /// The guard releases the lock when dropped.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Timeout` if the lock is not free by `deadline`.
    pub async fn acquire(
        &self,
        employee_id: i64,
        deadline: Instant,
    ) -> Result<OwnedMutexGuard<()>, LockError> {
        let started: Instant = Instant::now();
        let lock: Arc<Mutex<()>> = {
            let mut locks: MutexGuard<'_, HashMap<i64, Arc<Mutex<()>>>> = self.locks.lock().await;
            Arc::clone(locks.entry(employee_id).or_default())
        };

        match tokio::time::timeout_at(deadline, lock.lock_owned()).await {
            Ok(guard) => {
                debug!(employee_id, "Acquired employee lock");
                Ok(guard)
            }
            Err(_) => {
                let waited_ms: u128 = started.elapsed().as_millis();
                warn!(employee_id, waited_ms, "Timed out waiting for employee lock");
                Err(LockError::Timeout {
                    employee_id,
                    waited_ms,
                })
            }
        }
    }
}

/// Waits for the shared store until `deadline`.
///
/// # Errors
///
/// Returns `LockError::StoreBusy` if the store is still held at `deadline`.
pub async fn lock_store_until<T>(
    store: &Mutex<T>,
    deadline: Instant,
) -> Result<MutexGuard<'_, T>, LockError> {
    let started: Instant = Instant::now();
    tokio::time::timeout_at(deadline, store.lock())
        .await
        .map_err(|_| {
            let waited_ms: u128 = started.elapsed().as_millis();
            warn!(waited_ms, "Timed out waiting for ledger store");
            LockError::StoreBusy { waited_ms }
        })
}
