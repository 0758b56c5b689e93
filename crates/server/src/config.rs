// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runtime settings for the ledger service.

use std::time::Duration;

use vacation_ledger_api::DEFAULT_MAX_CONFLICT_RETRIES;

/// Default time a mutation waits for the employee's lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Settings that govern how mutations are serialized and retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How long a mutation waits for the per-employee lock before `Busy`.
    pub lock_timeout: Duration,
    /// How many times a version conflict is re-applied before `Conflict`.
    pub max_conflict_retries: u32,
}

impl LedgerConfig {
    #[must_use]
    pub const fn new(lock_timeout_ms: u64, max_conflict_retries: u32) -> Self {
        Self {
            lock_timeout: Duration::from_millis(lock_timeout_ms),
            max_conflict_retries,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_CONFLICT_RETRIES)
    }
}
