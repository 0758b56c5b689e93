// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! None of these functions opens a transaction; the `SqlitePersistence`
//! adapter wraps each public operation in one.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event persistence
//! - `ledger`: Employee, cycle and request writes
//! - `transition`: Orchestration (`persist_transition`)

pub mod audit;
pub mod ledger;
pub mod transition;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::PersistenceError;

pub use ledger::{
    cancel_request, create_cycle, insert_employee, insert_request, write_cycle_updates,
};
pub use transition::{PersistTransitionResult, persist_transition};

/// Returns the current UTC time as an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn now_rfc3339() -> Result<String, PersistenceError> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}
