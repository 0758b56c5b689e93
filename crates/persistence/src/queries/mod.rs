// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event queries
//! - `ledger`: Employee, cycle and request queries

pub mod audit;
pub mod ledger;

pub use audit::{find_event_by_operation_key, get_audit_event, get_audit_timeline};
pub use ledger::{
    find_request_by_key, get_employee, get_request, list_employees,
    list_requests_for_employee, list_requests_for_office, load_ledger_state, read_cycles,
};
