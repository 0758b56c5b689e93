// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vacation_ledger_audit::{AuditEvent, StateSnapshot};
use vacation_ledger_domain::{
    AllocationPlan, CycleSync, DomainError, Employee, PlanEntry, RemovalPlan, RequestStatus,
    RestorationPlan, VacationCycle, VacationRequest, sort_cycles,
};

/// The complete ledger of a single employee.
///
/// State is scoped to one employee. Cycles are kept oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    /// The employee this ledger belongs to.
    pub employee: Employee,
    /// Every cycle of the employee, expired ones included.
    pub cycles: Vec<VacationCycle>,
    /// Every request of the employee, terminal ones included.
    pub requests: Vec<VacationRequest>,
}

impl LedgerState {
    /// Creates a ledger state, ordering cycles oldest first.
    ///
    /// # Arguments
    ///
    /// * `employee` - The employee
    /// * `cycles` - The employee's cycles
    /// * `requests` - The employee's requests
    #[must_use]
    pub fn new(
        employee: Employee,
        mut cycles: Vec<VacationCycle>,
        requests: Vec<VacationRequest>,
    ) -> Self {
        sort_cycles(&mut cycles);
        Self {
            employee,
            cycles,
            requests,
        }
    }

    /// Returns the persisted employee identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee has not been persisted.
    pub fn employee_id(&self) -> Result<i64, DomainError> {
        self.employee
            .employee_id
            .ok_or(DomainError::EmployeeNotFound { employee_id: 0 })
    }

    /// Finds a request by identifier.
    #[must_use]
    pub fn find_request(&self, request_id: i64) -> Option<&VacationRequest> {
        self.requests
            .iter()
            .find(|r| r.request_id == Some(request_id))
    }

    /// Converts the state to a snapshot for audit purposes.
    ///
    /// Format: `employee_id=7,cycles=[3:16/6/10,4:18/0/18x],active_requests=2`
    /// where each cycle reads `years:earned/used/available` and `x` marks expiry.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let mut cycles: String = String::new();
        for (index, cycle) in self.cycles.iter().enumerate() {
            if index > 0 {
                cycles.push(',');
            }
            cycles.push_str(&format!(
                "{}:{}/{}/{}{}",
                cycle.years_of_service,
                cycle.days_earned,
                cycle.days_used,
                cycle.days_available,
                if cycle.is_expired { "x" } else { "" }
            ));
        }

        let active_requests: usize = self
            .requests
            .iter()
            .filter(|r| r.status.is_active())
            .count();

        StateSnapshot::new(format!(
            "employee_id={},cycles=[{cycles}],active_requests={active_requests}",
            self.employee.employee_id.unwrap_or_default()
        ))
    }
}

/// A versioned write of one existing cycle's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleUpdate {
    /// The persisted cycle.
    pub cycle_id: i64,
    /// The anniversary year, for logging.
    pub years_of_service: u16,
    /// The version read before the change. The write fails if it moved.
    pub expected_version: i64,
    /// New entitlement.
    pub days_earned: u16,
    /// New consumed days.
    pub days_used: u16,
    /// New available days.
    pub days_available: u16,
    /// New expiry flag.
    pub is_expired: bool,
}

/// A write to the request ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestWrite {
    /// A new request row.
    Insert(VacationRequest),
    /// A status change guarded by the status read before the change.
    UpdateStatus {
        /// The status read before the change. The write fails if it moved.
        expected_status: RequestStatus,
        /// The updated request.
        request: VacationRequest,
    },
}

/// Every store write a transition requires, to be committed atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerChanges {
    /// Cycles to insert, with their final counters.
    pub created_cycles: Vec<VacationCycle>,
    /// Existing cycles to update.
    pub cycle_updates: Vec<CycleUpdate>,
    /// Request rows to insert or update.
    pub request_writes: Vec<RequestWrite>,
}

impl LedgerChanges {
    /// Computes the writes that turn `before` into `after`.
    ///
    /// Cycles without an identifier are new. Persisted cycles and requests
    /// are written only if they differ.
    #[must_use]
    pub fn between(before: &LedgerState, after: &LedgerState) -> Self {
        let mut changes: Self = Self::default();

        for cycle in &after.cycles {
            let Some(cycle_id) = cycle.cycle_id else {
                changes.created_cycles.push(cycle.clone());
                continue;
            };
            let original: Option<&VacationCycle> =
                before.cycles.iter().find(|c| c.cycle_id == Some(cycle_id));
            if let Some(original) = original.filter(|o| *o != cycle) {
                changes.cycle_updates.push(CycleUpdate {
                    cycle_id,
                    years_of_service: cycle.years_of_service,
                    expected_version: original.version,
                    days_earned: cycle.days_earned,
                    days_used: cycle.days_used,
                    days_available: cycle.days_available,
                    is_expired: cycle.is_expired,
                });
            }
        }

        for request in &after.requests {
            let Some(request_id) = request.request_id else {
                changes
                    .request_writes
                    .push(RequestWrite::Insert(request.clone()));
                continue;
            };
            if let Some(original) = before
                .find_request(request_id)
                .filter(|o| *o != request)
            {
                changes.request_writes.push(RequestWrite::UpdateStatus {
                    expected_status: original.status,
                    request: request.clone(),
                });
            }
        }

        changes
    }

    /// Returns whether nothing needs to be written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.created_cycles.is_empty()
            && self.cycle_updates.is_empty()
            && self.request_writes.is_empty()
    }
}

/// What a transition did, in ledger terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// Cycles were created or expired.
    CyclesSynced(CycleSync),
    /// A pending request was recorded.
    RequestSubmitted,
    /// Days were allocated to a request.
    Allocated(AllocationPlan),
    /// A pending request was rejected.
    RequestRejected,
    /// A request was cancelled. The plan is empty for pending requests.
    Cancelled(RestorationPlan),
    /// Days were added to a cycle.
    ToppedUp(PlanEntry),
    /// Days were clawed back.
    Removed(RemovalPlan),
    /// Request statuses advanced with the calendar.
    StatusesAdvanced {
        /// `(request_id, new_status)` pairs.
        advanced: Vec<(i64, RequestStatus)>,
    },
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: LedgerState,
    /// The store writes required to reach `new_state`.
    pub changes: LedgerChanges,
    /// What the transition did.
    pub outcome: LedgerOutcome,
    /// Cycle housekeeping performed before the command itself.
    pub cycle_sync: CycleSync,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
