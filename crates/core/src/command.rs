// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vacation_ledger_domain::{RemovalMode, VacationRequest};

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request ledger changes. Every command is
/// scoped to the employee whose [`crate::LedgerState`] it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create missing cycles and mark lapsed cycles expired.
    EnsureCycles,
    /// Record a pending request. No days are deducted.
    SubmitRequest {
        /// The request to record.
        request: VacationRequest,
    },
    /// Record a request as approved and allocate its days in one step.
    CreateAndApproveRequest {
        /// The request to record.
        request: VacationRequest,
        /// Who approved it.
        approved_by: String,
    },
    /// Approve a pending request, allocating its days.
    ApproveRequest {
        /// The pending request.
        request_id: i64,
        /// Who approved it.
        approved_by: String,
    },
    /// Reject a pending request.
    RejectRequest {
        /// The pending request.
        request_id: i64,
        /// Why it was rejected.
        reason: String,
    },
    /// Cancel a request, restoring any days it holds.
    CancelRequest {
        /// The request to cancel.
        request_id: i64,
        /// Proceed even if some days cannot be restored.
        acknowledge_loss: bool,
    },
    /// Top up the oldest active cycle.
    AddDays {
        /// Days to add.
        days: u16,
        /// Mandatory justification.
        reason: String,
    },
    /// Claw back days from the active cycles.
    RemoveDays {
        /// Absolute or target-remaining amount.
        mode: RemovalMode,
        /// Mandatory justification.
        reason: String,
    },
    /// Move approved requests to in-progress or completed as their dates pass.
    AdvanceRequestStatuses,
}

impl Command {
    /// Returns the action name recorded in audit events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EnsureCycles => "EnsureCycles",
            Self::SubmitRequest { .. } => "SubmitRequest",
            Self::CreateAndApproveRequest { .. } => "CreateAndApproveRequest",
            Self::ApproveRequest { .. } => "ApproveRequest",
            Self::RejectRequest { .. } => "RejectRequest",
            Self::CancelRequest { .. } => "CancelRequest",
            Self::AddDays { .. } => "AddDays",
            Self::RemoveDays { .. } => "RemoveDays",
            Self::AdvanceRequestStatuses => "AdvanceRequestStatuses",
        }
    }

    /// Returns whether the command only performs cycle housekeeping.
    #[must_use]
    pub const fn is_housekeeping(&self) -> bool {
        matches!(self, Self::EnsureCycles | Self::AdvanceRequestStatuses)
    }
}
