// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vacation_ledger_domain::{DomainError, RestorationPlan};

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// Cancelling would lose days and the caller did not acknowledge the loss.
    ///
    /// Nothing was changed. The plan is returned so the loss can be shown.
    LossNotAcknowledged {
        /// The request being cancelled.
        request_id: i64,
        /// Days that would not be recoverable.
        lost_days: u16,
        /// The full restoration plan.
        plan: RestorationPlan,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::LossNotAcknowledged {
                request_id,
                lost_days,
                ..
            } => write!(
                f,
                "Cancelling request {request_id} would lose {lost_days} days; confirmation required"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
