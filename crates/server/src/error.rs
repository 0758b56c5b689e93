// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP rendering of API errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use vacation_ledger_api::ApiError;

use crate::locks::LockError;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Stable error kind, see [`ApiError::kind`].
    pub kind: String,
    /// Error message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error kind.
    pub kind: &'static str,
    /// The error message.
    pub message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Maps an API error kind onto its HTTP status.
const fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::AlreadyCancelled { .. } | ApiError::Conflict { .. } => StatusCode::CONFLICT,
        ApiError::InsufficientDays { .. }
        | ApiError::InvalidOperation { .. }
        | ApiError::DomainRuleViolation { .. }
        | ApiError::ConfirmationRequired { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::Busy { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = status_for(&err);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "Internal error");
        }
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<LockError> for HttpError {
    fn from(err: LockError) -> Self {
        ApiError::from(err).into()
    }
}
