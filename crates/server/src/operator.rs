// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator context extraction for mutating endpoints.
//!
//! Every mutation is attributed to an actor and a cause, carried in request
//! headers:
//!
//! - `x-actor-id` (required)
//! - `x-actor-type` (defaults to `operator`)
//! - `x-cause-id` (required)
//! - `x-cause-description` (optional)
//! - `x-as-of` (optional ISO date; defaults to today in UTC)

use axum::{extract::FromRequestParts, http::request::Parts};
use time::{Date, OffsetDateTime};
use tracing::debug;
use vacation_ledger_api::{ApiError, OperationContext, translate_domain_error};
use vacation_ledger_audit::{Actor, Cause};
use vacation_ledger_domain::parse_date;

use crate::AppState;
use crate::error::HttpError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_TYPE_HEADER: &str = "x-actor-type";
pub const CAUSE_ID_HEADER: &str = "x-cause-id";
pub const CAUSE_DESCRIPTION_HEADER: &str = "x-cause-description";
pub const AS_OF_HEADER: &str = "x-as-of";

/// Extractor for the context of a mutating request.
pub struct Operator(pub OperationContext);

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiError> {
    parts
        .headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| ApiError::InvalidInput {
                field: name.to_string(),
                message: String::from("header is not valid ASCII"),
            })
        })
        .transpose()
}

fn required_header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    match header(parts, name)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::InvalidInput {
            field: name.to_string(),
            message: String::from("header is required"),
        }),
    }
}

/// Resolves an optional ISO date, defaulting to today in UTC.
///
/// # Errors
///
/// Returns `InvalidInput` if the value is not an ISO date.
pub fn resolve_as_of(value: Option<&str>) -> Result<Date, ApiError> {
    value.map_or_else(
        || Ok(OffsetDateTime::now_utc().date()),
        |raw| parse_date(raw).map_err(translate_domain_error),
    )
}

impl FromRequestParts<AppState> for Operator {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor: Actor = Actor::new(
            required_header(parts, ACTOR_ID_HEADER)?.to_string(),
            header(parts, ACTOR_TYPE_HEADER)?
                .unwrap_or("operator")
                .to_string(),
        );
        let cause: Cause = Cause::new(
            required_header(parts, CAUSE_ID_HEADER)?.to_string(),
            header(parts, CAUSE_DESCRIPTION_HEADER)?
                .unwrap_or_default()
                .to_string(),
        );
        let as_of: Date = resolve_as_of(header(parts, AS_OF_HEADER)?)?;

        debug!(actor_id = %actor.id, cause_id = %cause.id, %as_of, "Resolved operator context");

        Ok(Self(
            OperationContext::new(actor, cause, as_of)
                .with_max_conflict_retries(state.config.max_conflict_retries),
        ))
    }
}
