//! # error
//!
//! Centralised application error types.
//!
//! [`ScanError`] covers the engine's one contract violation; [`AppError`] is
//! what every handler returns, and its `IntoResponse` impl converts failures
//! into structured JSON bodies so API clients always get a machine-readable
//! response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ─── Engine Errors ────────────────────────────────────────────────────────────

/// Failures inside the evaluation core.
///
/// Missing history is deliberately NOT represented here: too few bars for an
/// indicator yields a documented neutral value, because thin history is an
/// expected steady state. The only error the core can raise is a caller
/// breaking its contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// `build_current_bar` was called with no minute bars at all. Distinct
    /// from "no data available": the caller must check before synthesising.
    #[error("cannot synthesise a bar from an empty minute series")]
    EmptyInput,
}

// ─── API Errors ───────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was syntactically correct but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested resource (e.g. an instrument) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The MT5 bridge rejected or failed a market-data request.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// An engine contract violation leaked out of a cycle.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Scan(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {err}"),
            ),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
