//! # routes::scan
//!
//! Axum route handlers for the scan grid.
//!
//! | Method | Path                | Description                         |
//! |--------|---------------------|-------------------------------------|
//! | GET    | `/api/scan/results` | Latest composed grid + metadata     |
//! | POST   | `/api/scan/refresh` | Trigger a cycle now (skip if busy)  |
//! | GET    | `/api/health`       | Liveness + cycle counters           |

use std::sync::atomic::Ordering;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::engine::scanner::{run_cycle, CycleOutcome};
use crate::error::AppError;
use crate::state::SharedState;

// ─── GET /api/scan/results ────────────────────────────────────────────────────

pub async fn get_results(State(state): State<SharedState>) -> impl IntoResponse {
    let grid = state.grid.read().await;
    Json(json!({
        "ok":          true,
        "rows":        grid.rows,
        "results":     grid.results,
        "last_update": grid.last_update,
        "cycles":      state.cycle_count.load(Ordering::Relaxed),
    }))
}

// ─── POST /api/scan/refresh ───────────────────────────────────────────────────

/// Manual refresh. Runs a cycle inline and reports what happened; a cycle
/// already in flight is not queued behind, just reported as skipped.
pub async fn refresh(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = run_cycle(&state).await?;

    let (action, instruments) = match outcome {
        CycleOutcome::Completed { instruments } => ("REFRESHED", instruments),
        CycleOutcome::Skipped => ("SKIPPED", 0),
        CycleOutcome::Idle => ("IDLE", 0),
    };

    Ok((
        StatusCode::OK,
        Json(json!({
            "ok":          true,
            "action":      action,
            "instruments": instruments,
        })),
    ))
}

// ─── GET /api/health ──────────────────────────────────────────────────────────

pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let grid = state.grid.read().await;
    Json(json!({
        "ok":          true,
        "service":     "fxscan",
        "cycles":      state.cycle_count.load(Ordering::Relaxed),
        "in_flight":   state.scan_in_flight.load(Ordering::Relaxed),
        "last_update": grid.last_update,
    }))
}
