//! # routes::instruments
//!
//! CRUD for the scan list. The list lives in shared state only; the next
//! cycle picks changes up automatically.
//!
//! | Method | Path               | Description                        |
//! |--------|--------------------|------------------------------------|
//! | GET    | `/api/instruments` | Current scan list                  |
//! | POST   | `/api/instruments` | Add or update one entry            |
//! | DELETE | `/api/instruments` | Remove by `?symbol=..&timeframe=..`|

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::models::{Instrument, Timeframe};
use crate::state::SharedState;

// ─── GET /api/instruments ─────────────────────────────────────────────────────

pub async fn list_instruments(State(state): State<SharedState>) -> impl IntoResponse {
    let instruments = state.instruments.read().await;
    Json(json!({
        "ok":          true,
        "instruments": *instruments,
    }))
}

// ─── POST /api/instruments ────────────────────────────────────────────────────

/// Upsert: same symbol + timeframe replaces the existing entry (so toggling
/// `active` is a plain re-POST), anything else appends.
pub async fn upsert_instrument(
    State(state): State<SharedState>,
    Json(mut instrument): Json<Instrument>,
) -> Result<impl IntoResponse, AppError> {
    instrument.symbol = instrument.symbol.trim().to_uppercase();
    if instrument.symbol.is_empty() {
        return Err(AppError::BadRequest("symbol must not be empty".into()));
    }

    let key = instrument.key();
    let mut instruments = state.instruments.write().await;
    match instruments.iter_mut().find(|i| i.key() == key) {
        Some(existing) => *existing = instrument,
        None => instruments.push(instrument),
    }

    info!(%key, total = instruments.len(), "instrument upserted");
    Ok(Json(json!({ "ok": true, "key": key })))
}

// ─── DELETE /api/instruments ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RemoveQuery {
    pub symbol: String,
    pub timeframe: Timeframe,
}

pub async fn remove_instrument(
    State(state): State<SharedState>,
    Query(query): Query<RemoveQuery>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = query.symbol.trim().to_uppercase();
    let mut instruments = state.instruments.write().await;
    let before = instruments.len();
    instruments.retain(|i| !(i.symbol == symbol && i.timeframe == query.timeframe));

    if instruments.len() == before {
        return Err(AppError::NotFound(format!(
            "instrument {symbol}_{} not in scan list",
            query.timeframe
        )));
    }

    info!(%symbol, timeframe = %query.timeframe, "instrument removed");
    Ok(Json(json!({ "ok": true })))
}
