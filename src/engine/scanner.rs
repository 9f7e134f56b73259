//! # engine::scanner
//!
//! The scan-cycle driver: fetch → normalise → evaluate → compose → publish.
//!
//! One cycle runs for all active instruments, grouped by timeframe so each
//! group costs one bridge round-trip. Cycles never overlap: the shared
//! in-flight flag is taken with a compare-exchange at the top, and a cycle
//! that loses the race is SKIPPED, not queued — the next timer tick or
//! manual refresh will pick up fresh data anyway.
//!
//! Near a period boundary ("building mode", final five minutes) the newest
//! bar of the group's timeframe is still open on the broker side, so it is
//! synthesised from M1 data and spliced over index 0 of the series.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::{debug, info, warn};

use crate::config::{HISTORY_BARS, MINUTE_BARS};
use crate::engine::{composer, indicators, time_agg};
use crate::error::AppError;
use crate::market;
use crate::models::{Bar, Instrument, RawBar, ScanGrid, ScanResult, Timeframe};
use crate::state::SharedState;

// ─── Cycle Outcome ────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A full cycle ran and the grid was republished.
    Completed { instruments: usize },
    /// Another cycle was already in flight; nothing was done.
    Skipped,
    /// No active instruments configured; nothing to scan.
    Idle,
}

// ─── Scheduled Loop ───────────────────────────────────────────────────────────

/// Run scan cycles forever on the configured interval. Errors are logged and
/// the loop keeps going — the next tick is the retry.
pub async fn scan_loop(state: SharedState) {
    let mut interval = tokio::time::interval(state.config.scan_interval);
    loop {
        interval.tick().await;
        match run_cycle(&state).await {
            Ok(CycleOutcome::Completed { instruments }) => {
                debug!(instruments, "scheduled scan cycle complete");
            }
            Ok(CycleOutcome::Skipped) => {
                warn!("scheduled cycle skipped — previous cycle still in flight");
            }
            Ok(CycleOutcome::Idle) => {
                debug!("no active instruments — nothing scanned");
            }
            Err(e) => {
                warn!(error = %e, "scan cycle failed — will retry next interval");
            }
        }
    }
}

// ─── One Cycle ────────────────────────────────────────────────────────────────

/// Run a single scan cycle, guarded by the shared in-flight flag.
pub async fn run_cycle(state: &SharedState) -> Result<CycleOutcome, AppError> {
    if state
        .scan_in_flight
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Ok(CycleOutcome::Skipped);
    }

    let outcome = scan_all(state).await;
    state.scan_in_flight.store(false, Ordering::SeqCst);

    if let Ok(CycleOutcome::Completed { .. }) = &outcome {
        state.cycle_count.fetch_add(1, Ordering::Relaxed);
    }
    outcome
}

/// Wall-clock "now" expressed in the user's target zone, the same way bar
/// times are shifted: by adding whole hours.
fn target_now(offset_hours: i32) -> DateTime<FixedOffset> {
    Utc::now().fixed_offset() + Duration::hours(i64::from(offset_hours))
}

async fn scan_all(state: &SharedState) -> Result<CycleOutcome, AppError> {
    let active: Vec<Instrument> = {
        let guard = state.instruments.read().await;
        guard.iter().filter(|i| i.active).cloned().collect()
    };

    if active.is_empty() {
        return Ok(CycleOutcome::Idle);
    }

    // Group by timeframe: one bridge round-trip per group.
    let mut groups: BTreeMap<Timeframe, Vec<String>> = BTreeMap::new();
    for instrument in &active {
        groups
            .entry(instrument.timeframe)
            .or_default()
            .push(instrument.symbol.clone());
    }

    let offset = state.config.utc_offset_hours;
    let now = target_now(offset);
    let mut results: Vec<ScanResult> = Vec::with_capacity(active.len());

    for (timeframe, symbols) in groups {
        let building = time_agg::is_closing_soon(now, timeframe);
        debug!(%timeframe, symbols = symbols.len(), building, "scanning group");

        let mut history = market::fetch_price_history(
            &state.http,
            &state.config.mt5_base_url,
            &symbols,
            timeframe,
            HISTORY_BARS,
        )
        .await
        .map_err(|e| AppError::Upstream(format!("{e:#}")))?;

        // In building mode the newest bar is still open broker-side; pull M1
        // data once for the whole group and synthesise it per symbol.
        let mut minute_history = if building {
            market::fetch_price_history(
                &state.http,
                &state.config.mt5_base_url,
                &symbols,
                Timeframe::M1,
                MINUTE_BARS,
            )
            .await
            .map_err(|e| AppError::Upstream(format!("{e:#}")))?
        } else {
            Default::default()
        };

        for symbol in &symbols {
            let Some(raw) = history.remove(symbol) else {
                warn!(%symbol, %timeframe, "bridge returned no history — degraded row");
                results.push(indicators::evaluate(symbol, timeframe, &[]));
                continue;
            };

            let mut bars = normalize_series(&raw, offset);

            if building {
                let minute_raw = minute_history.remove(symbol).unwrap_or_default();
                let minute_bars = normalize_series(&minute_raw, offset);
                match synthesize_current_bar(&minute_bars, timeframe, now) {
                    Some(current) => splice_current_bar(&mut bars, current),
                    None => {
                        debug!(%symbol, %timeframe, "no minute data inside the open period")
                    }
                }
            }

            results.push(indicators::evaluate(symbol, timeframe, &bars));
        }
    }

    let rows = composer::compose(&results);
    let instruments = results.len();

    {
        let mut grid = state.grid.write().await;
        *grid = ScanGrid {
            rows,
            results,
            last_update: Some(Utc::now()),
        };
    }

    info!(instruments, "🔎 scan cycle complete");
    Ok(CycleOutcome::Completed { instruments })
}

// ─── Series Normalisation ─────────────────────────────────────────────────────

/// Raw bridge bars → target-zone series, newest first (index 0 = current).
fn normalize_series(raw: &[RawBar], offset_hours: i32) -> Vec<Bar> {
    let bars: Vec<Bar> = raw.iter().map(Bar::from_raw).collect();
    let mut shifted = time_agg::shift_to_zone(&bars, offset_hours);
    shifted.sort_by(|a, b| b.time.cmp(&a.time));
    shifted
}

/// Build the still-open bar from the minute bars that fall inside the
/// current period. `None` when no minute bar belongs to the open period yet.
fn synthesize_current_bar(
    minute_bars: &[Bar],
    timeframe: Timeframe,
    now: DateTime<FixedOffset>,
) -> Option<Bar> {
    let period_start = time_agg::floor_to_timeframe(now, timeframe);
    let in_period: Vec<Bar> = minute_bars
        .iter()
        .filter(|b| b.time >= period_start)
        .copied()
        .collect();

    // Empty input is a contract violation for build_current_bar, so gate it
    // here and report "nothing to synthesise" as plain absence instead.
    if in_period.is_empty() {
        return None;
    }
    time_agg::build_current_bar(&in_period, timeframe).ok()
}

/// Put the synthesised bar at index 0, replacing a bar the bridge already
/// reported for the same period start.
fn splice_current_bar(bars: &mut Vec<Bar>, current: Bar) {
    match bars.first() {
        Some(first) if first.time == current.time => bars[0] = current,
        _ => bars.insert(0, current),
    }
}
