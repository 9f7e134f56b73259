//! # engine::time_agg
//!
//! Time normalisation for bar series: shifting broker-time candles into the
//! user's target zone, and synthesising the still-open "current" bar of a
//! period from M1 data while a candle is building.
//!
//! Everything here is pure. The one rule that is easy to get wrong: flooring
//! a timestamp to a period boundary uses integer division on absolute
//! seconds, NOT calendar alignment. The weekly grid is therefore anchored at
//! the Unix epoch (a Thursday) rather than at calendar Mondays, and the same
//! epoch-anchored rule applies to every timeframe.

use chrono::{DateTime, Duration, FixedOffset};

use crate::error::ScanError;
use crate::models::{Bar, Timeframe};

/// A "closing soon" window this many whole minutes before a period boundary
/// switches the scanner into building mode.
const CLOSING_SOON_MINUTES: i64 = 5;

// ─── Zone Shift ───────────────────────────────────────────────────────────────

/// Shift every bar's open time by `target_offset_hours` hours.
///
/// No resampling, no reordering; OHLCV values are untouched. An empty input
/// is not an error, just an empty output.
pub fn shift_to_zone(bars: &[Bar], target_offset_hours: i32) -> Vec<Bar> {
    bars.iter()
        .map(|bar| bar.shifted_hours(target_offset_hours))
        .collect()
}

// ─── Current-Bar Synthesis ────────────────────────────────────────────────────

/// Aggregate finer-granularity bars covering the still-open period into one
/// synthetic current bar.
///
/// The inputs are sorted ascending by time first (the bridge does not promise
/// order). The synthetic bar's open time is the earliest input's time floored
/// to the timeframe; open comes from the first bar, close from the last,
/// high/low are the extremes, volume and ticks are summed.
///
/// # Errors
///
/// [`ScanError::EmptyInput`] when `minute_bars` is empty. That is a broken
/// caller contract, not a data condition — the scanner only enters building
/// mode after it has fetched minute data.
pub fn build_current_bar(minute_bars: &[Bar], timeframe: Timeframe) -> Result<Bar, ScanError> {
    if minute_bars.is_empty() {
        return Err(ScanError::EmptyInput);
    }

    let mut sorted: Vec<Bar> = minute_bars.to_vec();
    sorted.sort_by_key(|bar| bar.time);

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];

    Ok(Bar {
        time: floor_to_timeframe(first.time, timeframe),
        open: first.open,
        high: sorted.iter().map(|b| b.high).fold(f64::MIN, f64::max),
        low: sorted.iter().map(|b| b.low).fold(f64::MAX, f64::min),
        close: last.close,
        volume: sorted.iter().map(|b| b.volume).sum(),
        ticks: sorted.iter().map(|b| b.ticks).sum(),
    })
}

// ─── Period Boundaries ────────────────────────────────────────────────────────

/// Floor a timestamp down to the start of its period.
///
/// Integer division of the wall-clock second count by the period length, then
/// re-multiplied. The offset tag on the timestamp is preserved.
pub fn floor_to_timeframe(time: DateTime<FixedOffset>, timeframe: Timeframe) -> DateTime<FixedOffset> {
    let period_secs = i64::from(timeframe.minutes()) * 60;
    let wall_secs = time.naive_local().and_utc().timestamp();
    let floored = wall_secs.div_euclid(period_secs) * period_secs;
    // Subtracting the remainder keeps the offset tag intact.
    time - Duration::seconds(wall_secs - floored)
}

/// Nominal close time of the period `now` falls in.
pub fn next_bar_close_time(
    now: DateTime<FixedOffset>,
    timeframe: Timeframe,
) -> DateTime<FixedOffset> {
    floor_to_timeframe(now, timeframe) + Duration::minutes(i64::from(timeframe.minutes()))
}

/// True when strictly more than zero and at most five whole minutes remain
/// until the current period closes.
///
/// Remaining time is rounded UP to whole minutes, so "5 minutes plus one
/// tick" counts as six and is not closing soon, while exactly five minutes
/// is. At the boundary itself zero minutes remain and the answer is false.
pub fn is_closing_soon(now: DateTime<FixedOffset>, timeframe: Timeframe) -> bool {
    let remaining_ms = (next_bar_close_time(now, timeframe) - now).num_milliseconds();
    let minutes_to_close = (remaining_ms + 59_999).div_euclid(60_000);
    minutes_to_close > 0 && minutes_to_close <= CLOSING_SOON_MINUTES
}
