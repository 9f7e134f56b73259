//! # engine::indicators
//!
//! The fixed indicator battery: Williams %R over two lookback periods,
//! 5-bar fractal detection, and the handful of boolean/positional signals
//! the scan grid displays.
//!
//! ## Index convention
//!
//! Every function here takes bars ordered newest-first: index 0 is the
//! current bar, index N is N periods ago. Lookback windows therefore extend
//! toward HIGHER indices — "the 5-bar window ending at index 2" means
//! indices 2..=6.
//!
//! ## Missing history is not an error
//!
//! Too few bars for a window yields the documented neutral value (0 for WPR,
//! empty for the direction labels, a degraded [`ScanResult`] from
//! [`evaluate`]). A thin series is an expected steady state for a freshly
//! added or illiquid instrument, so nothing in this module can fail.

use crate::models::{
    Bar, PeriodSignals, RelativeDirection, ScanResult, Timeframe, PRICE_EPSILON, WPR_PERIODS,
};

/// Fractal search looks this many bars behind the reference index.
pub const FRACTAL_LOOKBACK: usize = 15;

/// WPR threshold scans cover the most recent five bars (offsets 0..=4).
const SCAN_DEPTH: usize = 5;

/// `evaluate` needs at least this much history — the WPR(21) window on bar 0.
const MIN_BARS_FOR_EVALUATION: usize = 21;

// ─── Window Extremes ──────────────────────────────────────────────────────────

fn highest_high(bars: &[Bar], start: usize, count: usize) -> f64 {
    bars.iter()
        .skip(start)
        .take(count)
        .map(|b| b.high)
        .fold(f64::MIN, f64::max)
}

fn lowest_low(bars: &[Bar], start: usize, count: usize) -> f64 {
    bars.iter()
        .skip(start)
        .take(count)
        .map(|b| b.low)
        .fold(f64::MAX, f64::min)
}

// ─── Williams %R ──────────────────────────────────────────────────────────────

/// Williams %R at `index`, over the `period`-bar window that starts at
/// `index` and extends toward older bars (`bars[index ..= index+period-1]`).
///
/// Returns 0 when there is not enough history for the full window, and 0
/// when the window is flat (range below [`PRICE_EPSILON`]). Both conditions
/// share the neutral value on purpose; callers treat them as one behaviour.
/// Otherwise the value is in [−100, 0].
pub fn wpr(bars: &[Bar], index: usize, period: usize) -> f64 {
    if period == 0 || bars.len() < index + period {
        return 0.0;
    }

    let hh = highest_high(bars, index, period);
    let ll = lowest_low(bars, index, period);

    if (hh - ll).abs() < PRICE_EPSILON {
        return 0.0;
    }

    -100.0 * (hh - bars[index].close) / (hh - ll)
}

// ─── Fractals ─────────────────────────────────────────────────────────────────

/// Up-fractal pattern test at center `i`: both neighbours on each side have
/// a strictly lower high. Callers guarantee `i >= 2 && i + 2 < bars.len()`.
fn is_up_fractal_at(bars: &[Bar], i: usize) -> bool {
    bars[i - 2].high < bars[i].high
        && bars[i - 1].high < bars[i].high
        && bars[i + 1].high < bars[i].high
        && bars[i + 2].high < bars[i].high
}

fn is_down_fractal_at(bars: &[Bar], i: usize) -> bool {
    bars[i - 2].low > bars[i].low
        && bars[i - 1].low > bars[i].low
        && bars[i + 1].low > bars[i].low
        && bars[i + 2].low > bars[i].low
}

fn find_fractal(
    bars: &[Bar],
    current_index: usize,
    lookback: usize,
    matches: fn(&[Bar], usize) -> bool,
) -> Option<usize> {
    // A center needs two neighbours on each side.
    if bars.len() < 5 {
        return None;
    }

    let newest = current_index.max(2);
    let oldest = (current_index + lookback).min(bars.len() - 3);
    if newest > oldest {
        return None;
    }

    // Scanned oldest-to-newest, so the OLDEST qualifying center wins when
    // several exist in the window. The tie-break is part of the contract.
    (newest..=oldest).rev().find(|&i| matches(bars, i))
}

/// Index of the first up-fractal center within `lookback` bars behind
/// `current_index`, scanning oldest-to-newest.
pub fn find_fractal_up(bars: &[Bar], current_index: usize, lookback: usize) -> Option<usize> {
    find_fractal(bars, current_index, lookback, is_up_fractal_at)
}

/// Down-fractal counterpart of [`find_fractal_up`].
pub fn find_fractal_down(bars: &[Bar], current_index: usize, lookback: usize) -> Option<usize> {
    find_fractal(bars, current_index, lookback, is_down_fractal_at)
}

/// Whichever fractal (up or down) sits closest to `current_index`.
///
/// The up fractal is only preferred on a strictly smaller distance; an
/// equal-distance pair resolves to the down fractal.
pub fn find_nearest_fractal(bars: &[Bar], current_index: usize, lookback: usize) -> Option<usize> {
    let up = find_fractal_up(bars, current_index, lookback);
    let down = find_fractal_down(bars, current_index, lookback);

    match (up, down) {
        (None, None) => None,
        (Some(u), None) => Some(u),
        (None, Some(d)) => Some(d),
        (Some(u), Some(d)) => {
            if u.abs_diff(current_index) < d.abs_diff(current_index) {
                Some(u)
            } else {
                Some(d)
            }
        }
    }
}

// ─── Grid Columns ─────────────────────────────────────────────────────────────

/// C5 column: current close vs the close five bars back. Unset under six
/// bars of history.
pub fn c5_value(bars: &[Bar]) -> RelativeDirection {
    if bars.len() < 6 {
        return RelativeDirection::Unset;
    }
    if bars[0].close > bars[5].close {
        RelativeDirection::Above
    } else {
        RelativeDirection::Below
    }
}

/// F2 column: current close vs the nearest fractal's extreme. Unset when no
/// fractal is found within the lookback.
///
/// The comparison target is asymmetric by design: an up-fractal compares the
/// close against that bar's HIGH (above only when strictly greater), a
/// down-fractal against its LOW (below only when strictly less).
pub fn f2_value(bars: &[Bar]) -> RelativeDirection {
    let Some(fractal_index) = find_nearest_fractal(bars, 0, FRACTAL_LOOKBACK) else {
        return RelativeDirection::Unset;
    };

    let current_close = bars[0].close;
    let fractal_bar = &bars[fractal_index];

    let is_up = fractal_index >= 2
        && fractal_index + 2 < bars.len()
        && is_up_fractal_at(bars, fractal_index);

    if is_up {
        if current_close > fractal_bar.high {
            RelativeDirection::Above
        } else {
            RelativeDirection::Below
        }
    } else if current_close < fractal_bar.low {
        RelativeDirection::Below
    } else {
        RelativeDirection::Above
    }
}

// ─── WPR Threshold Scans ──────────────────────────────────────────────────────

/// First offset in the last five bars where WPR is above −20, if any.
pub fn find_bar_above_minus20(bars: &[Bar], period: usize) -> Option<usize> {
    (0..SCAN_DEPTH.min(bars.len())).find(|&offset| wpr(bars, offset, period) > -20.0)
}

/// First offset in the last five bars where WPR is below −80, if any.
pub fn find_bar_below_minus80(bars: &[Bar], period: usize) -> Option<usize> {
    (0..SCAN_DEPTH.min(bars.len())).find(|&offset| wpr(bars, offset, period) < -80.0)
}

// ─── Directional WPR Checks ───────────────────────────────────────────────────

/// Current bar closed bullish while WPR fell against the previous bar.
pub fn check_bullish_falling_wpr(bars: &[Bar], period: usize) -> bool {
    if bars.len() < 2 || !bars[0].is_bullish() {
        return false;
    }
    wpr(bars, 0, period) < wpr(bars, 1, period)
}

/// Current bar closed bearish while WPR rose against the previous bar.
pub fn check_bearish_rising_wpr(bars: &[Bar], period: usize) -> bool {
    if bars.len() < 2 || !bars[0].is_bearish() {
        return false;
    }
    wpr(bars, 0, period) > wpr(bars, 1, period)
}

// ─── Evaluation ───────────────────────────────────────────────────────────────

/// Run the full battery over one instrument's series.
///
/// Under [`MIN_BARS_FOR_EVALUATION`] bars only `symbol` and `timeframe` are
/// populated and every signal stays at its neutral default — the documented
/// degraded result for insufficient history.
pub fn evaluate(symbol: &str, timeframe: Timeframe, bars: &[Bar]) -> ScanResult {
    let mut result = ScanResult {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        ..ScanResult::default()
    };

    if bars.len() < MIN_BARS_FOR_EVALUATION {
        return result;
    }

    result.c5 = c5_value(bars);
    result.f2 = f2_value(bars);

    for (slot, &period) in result.signals.iter_mut().zip(WPR_PERIODS.iter()) {
        *slot = PeriodSignals {
            crossed_above_minus20: find_bar_above_minus20(bars, period),
            bullish_falling_wpr: check_bullish_falling_wpr(bars, period),
            crossed_below_minus80: find_bar_below_minus80(bars, period),
            bearish_rising_wpr: check_bearish_rising_wpr(bars, period),
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn make_bar(index: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
        // Newest-first ordering: higher index = older candle.
        let base = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 12, 0, 0)
            .unwrap();
        Bar {
            time: base - Duration::hours(index as i64),
            open,
            high,
            low,
            close,
            volume: 50,
            ticks: 20,
        }
    }

    /// A market falling toward the present: index 0 (newest) sits lowest,
    /// every close near the bottom of its candle.
    fn make_falling(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let level = 1.0 + 0.01 * i as f64;
                make_bar(i, level + 0.004, level + 0.005, level - 0.005, level - 0.004)
            })
            .collect()
    }

    /// A market rising toward the present: index 0 highest, closes near the
    /// candle tops.
    fn make_rising(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let level = 2.0 - 0.01 * i as f64;
                make_bar(i, level - 0.004, level + 0.005, level - 0.005, level + 0.004)
            })
            .collect()
    }

    // ── WPR ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_wpr_bounded_on_real_window() {
        for bars in [make_falling(30), make_rising(30)] {
            for index in 0..8 {
                for period in WPR_PERIODS {
                    let value = wpr(&bars, index, period);
                    assert!((-100.0..=0.0).contains(&value), "wpr out of range: {value}");
                }
            }
        }
    }

    #[test]
    fn test_wpr_close_at_high_is_zero_close_at_low_is_minus_100() {
        let mut bars = make_falling(10);
        // Window for wpr(0, 5) is indices 0..=4.
        bars[0].close = highest_high(&bars, 0, 5);
        assert!((wpr(&bars, 0, 5) - 0.0).abs() < 1e-9);

        bars[0].close = lowest_low(&bars, 0, 5);
        assert!((wpr(&bars, 0, 5) + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_wpr_insufficient_history_is_neutral_zero() {
        let bars = make_falling(10);
        // index beyond the series
        assert_eq!(wpr(&bars, 15, 5), 0.0);
        // window would run past the oldest bar
        assert_eq!(wpr(&bars, 6, 5), 0.0);
        // exactly fits
        assert!(wpr(&bars, 5, 5) < 0.0);
    }

    #[test]
    fn test_wpr_flat_window_is_neutral_zero() {
        let bars: Vec<Bar> = (0..10).map(|i| make_bar(i, 1.0, 1.0, 1.0, 1.0)).collect();
        assert_eq!(wpr(&bars, 0, 5), 0.0);
        assert_eq!(wpr(&bars, 4, 5), 0.0);
    }

    // ── Fractals ────────────────────────────────────────────────────────────

    /// Monotonic highs/lows (no fractals anywhere) with a single local max
    /// spliced in at `peak`.
    fn make_series_with_peak_at(peak: usize) -> Vec<Bar> {
        let mut bars = make_falling(21);
        bars[peak].high += 0.5;
        bars
    }

    #[test]
    fn test_find_fractal_up_locates_local_max() {
        let bars = make_series_with_peak_at(10);
        assert_eq!(find_fractal_up(&bars, 0, FRACTAL_LOOKBACK), Some(10));
    }

    #[test]
    fn test_fractal_scan_returns_oldest_match() {
        // Two qualifying up-fractals in the window; the scan runs from the
        // oldest end, so the HIGHER index (further back in time) is found
        // first. Reversing the scan direction silently changes which fractal
        // is reported — hence the dedicated regression test.
        let mut bars = make_falling(21);
        bars[4].high += 0.5;
        bars[12].high += 0.5;
        assert_eq!(find_fractal_up(&bars, 0, FRACTAL_LOOKBACK), Some(12));
    }

    #[test]
    fn test_fractal_indices_stay_in_valid_center_range() {
        let bars = make_series_with_peak_at(10);
        for current in 0..bars.len() {
            if let Some(i) = find_fractal_up(&bars, current, FRACTAL_LOOKBACK) {
                assert!(i >= 2 && i + 2 < bars.len());
                assert!(i >= current && i <= current + FRACTAL_LOOKBACK);
            }
            if let Some(i) = find_fractal_down(&bars, current, FRACTAL_LOOKBACK) {
                assert!(i >= 2 && i + 2 < bars.len());
            }
        }
    }

    #[test]
    fn test_monotonic_series_never_flags_both_directions_at_once() {
        // Strictly monotonic highs/lows: a center can be an up OR a down
        // fractal candidate relative to its neighbours, never both.
        let bars = make_falling(21);
        for i in 2..bars.len() - 2 {
            assert!(!(is_up_fractal_at(&bars, i) && is_down_fractal_at(&bars, i)));
        }
    }

    #[test]
    fn test_nearest_fractal_prefers_smaller_distance() {
        let mut bars = make_falling(21);
        // Up peak at 12, down trough at 5: the trough is nearer to index 0.
        bars[12].high += 0.5;
        bars[5].low -= 0.5;
        assert_eq!(find_fractal_up(&bars, 0, FRACTAL_LOOKBACK), Some(12));
        assert_eq!(find_fractal_down(&bars, 0, FRACTAL_LOOKBACK), Some(5));
        assert_eq!(find_nearest_fractal(&bars, 0, FRACTAL_LOOKBACK), Some(5));
    }

    #[test]
    fn test_no_fractal_in_short_series() {
        assert_eq!(find_nearest_fractal(&make_falling(4), 0, FRACTAL_LOOKBACK), None);
    }

    // ── Grid columns ────────────────────────────────────────────────────────

    #[test]
    fn test_c5_above_scenario() {
        let mut bars = make_falling(21);
        bars[0].close = 1.10500;
        bars[5].close = 1.10000;
        assert_eq!(c5_value(&bars), RelativeDirection::Above);
    }

    #[test]
    fn test_c5_below_and_unset() {
        let mut bars = make_falling(21);
        bars[0].close = 1.09;
        bars[5].close = 1.10;
        assert_eq!(c5_value(&bars), RelativeDirection::Below);
        assert_eq!(c5_value(&make_falling(5)), RelativeDirection::Unset);
    }

    #[test]
    fn test_f2_compares_against_up_fractal_high() {
        let mut bars = make_series_with_peak_at(6);
        // Close clearly above the spike high
        bars[0].close = bars[6].high + 0.1;
        assert_eq!(f2_value(&bars), RelativeDirection::Above);

        bars[0].close = bars[6].high - 0.1;
        assert_eq!(f2_value(&bars), RelativeDirection::Below);
    }

    #[test]
    fn test_f2_compares_against_down_fractal_low() {
        let mut bars = make_falling(21);
        bars[6].low -= 0.5;
        assert_eq!(find_nearest_fractal(&bars, 0, FRACTAL_LOOKBACK), Some(6));

        bars[0].close = bars[6].low - 0.1;
        assert_eq!(f2_value(&bars), RelativeDirection::Below);

        // At or above the fractal low → Above (strict less-than only)
        bars[0].close = bars[6].low + 0.1;
        assert_eq!(f2_value(&bars), RelativeDirection::Above);
    }

    #[test]
    fn test_f2_unset_without_fractal() {
        assert_eq!(f2_value(&make_falling(21)), RelativeDirection::Unset);
    }

    // ── Threshold scans ─────────────────────────────────────────────────────

    #[test]
    fn test_rising_market_reads_above_minus20() {
        // Closes hug the top of every window: WPR near 0 from offset 0.
        let bars = make_rising(30);
        assert_eq!(find_bar_above_minus20(&bars, 5), Some(0));
        assert_eq!(find_bar_above_minus20(&bars, 21), Some(0));
        assert_eq!(find_bar_below_minus80(&bars, 5), None);
    }

    #[test]
    fn test_falling_market_reads_below_minus80() {
        // Closes hug the bottom of every window: WPR deep below −80.
        let bars = make_falling(30);
        assert_eq!(find_bar_below_minus80(&bars, 5), Some(0));
        assert_eq!(find_bar_below_minus80(&bars, 21), Some(0));
        assert_eq!(find_bar_above_minus20(&bars, 5), None);
    }

    #[test]
    fn test_threshold_scan_clips_to_series_length() {
        // Three bars: no offset has a full 5-bar window, so every WPR reads
        // the neutral 0 — which already satisfies "above −20" at offset 0
        // but can never satisfy "below −80".
        let bars = make_falling(3);
        assert_eq!(find_bar_above_minus20(&bars, 5), Some(0));
        assert_eq!(find_bar_below_minus80(&bars, 5), None);
    }

    // ── Directional checks ──────────────────────────────────────────────────

    /// Hand-built series: bar 0 bullish, wpr(0,5) = −30, wpr(1,5) = −10.
    fn make_bullish_falling_series() -> Vec<Bar> {
        let mut bars = vec![
            make_bar(0, 1.07, 1.08, 1.03, 1.0725),
            make_bar(1, 1.085, 1.095, 1.02, 1.09),
            make_bar(2, 1.05, 1.08, 1.02, 1.05),
            make_bar(3, 1.05, 1.08, 1.02, 1.05),
            make_bar(4, 1.05, 1.08, 1.02, 1.05),
            make_bar(5, 1.05, 1.10, 1.00, 1.05),
        ];
        bars.extend((6..10).map(|i| make_bar(i, 1.05, 1.08, 1.02, 1.05)));
        bars
    }

    #[test]
    fn test_bullish_falling_wpr_scenario() {
        let bars = make_bullish_falling_series();
        assert!(bars[0].is_bullish());
        assert!((wpr(&bars, 0, 5) + 30.0).abs() < 1e-9);
        assert!((wpr(&bars, 1, 5) + 10.0).abs() < 1e-9);
        // −30 < −10: WPR fell on a bullish bar
        assert!(check_bullish_falling_wpr(&bars, 5));
    }

    #[test]
    fn test_bullish_falling_requires_bullish_bar() {
        let mut bars = make_bullish_falling_series();
        bars[0].open = bars[0].close + 0.002; // bar 0 now bearish
        assert!(wpr(&bars, 0, 5) < wpr(&bars, 1, 5));
        assert!(!check_bullish_falling_wpr(&bars, 5));
    }

    #[test]
    fn test_bearish_rising_wpr_scenario() {
        // Mirror construction: bar 0 bearish, wpr(0,5) = −10 > wpr(1,5) = −30.
        let mut bars = vec![
            make_bar(0, 1.09, 1.095, 1.03, 1.0875),
            make_bar(1, 1.065, 1.08, 1.02, 1.07),
            make_bar(2, 1.05, 1.08, 1.02, 1.05),
            make_bar(3, 1.05, 1.08, 1.02, 1.05),
            make_bar(4, 1.05, 1.08, 1.02, 1.05),
            make_bar(5, 1.05, 1.10, 1.00, 1.05),
        ];
        bars.extend((6..10).map(|i| make_bar(i, 1.05, 1.08, 1.02, 1.05)));

        assert!(bars[0].is_bearish());
        assert!((wpr(&bars, 0, 5) + 10.0).abs() < 1e-9);
        assert!((wpr(&bars, 1, 5) + 30.0).abs() < 1e-9);
        assert!(check_bearish_rising_wpr(&bars, 5));
        // And the bullish check stays quiet on a bearish bar
        assert!(!check_bullish_falling_wpr(&bars, 5));

        bars[0].open = bars[0].close - 0.002; // bar 0 now bullish
        assert!(!check_bearish_rising_wpr(&bars, 5));
    }

    #[test]
    fn test_directional_checks_need_two_bars() {
        let bars = make_falling(1);
        assert!(!check_bullish_falling_wpr(&bars, 5));
        assert!(!check_bearish_rising_wpr(&bars, 5));
    }

    // ── Evaluate ────────────────────────────────────────────────────────────

    #[test]
    fn test_evaluate_degraded_result_under_21_bars() {
        let bars = make_falling(20);
        let result = evaluate("EURUSD", Timeframe::H1, &bars);

        assert_eq!(result.symbol, "EURUSD");
        assert_eq!(result.timeframe, "H1");
        assert_eq!(result.c5, RelativeDirection::Unset);
        assert_eq!(result.f2, RelativeDirection::Unset);
        for signals in &result.signals {
            assert_eq!(signals.crossed_above_minus20, None);
            assert_eq!(signals.crossed_below_minus80, None);
            assert!(!signals.bullish_falling_wpr);
            assert!(!signals.bearish_rising_wpr);
        }
    }

    #[test]
    fn test_evaluate_populates_both_period_blocks() {
        let result = evaluate("GBPUSD", Timeframe::H4, &make_rising(40));

        assert_eq!(result.c5, RelativeDirection::Above);
        assert_eq!(result.fast().crossed_above_minus20, Some(0));
        assert_eq!(result.slow().crossed_above_minus20, Some(0));
        assert_eq!(result.fast().crossed_below_minus80, None);
        assert_eq!(result.slow().crossed_below_minus80, None);
    }

    #[test]
    fn test_evaluate_exactly_21_bars_is_fully_populated() {
        let result = evaluate("USDJPY", Timeframe::D1, &make_falling(21));
        assert_ne!(result.c5, RelativeDirection::Unset);
        assert_eq!(result.fast().crossed_below_minus80, Some(0));
        assert_eq!(result.slow().crossed_below_minus80, Some(0));
    }
}
