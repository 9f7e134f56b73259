//! # models::bar
//!
//! [`Bar`] is the single OHLCV candle every indicator is computed over, plus
//! [`RawBar`], the wire record the MT5 bridge sends for one candle.
//!
//! Keeping `Bar` a plain `Copy` value is intentional: a scan cycle hands the
//! engine immutable snapshots of whole series, and cheap value copies mean no
//! shared ownership to reason about on the hot path.
//!
//! Candle geometry (body, shadows, doji) is derived on read and never stored.
//! High/low consistency (`high >= max(open, close)` etc.) is assumed from the
//! bridge and not re-validated here; a broken upstream candle is computed
//! over as-is.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Two prices closer than this are treated as equal.
pub const PRICE_EPSILON: f64 = 1e-6;

// ─── Wire Record ──────────────────────────────────────────────────────────────

/// One candle as the MT5 bridge serialises it in `PriceHistoryMany` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    /// Candle open time in the broker's zone.
    pub time: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Tick volume. Forex feeds report tick counts here, never lots.
    pub volume: u64,
    /// Raw tick count; some bridge builds omit it.
    #[serde(default)]
    pub ticks: u32,
}

// ─── Bar ──────────────────────────────────────────────────────────────────────

/// One price candle with derived candle-geometry accessors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Candle open time, carrying an explicit UTC offset.
    pub time: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub ticks: u32,
}

impl Bar {
    /// Build a [`Bar`] from the bridge wire record.
    pub fn from_raw(raw: &RawBar) -> Self {
        Self {
            time: raw.time,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
            ticks: raw.ticks,
        }
    }

    /// Same candle with its open time shifted by `offset_hours` whole hours.
    ///
    /// This is a plain wall-clock translation, not a re-tagging: the offset
    /// label on the timestamp stays what it was, so shifting by `+h` and then
    /// `-h` restores the original time exactly.
    pub fn shifted_hours(self, offset_hours: i32) -> Self {
        Self {
            time: self.time + Duration::hours(i64::from(offset_hours)),
            ..self
        }
    }

    // ── Candle geometry ──────────────────────────────────────────────────────

    /// Close above open.
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close below open.
    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Open and close within [`PRICE_EPSILON`] of each other.
    #[inline]
    pub fn is_flat(&self) -> bool {
        (self.close - self.open).abs() < PRICE_EPSILON
    }

    /// High minus low.
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute distance between open and close.
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Distance from the top of the body to the high.
    #[inline]
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Distance from the low to the bottom of the body.
    #[inline]
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Body as a fraction of the full range, 0 for a zero-range candle.
    #[inline]
    pub fn body_to_range_ratio(&self) -> f64 {
        let range = self.range();
        if range > 0.0 {
            self.body() / range
        } else {
            0.0
        }
    }

    /// Body smaller than 10% of the range.
    #[inline]
    pub fn is_doji(&self) -> bool {
        self.body() < self.range() * 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            time: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .unwrap(),
            open,
            high,
            low,
            close,
            volume: 100,
            ticks: 40,
        }
    }

    #[test]
    fn test_direction_flags() {
        assert!(make_bar(1.0, 1.2, 0.9, 1.1).is_bullish());
        assert!(make_bar(1.0, 1.2, 0.9, 0.95).is_bearish());
        assert!(make_bar(1.0, 1.2, 0.9, 1.0 + 1e-9).is_flat());
    }

    #[test]
    fn test_geometry() {
        let bar = make_bar(1.0, 1.5, 0.8, 1.2);
        assert!((bar.range() - 0.7).abs() < 1e-12);
        assert!((bar.body() - 0.2).abs() < 1e-12);
        assert!((bar.upper_shadow() - 0.3).abs() < 1e-12);
        assert!((bar.lower_shadow() - 0.2).abs() < 1e-12);
        assert!((bar.body_to_range_ratio() - 0.2 / 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_zero_range_candle() {
        let bar = make_bar(1.0, 1.0, 1.0, 1.0);
        assert_eq!(bar.body_to_range_ratio(), 0.0);
        // Strict less-than: a zero body never undercuts a zero range.
        assert!(!bar.is_doji());
    }

    #[test]
    fn test_doji_threshold() {
        // body = 0.05, range = 1.0 → 5% of range, a doji
        assert!(make_bar(1.0, 1.5, 0.5, 1.05).is_doji());
        // body = 0.5, range = 1.0 → far too big
        assert!(!make_bar(1.0, 1.5, 0.5, 1.5).is_doji());
    }

    #[test]
    fn test_shift_round_trip() {
        let bar = make_bar(1.0, 1.2, 0.9, 1.1);
        let there_and_back = bar.shifted_hours(3).shifted_hours(-3);
        assert_eq!(there_and_back.time, bar.time);
        assert_eq!(there_and_back, bar);
    }
}
