//! # models::scan
//!
//! Output shapes of one evaluation cycle: [`ScanResult`] per instrument, and
//! [`DisplayRow`], the flattened two-rows-per-instrument projection the grid
//! renderer consumes.
//!
//! The two Williams %R periods the scanner runs are fixed ([`WPR_PERIODS`]).
//! Each period produces one [`PeriodSignals`] block, and `ScanResult` keeps
//! the blocks in an array indexed in `WPR_PERIODS` order, so adding a third
//! period would be a data change rather than a new set of fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The Williams %R lookback periods every instrument is scanned with.
pub const WPR_PERIODS: [usize; 2] = [5, 21];

// ─── Relative Direction ───────────────────────────────────────────────────────

/// Where the current close sits relative to a reference level
/// (a close five bars back, or the nearest fractal's extreme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeDirection {
    Above,
    Below,
    /// Not enough history to make the comparison; renders as an empty cell.
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl RelativeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            RelativeDirection::Above => "above",
            RelativeDirection::Below => "below",
            RelativeDirection::Unset => "",
        }
    }
}

// ─── Per-Period Signals ───────────────────────────────────────────────────────

/// The four WPR-derived signals computed for one lookback period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSignals {
    /// Offset (0 = current bar) of the first bar in the last five whose WPR
    /// is above −20, if any.
    pub crossed_above_minus20: Option<usize>,
    /// Current bar bullish while WPR fell against the previous bar.
    pub bullish_falling_wpr: bool,
    /// Offset of the first bar in the last five whose WPR is below −80.
    pub crossed_below_minus80: Option<usize>,
    /// Current bar bearish while WPR rose against the previous bar.
    pub bearish_rising_wpr: bool,
}

// ─── Scan Result ──────────────────────────────────────────────────────────────

/// One instrument's full evaluation outcome for a single cycle.
///
/// With fewer than 21 bars of history only `symbol` and `timeframe` are
/// populated; everything else stays at its neutral default. That is the
/// documented degraded result for a young or illiquid instrument, not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    /// Period short code, e.g. `"H1"`.
    pub timeframe: String,
    /// Current close vs the close five bars back.
    pub c5: RelativeDirection,
    /// Current close vs the nearest fractal's extreme.
    pub f2: RelativeDirection,
    /// Signal blocks in [`WPR_PERIODS`] order: `[0]` = WPR(5), `[1]` = WPR(21).
    pub signals: [PeriodSignals; 2],
}

impl ScanResult {
    /// The WPR(5) signal block.
    pub fn fast(&self) -> &PeriodSignals {
        &self.signals[0]
    }

    /// The WPR(21) signal block.
    pub fn slow(&self) -> &PeriodSignals {
        &self.signals[1]
    }
}

// ─── Display Row ──────────────────────────────────────────────────────────────

/// One physical grid row. Each instrument occupies two: the first carries the
/// identity cells and the WPR(5) block, the second leaves the identity cells
/// empty (signalling "continuation") and carries the WPR(21) block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub c5: Option<String>,
    pub f2: Option<String>,
    /// First bar (0..=4) with WPR above −20, blank when none.
    pub wpr_above_bar: Option<usize>,
    /// `"+"` when the bullish-falling-WPR signal fired, else empty.
    pub bullish_falling: String,
    /// First bar (0..=4) with WPR below −80, blank when none.
    pub wpr_below_bar: Option<usize>,
    /// `"+"` when the bearish-rising-WPR signal fired, else empty.
    pub bearish_rising: String,
    pub is_first_row: bool,
    pub is_second_row: bool,
}

// ─── Scan Grid ────────────────────────────────────────────────────────────────

/// The latest composed grid plus cycle metadata, swapped into shared state
/// wholesale at the end of each cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanGrid {
    pub rows: Vec<DisplayRow>,
    pub results: Vec<ScanResult>,
    pub last_update: Option<DateTime<Utc>>,
}
