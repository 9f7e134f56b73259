//! # engine::composer
//!
//! Projects a cycle's [`ScanResult`]s into the flat row sequence the grid
//! renderer consumes: results sorted by symbol, two rows per instrument.
//! Pure and order-preserving; the renderer owns everything downstream.

use crate::models::{DisplayRow, PeriodSignals, ScanResult};

fn plus_sign(flag: bool) -> String {
    if flag { "+".to_string() } else { String::new() }
}

fn first_row(result: &ScanResult) -> DisplayRow {
    let signals: &PeriodSignals = result.fast();
    DisplayRow {
        symbol: Some(result.symbol.clone()),
        timeframe: Some(result.timeframe.clone()),
        c5: Some(result.c5.as_str().to_string()),
        f2: Some(result.f2.as_str().to_string()),
        wpr_above_bar: signals.crossed_above_minus20,
        bullish_falling: plus_sign(signals.bullish_falling_wpr),
        wpr_below_bar: signals.crossed_below_minus80,
        bearish_rising: plus_sign(signals.bearish_rising_wpr),
        is_first_row: true,
        is_second_row: false,
    }
}

/// Identity cells stay empty: the renderer reads `None` as "continuation of
/// the row above".
fn second_row(result: &ScanResult) -> DisplayRow {
    let signals: &PeriodSignals = result.slow();
    DisplayRow {
        symbol: None,
        timeframe: None,
        c5: None,
        f2: None,
        wpr_above_bar: signals.crossed_above_minus20,
        bullish_falling: plus_sign(signals.bullish_falling_wpr),
        wpr_below_bar: signals.crossed_below_minus80,
        bearish_rising: plus_sign(signals.bearish_rising_wpr),
        is_first_row: false,
        is_second_row: true,
    }
}

/// Flatten a cycle's results into grid rows, sorted by symbol ascending.
pub fn compose(results: &[ScanResult]) -> Vec<DisplayRow> {
    let mut sorted: Vec<&ScanResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let mut rows = Vec::with_capacity(sorted.len() * 2);
    for result in sorted {
        rows.push(first_row(result));
        rows.push(second_row(result));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelativeDirection;

    fn make_result(symbol: &str) -> ScanResult {
        ScanResult {
            symbol: symbol.to_string(),
            timeframe: "H1".to_string(),
            c5: RelativeDirection::Above,
            f2: RelativeDirection::Below,
            signals: [
                PeriodSignals {
                    crossed_above_minus20: Some(1),
                    bullish_falling_wpr: true,
                    crossed_below_minus80: None,
                    bearish_rising_wpr: false,
                },
                PeriodSignals {
                    crossed_above_minus20: None,
                    bullish_falling_wpr: false,
                    crossed_below_minus80: Some(3),
                    bearish_rising_wpr: true,
                },
            ],
        }
    }

    #[test]
    fn test_two_rows_per_instrument() {
        let rows = compose(&[make_result("EURUSD")]);
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.symbol.as_deref(), Some("EURUSD"));
        assert_eq!(first.timeframe.as_deref(), Some("H1"));
        assert_eq!(first.c5.as_deref(), Some("above"));
        assert_eq!(first.f2.as_deref(), Some("below"));
        assert_eq!(first.wpr_above_bar, Some(1));
        assert_eq!(first.bullish_falling, "+");
        assert_eq!(first.wpr_below_bar, None);
        assert_eq!(first.bearish_rising, "");
        assert!(first.is_first_row && !first.is_second_row);

        let second = &rows[1];
        assert_eq!(second.symbol, None);
        assert_eq!(second.timeframe, None);
        assert_eq!(second.c5, None);
        assert_eq!(second.f2, None);
        assert_eq!(second.wpr_above_bar, None);
        assert_eq!(second.bullish_falling, "");
        assert_eq!(second.wpr_below_bar, Some(3));
        assert_eq!(second.bearish_rising, "+");
        assert!(second.is_second_row && !second.is_first_row);
    }

    #[test]
    fn test_rows_sorted_by_symbol() {
        let rows = compose(&[
            make_result("USDJPY"),
            make_result("AUDUSD"),
            make_result("EURUSD"),
        ]);
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.symbol.as_deref())
            .collect();
        assert_eq!(names, vec!["AUDUSD", "EURUSD", "USDJPY"]);
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_empty_results_give_empty_grid() {
        assert!(compose(&[]).is_empty());
    }
}
