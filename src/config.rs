//! # config — service configuration from environment variables
//!
//! | Variable             | Default                 | Description                          |
//! |----------------------|-------------------------|--------------------------------------|
//! | `BIND_ADDR`          | `0.0.0.0:3000`          | Address Axum listens on              |
//! | `MT5_BASE_URL`       | `http://localhost:8081` | Base URL of the MT5 bridge           |
//! | `SCAN_INTERVAL_SECS` | `60`                    | Seconds between scan cycles          |
//! | `UTC_OFFSET_HOURS`   | `3`                     | Target zone bar times are shifted to |
//! | `INSTRUMENTS`        | `EURUSD:H1`             | Seed scan list, `SYMBOL:PERIOD,...`  |

use std::time::Duration;

use anyhow::{bail, Context};

use crate::models::{Instrument, Timeframe};

/// How many closed bars a normal cycle requests per symbol.
pub const HISTORY_BARS: u32 = 50;

/// How many M1 bars a building-mode cycle requests per symbol.
pub const MINUTE_BARS: u32 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Base URL of the MT5 bridge, e.g. `http://localhost:8081`.
    pub mt5_base_url: String,
    /// Pause between scheduled scan cycles.
    pub scan_interval: Duration,
    /// Hours added to broker bar times to reach the user's zone.
    pub utc_offset_hours: i32,
    /// Instruments the scanner starts with; editable over the API afterwards.
    pub instruments: Vec<Instrument>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let interval_secs: u64 = std::env::var("SCAN_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("SCAN_INTERVAL_SECS must be a number")?;

        let utc_offset_hours: i32 = std::env::var("UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("UTC_OFFSET_HOURS must be a number")?;
        if utc_offset_hours.abs() > 14 {
            bail!("UTC_OFFSET_HOURS out of range: {utc_offset_hours}");
        }

        let instruments = parse_instruments(
            &std::env::var("INSTRUMENTS").unwrap_or_else(|_| "EURUSD:H1".to_string()),
        )?;

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            mt5_base_url: std::env::var("MT5_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            scan_interval: Duration::from_secs(interval_secs),
            utc_offset_hours,
            instruments,
        })
    }
}

/// Parse the `SYMBOL:PERIOD,SYMBOL:PERIOD` seed-list format.
fn parse_instruments(raw: &str) -> anyhow::Result<Vec<Instrument>> {
    let mut instruments = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (symbol, period) = entry
            .split_once(':')
            .with_context(|| format!("bad INSTRUMENTS entry '{entry}', expected SYMBOL:PERIOD"))?;
        let timeframe: Timeframe = period
            .parse()
            .with_context(|| format!("bad period in INSTRUMENTS entry '{entry}'"))?;
        instruments.push(Instrument::new(symbol.trim().to_uppercase(), timeframe));
    }
    Ok(instruments)
}
