//! # models::instrument
//!
//! A user-configured scan target: which symbol, on which chart period,
//! and whether it currently participates in the cycle.

use serde::{Deserialize, Serialize};

use super::Timeframe;

/// One entry in the scan list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Broker symbol, e.g. `"EURUSD"`.
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Inactive instruments stay in the list but are skipped by the scanner.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            active: true,
        }
    }

    /// Uniqueness key in the scan list; one row per symbol/period pair.
    pub fn key(&self) -> String {
        format!("{}_{}", self.symbol, self.timeframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_combines_symbol_and_period() {
        let inst = Instrument::new("EURUSD", Timeframe::H4);
        assert_eq!(inst.key(), "EURUSD_H4");
    }

    #[test]
    fn test_active_defaults_to_true_on_deserialize() {
        let inst: Instrument =
            serde_json::from_str(r#"{"symbol":"GBPUSD","timeframe":"H1"}"#).unwrap();
        assert!(inst.active);
    }
}
