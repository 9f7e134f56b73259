//! # models::timeframe
//!
//! The fixed set of chart periods the MT5 bridge understands, expressed both
//! as the conventional short code (`"H1"`, `"D1"`) and as the bar length in
//! minutes that the wire protocol uses (`timeFrame=60`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A chart period, from one minute up to one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    H6,
    D1,
    W1,
    MN1,
}

/// The period string could not be mapped to a known timeframe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown timeframe: '{0}'")]
pub struct ParseTimeframeError(pub String);

impl Timeframe {
    /// Bar length in minutes, as the bridge protocol encodes it.
    pub fn minutes(self) -> u32 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::H6 => 360,
            Timeframe::D1 => 1440,
            Timeframe::W1 => 10080,
            Timeframe::MN1 => 43200,
        }
    }

    /// Inverse of [`Timeframe::minutes`]; `None` for unrecognised values.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            1 => Some(Timeframe::M1),
            5 => Some(Timeframe::M5),
            15 => Some(Timeframe::M15),
            30 => Some(Timeframe::M30),
            60 => Some(Timeframe::H1),
            240 => Some(Timeframe::H4),
            360 => Some(Timeframe::H6),
            1440 => Some(Timeframe::D1),
            10080 => Some(Timeframe::W1),
            43200 => Some(Timeframe::MN1),
            _ => None,
        }
    }

    /// The conventional short code, e.g. `"H4"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::H6 => "H6",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
            Timeframe::MN1 => "MN1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "M1" => Ok(Timeframe::M1),
            "M5" => Ok(Timeframe::M5),
            "M15" => Ok(Timeframe::M15),
            "M30" => Ok(Timeframe::M30),
            "H1" => Ok(Timeframe::H1),
            "H4" => Ok(Timeframe::H4),
            "H6" => Ok(Timeframe::H6),
            "D1" => Ok(Timeframe::D1),
            "W1" => Ok(Timeframe::W1),
            "MN1" => Ok(Timeframe::MN1),
            _ => Err(ParseTimeframeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_round_trip() {
        for tf in [
            Timeframe::M1,
            Timeframe::M5,
            Timeframe::M15,
            Timeframe::M30,
            Timeframe::H1,
            Timeframe::H4,
            Timeframe::H6,
            Timeframe::D1,
            Timeframe::W1,
            Timeframe::MN1,
        ] {
            assert_eq!(Timeframe::from_minutes(tf.minutes()), Some(tf));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("h4".parse::<Timeframe>().unwrap(), Timeframe::H4);
        assert_eq!("mn1".parse::<Timeframe>().unwrap(), Timeframe::MN1);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("H2".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::from_minutes(120), None);
    }
}
