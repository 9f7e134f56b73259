//! Domain models shared across the entire fxscan service.

pub mod bar;
pub mod instrument;
pub mod scan;
pub mod timeframe;

pub use bar::{Bar, RawBar, PRICE_EPSILON};
pub use instrument::Instrument;
pub use scan::{DisplayRow, PeriodSignals, RelativeDirection, ScanGrid, ScanResult, WPR_PERIODS};
pub use timeframe::Timeframe;
