//! # state
//!
//! The fxscan **shared application state** — what the scheduled scan loop
//! (writes) and the API handlers (mostly reads) share.
//!
//! ## Design Decisions
//!
//! * `Arc<AppState>` is cloned cheaply into every Axum handler via
//!   `axum::extract::State`.
//! * `RwLock` from `tokio::sync` for the instrument list and the latest
//!   grid: many concurrent readers, one writer at the end of a cycle.
//! * The in-flight flag is a plain `AtomicBool` owned HERE, not in the
//!   engine — the evaluation core is pure and knows nothing about
//!   scheduling. A cycle that finds the flag already set is skipped, never
//!   queued.

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::{Instrument, ScanGrid};

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Shared outbound HTTP client for the MT5 bridge.
    pub http: reqwest::Client,

    /// The current scan list. Seeded from config, edited over the API.
    pub instruments: Arc<RwLock<Vec<Instrument>>>,

    /// The latest composed grid, swapped wholesale at the end of a cycle.
    pub grid: Arc<RwLock<ScanGrid>>,

    /// True while a scan cycle is running. Guards against overlap from the
    /// timer and manual refresh firing together.
    pub scan_in_flight: Arc<AtomicBool>,

    /// Completed scan cycles this session. Useful for health dashboards and
    /// spotting a stalled scheduler.
    pub cycle_count: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let instruments = config.instruments.clone();
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            instruments: Arc::new(RwLock::new(instruments)),
            grid: Arc::new(RwLock::new(ScanGrid::default())),
            scan_in_flight: Arc::new(AtomicBool::new(false)),
            cycle_count: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Convenience alias so callers can write `SharedState` instead of the full
/// generic form.
pub type SharedState = Arc<AppState>;

/// Construct the shared application state ready for injection into the Axum
/// router.
pub fn build_state(config: Config) -> SharedState {
    Arc::new(AppState::new(config))
}
