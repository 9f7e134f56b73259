//! # fxscan — FX Instrument Scanner Backend
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐  GET /PriceHistoryMany  ┌──────────────────────────┐
//!  │  MT5 Bridge  │ ◀───────────────────────│  Scan Loop (every 60 s)  │
//!  │  (EA / HTTP) │ ────────────────────────▶  fetch → shift zone →    │
//!  └──────────────┘      raw bar series     │  build current bar →     │
//!                                           │  evaluate WPR/fractals → │
//!  ┌──────────────┐  GET /api/scan/results  │  compose grid            │
//!  │  Grid UI /   │ ◀───────────────────────│                          │
//!  │  API client  │  POST /api/scan/refresh │  AppState (grid, list)   │
//!  └──────────────┘ ────────────────────────▶                          │
//!                                           └──────────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable             | Default                 | Description                  |
//! |----------------------|-------------------------|------------------------------|
//! | `BIND_ADDR`          | `0.0.0.0:3000`          | Address Axum listens on      |
//! | `MT5_BASE_URL`       | `http://localhost:8081` | Base URL of the MT5 bridge   |
//! | `SCAN_INTERVAL_SECS` | `60`                    | Seconds between scan cycles  |
//! | `UTC_OFFSET_HOURS`   | `3`                     | Target zone for bar times    |
//! | `INSTRUMENTS`        | `EURUSD:H1`             | Seed scan list               |
//! | `RUST_LOG`           | `fxscan=debug`          | Tracing filter               |

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod market;
mod models;
mod routes;
mod state;

use config::Config;
use routes::{
    instruments::{list_instruments, remove_instrument, upsert_instrument},
    scan::{get_results, health_check, refresh},
};
use state::build_state;

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional — CI/prod can use real env vars) ──────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("fxscan=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════════╗
  ║        FXSCAN — Instrument Scanner            ║
  ║        Rust + Axum  ·  WPR & Fractals         ║
  ╚═══════════════════════════════════════════════╝"#
    );

    // ── 3. Load config and build shared state ────────────────────────────────
    let config = Config::from_env().context("Failed to load config")?;
    info!(
        bridge      = %config.mt5_base_url,
        interval    = ?config.scan_interval,
        utc_offset  = config.utc_offset_hours,
        instruments = config.instruments.len(),
        "Configuration loaded"
    );
    let state = build_state(config);

    // ── 4. Start the scan loop ───────────────────────────────────────────────
    tokio::spawn(engine::scanner::scan_loop(state.clone()));

    // ── 5. Build CORS layer (grid UI may live on another origin) ─────────────
    let cors = CorsLayer::new()
        .allow_origin(Any) // Tighten in production!
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 6. Build the Axum router ─────────────────────────────────────────────
    let addr: SocketAddr = state.config.bind_addr.parse()?;
    let app = Router::new()
        // ── Scan grid ────────────────────────────────────────────────────────
        .route("/api/scan/results", get(get_results))
        .route("/api/scan/refresh", post(refresh))
        .route("/api/health", get(health_check))
        // ── Scan list ────────────────────────────────────────────────────────
        .route("/api/instruments", get(list_instruments))
        .route("/api/instruments", post(upsert_instrument))
        .route("/api/instruments", delete(remove_instrument))
        // ── Middleware ───────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // ── 7. Serve ─────────────────────────────────────────────────────────────
    info!(?addr, "🚀 fxscan server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
