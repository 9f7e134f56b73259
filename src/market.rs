//! # market — MT5 bridge client
//!
//! Fetches raw bar history from the MT5 bridge over HTTP. One request covers
//! many symbols at once (`PriceHistoryMany`), which is what keeps a scan
//! cycle at one round-trip per timeframe group instead of one per symbol.
//!
//! Nothing here retries: a failed fetch fails the cycle, the loop logs it
//! and the next scheduled cycle is the retry.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{RawBar, Timeframe};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// One symbol's slice of a `PriceHistoryMany` response.
#[derive(Debug, Deserialize)]
struct SymbolHistory {
    symbol: String,
    bars: Vec<RawBar>,
}

#[derive(Debug, Deserialize)]
struct PriceHistoryManyResponse {
    data: Vec<SymbolHistory>,
}

/// Fetch the most recent `bars_count` bars of `timeframe` for every symbol,
/// keyed by symbol in the result.
///
/// Symbols the bridge returns nothing for are simply absent from the map;
/// the caller decides what a missing series means.
pub async fn fetch_price_history(
    client: &reqwest::Client,
    base_url: &str,
    symbols: &[String],
    timeframe: Timeframe,
    bars_count: u32,
) -> anyhow::Result<HashMap<String, Vec<RawBar>>> {
    let url = format!("{base_url}/PriceHistoryMany");

    let mut query: Vec<(&str, String)> = symbols
        .iter()
        .map(|s| ("symbol", s.clone()))
        .collect();
    query.push(("timeFrame", timeframe.minutes().to_string()));
    query.push(("barsCount", bars_count.to_string()));

    let response: PriceHistoryManyResponse = client
        .get(&url)
        .query(&query)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .context("MT5 bridge unreachable")?
        .error_for_status()
        .context("MT5 bridge rejected the history request")?
        .json()
        .await
        .context("failed to parse MT5 bridge response")?;

    Ok(response
        .data
        .into_iter()
        .map(|entry| (entry.symbol, entry.bars))
        .collect())
}
