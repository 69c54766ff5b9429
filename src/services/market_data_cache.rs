use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::db::market_data_queries;
use crate::errors::AppError;
use crate::external::price_provider::ExternalOhlcvRow;
use crate::external::provider_chain::{OhlcvFetchResult, ProviderChain};
use crate::models::MarketDataRow;

/// Ingests OHLCV for a symbol set over [start, end] through the Provider
/// Chain and upserts every returned row into the Market Data Cache (§4.D).
/// Returns the chain's per-symbol outcome so the orchestrator can fold
/// `unavailable_symbols` into the run's data-quality reporting.
pub async fn ingest(
    pool: &PgPool,
    chain: &ProviderChain,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<OhlcvFetchResult, AppError> {
    let result = chain.fetch_ohlcv(symbols, start, end).await;

    let mut rows = Vec::new();
    for (symbol, fetched) in &result.rows_by_symbol {
        for row in fetched {
            rows.push(to_market_data_row(symbol, row, "provider_chain"));
        }
    }
    market_data_queries::upsert_many(pool, &rows).await?;

    Ok(result)
}

fn to_market_data_row(symbol: &str, row: &ExternalOhlcvRow, source: &str) -> MarketDataRow {
    MarketDataRow::new(
        symbol,
        row.date,
        row.open.clone(),
        row.high.clone(),
        row.low.clone(),
        row.close.clone(),
        row.adjusted_close.clone(),
        row.volume,
        source,
    )
}

/// Read path used by the Calculation Engines: the authoritative close for
/// (symbol, date), or `None` if the cache has no row.
pub async fn price_on(pool: &PgPool, symbol: &str, date: NaiveDate) -> Result<Option<BigDecimal>, AppError> {
    let rows = market_data_queries::fetch_range(pool, symbol, date, date).await?;
    Ok(rows.into_iter().next().map(|r| r.adjusted_close))
}

/// Read path for the regression engines: the full close series for a symbol
/// over a lookback window, keyed by date.
pub async fn close_series(
    pool: &PgPool,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashMap<NaiveDate, BigDecimal>, AppError> {
    let rows = market_data_queries::fetch_range(pool, symbol, start, end).await?;
    Ok(rows.into_iter().map(|r| (r.date, r.adjusted_close)).collect())
}

/// Date-keyed daily returns for one symbol over a lookback window, used by
/// the Correlations engine to align each pair on trading day rather than
/// index position.
pub async fn close_returns(
    pool: &PgPool,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    let rows = market_data_queries::fetch_range(pool, symbol, start, end).await?;
    let mut dated: Vec<(NaiveDate, f64)> = rows
        .into_iter()
        .filter_map(|r| r.adjusted_close.to_string().parse::<f64>().ok().map(|p| (r.date, p)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let mut returns = Vec::new();
    for window in dated.windows(2) {
        let (_, prev) = window[0];
        let (date, price) = window[1];
        if prev != 0.0 {
            returns.push((date, price / prev - 1.0));
        }
    }
    Ok(returns)
}

pub type SharedProviderChain = Arc<ProviderChain>;
