use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::external::price_provider::{
    ExternalCompanyProfile, ExternalOhlcvRow, MarketDataProvider, MarketDataProviderError,
};

/// Second provider in the chain (§4.B). Same Yahoo chart endpoint as
/// [`crate::external::yahoo_query::YahooQueryProvider`] but requested with a
/// `range` window rather than explicit `period1`/`period2` — yfinance's
/// actual request shape — so it covers symbols the first provider rejects
/// for a too-wide custom range.
pub struct YFinanceProvider {
    client: reqwest::Client,
}

impl YFinanceProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn range_for(start: NaiveDate, end: NaiveDate) -> &'static str {
        let days = (end - start).num_days();
        match days {
            d if d <= 7 => "5d",
            d if d <= 31 => "1mo",
            d if d <= 93 => "3mo",
            d if d <= 186 => "6mo",
            d if d <= 366 => "1y",
            d if d <= 366 * 2 => "2y",
            d if d <= 366 * 5 => "5y",
            _ => "max",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
    adjclose: Option<Vec<ChartAdjClose>>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    adjclose: Vec<Option<f64>>,
}

fn to_bigdecimal(value: f64) -> Result<BigDecimal, MarketDataProviderError> {
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| MarketDataProviderError::Parse(e.to_string()))
}

#[async_trait]
impl MarketDataProvider for YFinanceProvider {
    fn name(&self) -> &'static str {
        "yfinance"
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalOhlcvRow>, MarketDataProviderError> {
        let url = format!("https://query2.finance.yahoo.com/v8/finance/chart/{}", symbol);
        let range = Self::range_for(start, end);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| MarketDataProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataProviderError::NotFound);
        }
        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(MarketDataProviderError::BadResponse(resp.status().to_string()));
        }

        let body: ChartResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataProviderError::Parse(e.to_string()))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or(MarketDataProviderError::NotFound)?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataProviderError::Parse("missing quote block".into()))?;
        let adjclose = result
            .indicators
            .adjclose
            .and_then(|mut a| if a.is_empty() { None } else { Some(a.remove(0).adjclose) });

        let mut rows = Vec::new();
        for (i, ts) in timestamps.iter().enumerate() {
            let (Some(open), Some(high), Some(low), Some(close)) =
                (quote.open.get(i).copied().flatten(), quote.high.get(i).copied().flatten(),
                 quote.low.get(i).copied().flatten(), quote.close.get(i).copied().flatten())
            else {
                continue;
            };
            let date = chrono::DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| MarketDataProviderError::Parse("bad timestamp".into()))?
                .date_naive();
            if date < start || date > end {
                continue;
            }
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);
            let adj = adjclose
                .as_ref()
                .and_then(|a| a.get(i).copied().flatten())
                .unwrap_or(close);

            rows.push(ExternalOhlcvRow {
                date,
                open: to_bigdecimal(open)?,
                high: to_bigdecimal(high)?,
                low: to_bigdecimal(low)?,
                close: to_bigdecimal(close)?,
                adjusted_close: to_bigdecimal(adj)?,
                volume,
            });
        }

        if rows.is_empty() {
            return Err(MarketDataProviderError::NotFound);
        }
        Ok(rows)
    }

    async fn fetch_company_profile(
        &self,
        _symbol: &str,
    ) -> Result<ExternalCompanyProfile, MarketDataProviderError> {
        // yfinance's profile endpoint is the same quoteSummary surface
        // YahooQueryProvider already covers; this provider only backstops OHLCV.
        Ok(ExternalCompanyProfile::default())
    }
}
