use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::external::price_provider::{
    ExternalCompanyProfile, ExternalOhlcvRow, MarketDataProvider, MarketDataProviderError,
};

/// First provider tried in the chain (§4.B). Wraps Yahoo Finance's
/// unauthenticated chart/quoteSummary endpoints — no API key required.
pub struct YahooQueryProvider {
    client: reqwest::Client,
}

impl YahooQueryProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
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
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: String,
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
impl MarketDataProvider for YahooQueryProvider {
    fn name(&self) -> &'static str {
        "yahooquery"
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalOhlcvRow>, MarketDataProviderError> {
        let url = format!("https://query1.finance.yahoo.com/v8/finance/chart/{}", symbol);
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| MarketDataProviderError::Parse("invalid start date".into()))?
            .and_utc()
            .timestamp();
        let period2 = end
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| MarketDataProviderError::Parse("invalid end date".into()))?
            .and_utc()
            .timestamp();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
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

        if let Some(error) = body.chart.error {
            return Err(MarketDataProviderError::BadResponse(error.description));
        }

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
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);
            let adj = adjclose
                .as_ref()
                .and_then(|a| a.get(i).copied().flatten())
                .unwrap_or(close);

            let date = chrono::DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| MarketDataProviderError::Parse("bad timestamp".into()))?
                .date_naive();

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
        symbol: &str,
    ) -> Result<ExternalCompanyProfile, MarketDataProviderError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}",
            symbol
        );
        let resp = self
            .client
            .get(&url)
            .query(&[("modules", "assetProfile")])
            .send()
            .await
            .map_err(|e| MarketDataProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketDataProviderError::BadResponse(resp.status().to_string()));
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| MarketDataProviderError::Parse(e.to_string()))?;

        let profile = &value["quoteSummary"]["result"][0]["assetProfile"];
        Ok(ExternalCompanyProfile {
            company_name: None,
            sector: profile["sector"].as_str().map(String::from),
            industry: profile["industry"].as_str().map(String::from),
            country: profile["country"].as_str().map(String::from),
            exchange: None,
        })
    }
}
