use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::external::price_provider::{
    ExternalCompanyProfile, ExternalOhlcvRow, MarketDataProvider, MarketDataProviderError,
};

/// Third provider in the chain (§4.B): Financial Modeling Prep. Keyed and
/// quota-limited — callers must wrap this in a [`crate::services::rate_limiter::RateLimiter`]
/// sized to FMP's documented per-minute quota.
pub struct FmpProvider {
    client: reqwest::Client,
    api_key: String,
}

impl FmpProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FmpHistoricalResponse {
    #[serde(default)]
    historical: Vec<FmpHistoricalRow>,
}

#[derive(Debug, Deserialize)]
struct FmpHistoricalRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(rename = "adjClose")]
    adj_close: Option<f64>,
    volume: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FmpProfileRow {
    #[serde(rename = "companyName")]
    company_name: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    country: Option<String>,
    exchange: Option<String>,
}

fn to_bigdecimal(value: f64) -> Result<BigDecimal, MarketDataProviderError> {
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| MarketDataProviderError::Parse(e.to_string()))
}

#[async_trait]
impl MarketDataProvider for FmpProvider {
    fn name(&self) -> &'static str {
        "fmp"
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalOhlcvRow>, MarketDataProviderError> {
        let url = format!(
            "https://financialmodelingprep.com/api/v3/historical-price-full/{}",
            symbol
        );
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("from", start.format("%Y-%m-%d").to_string()),
                ("to", end.format("%Y-%m-%d").to_string()),
                ("apikey", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| MarketDataProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataProviderError::RateLimited);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataProviderError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(MarketDataProviderError::BadResponse(resp.status().to_string()));
        }

        let body: FmpHistoricalResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataProviderError::Parse(e.to_string()))?;

        if body.historical.is_empty() {
            return Err(MarketDataProviderError::NotFound);
        }

        let mut rows = Vec::with_capacity(body.historical.len());
        for row in body.historical {
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
                .map_err(|e| MarketDataProviderError::Parse(e.to_string()))?;
            let adj_close = row.adj_close.unwrap_or(row.close);
            rows.push(ExternalOhlcvRow {
                date,
                open: to_bigdecimal(row.open)?,
                high: to_bigdecimal(row.high)?,
                low: to_bigdecimal(row.low)?,
                close: to_bigdecimal(row.close)?,
                adjusted_close: to_bigdecimal(adj_close)?,
                volume: row.volume.unwrap_or(0),
            });
        }
        Ok(rows)
    }

    async fn fetch_company_profile(
        &self,
        symbol: &str,
    ) -> Result<ExternalCompanyProfile, MarketDataProviderError> {
        let url = format!("https://financialmodelingprep.com/api/v3/profile/{}", symbol);
        let resp = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.clone())])
            .send()
            .await
            .map_err(|e| MarketDataProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketDataProviderError::BadResponse(resp.status().to_string()));
        }

        let rows: Vec<FmpProfileRow> = resp
            .json()
            .await
            .map_err(|e| MarketDataProviderError::Parse(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(MarketDataProviderError::NotFound)?;
        Ok(ExternalCompanyProfile {
            company_name: row.company_name,
            sector: row.sector,
            industry: row.industry,
            country: row.country,
            exchange: row.exchange,
        })
    }
}
