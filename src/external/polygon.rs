use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

use crate::external::price_provider::{
    ExternalCompanyProfile, ExternalOhlcvRow, MarketDataProvider, MarketDataProviderError,
};

/// Last provider in the chain (§4.B): Polygon.io. Keyed and quota-limited,
/// tried only for symbols the three earlier providers could not satisfy.
pub struct PolygonProvider {
    client: reqwest::Client,
    api_key: String,
}

impl PolygonProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PolygonAggsResponse {
    status: String,
    #[serde(default)]
    results: Vec<PolygonAggRow>,
}

#[derive(Debug, Deserialize)]
struct PolygonAggRow {
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: f64,
    #[serde(rename = "t")]
    timestamp_ms: i64,
}

#[derive(Debug, Deserialize)]
struct PolygonTickerDetailsResponse {
    results: Option<PolygonTickerDetails>,
}

#[derive(Debug, Deserialize)]
struct PolygonTickerDetails {
    name: Option<String>,
    #[serde(rename = "sic_description")]
    sic_description: Option<String>,
    locale: Option<String>,
    primary_exchange: Option<String>,
}

fn to_bigdecimal(value: f64) -> Result<BigDecimal, MarketDataProviderError> {
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| MarketDataProviderError::Parse(e.to_string()))
}

#[async_trait]
impl MarketDataProvider for PolygonProvider {
    fn name(&self) -> &'static str {
        "polygon"
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalOhlcvRow>, MarketDataProviderError> {
        let url = format!(
            "https://api.polygon.io/v2/aggs/ticker/{}/range/1/day/{}/{}",
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );
        let resp = self
            .client
            .get(&url)
            .query(&[("adjusted", "true"), ("sort", "asc"), ("apiKey", &self.api_key)])
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

        let body: PolygonAggsResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataProviderError::Parse(e.to_string()))?;

        if body.status != "OK" && body.status != "DELAYED" {
            return Err(MarketDataProviderError::BadResponse(body.status));
        }
        if body.results.is_empty() {
            return Err(MarketDataProviderError::NotFound);
        }

        let mut rows = Vec::with_capacity(body.results.len());
        for row in body.results {
            let date = chrono::DateTime::from_timestamp_millis(row.timestamp_ms)
                .ok_or_else(|| MarketDataProviderError::Parse("bad timestamp".into()))?
                .date_naive();
            rows.push(ExternalOhlcvRow {
                date,
                open: to_bigdecimal(row.open)?,
                high: to_bigdecimal(row.high)?,
                low: to_bigdecimal(row.low)?,
                close: to_bigdecimal(row.close)?,
                adjusted_close: to_bigdecimal(row.close)?,
                volume: row.volume as i64,
            });
        }
        Ok(rows)
    }

    async fn fetch_company_profile(
        &self,
        symbol: &str,
    ) -> Result<ExternalCompanyProfile, MarketDataProviderError> {
        let url = format!("https://api.polygon.io/v3/reference/tickers/{}", symbol);
        let resp = self
            .client
            .get(&url)
            .query(&[("apiKey", &self.api_key)])
            .send()
            .await
            .map_err(|e| MarketDataProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketDataProviderError::BadResponse(resp.status().to_string()));
        }

        let body: PolygonTickerDetailsResponse = resp
            .json()
            .await
            .map_err(|e| MarketDataProviderError::Parse(e.to_string()))?;

        let details = body.results.ok_or(MarketDataProviderError::NotFound)?;
        Ok(ExternalCompanyProfile {
            company_name: details.name,
            sector: details.sic_description,
            industry: None,
            country: details.locale,
            exchange: details.primary_exchange,
        })
    }
}
