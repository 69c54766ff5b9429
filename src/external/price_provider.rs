use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ExternalOhlcvRow {
    pub date: NaiveDate,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
    pub adjusted_close: BigDecimal,
    pub volume: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ExternalCompanyProfile {
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarketDataProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("symbol not found")]
    NotFound,

    #[error("timed out")]
    Timeout,
}

/// One external source of market data in the Provider Chain (§4.B). Every
/// method covers the subset of a request it can satisfy — implementations
/// never partially fetch a symbol then give up silently; they return
/// `NotFound` for that symbol instead.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalOhlcvRow>, MarketDataProviderError>;

    async fn fetch_company_profile(
        &self,
        symbol: &str,
    ) -> Result<ExternalCompanyProfile, MarketDataProviderError>;
}
