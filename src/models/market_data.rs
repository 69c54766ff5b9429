use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One (symbol, date) OHLCV row in the content-addressed Market Data Cache
/// (§3/§4.D). Unique on (symbol, date); a row's presence means "we believe
/// this is the authoritative close for that symbol on that date".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketDataRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
    pub adjusted_close: BigDecimal,
    pub volume: i64,
    pub source_provider: String,
    pub ingested_at: DateTime<Utc>,
}

impl MarketDataRow {
    pub fn new(
        symbol: impl Into<String>,
        date: NaiveDate,
        open: BigDecimal,
        high: BigDecimal,
        low: BigDecimal,
        close: BigDecimal,
        adjusted_close: BigDecimal,
        volume: i64,
        source_provider: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
            source_provider: source_provider.into(),
            ingested_at: Utc::now(),
        }
    }
}
