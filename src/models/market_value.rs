use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-position market value and exposure on one calculation date (§4.E.2).
/// `delta_adjusted_exposure` falls back to `market_value` for non-OPTIONS
/// positions (delta of 1.0 assumed).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PositionMarketValue {
    pub position_id: Uuid,
    pub calculation_date: NaiveDate,
    pub price: BigDecimal,
    pub market_value: BigDecimal,
    pub delta_adjusted_exposure: BigDecimal,
    pub unrealized_pnl: BigDecimal,
}

/// Portfolio-level roll-up used by Factor Aggregation and Snapshot
/// (§4.E.2/§4.E.7): long/short/gross/net exposure in dollars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureTotals {
    pub long_exposure: BigDecimal,
    pub short_exposure: BigDecimal,
    pub gross_exposure: BigDecimal,
    pub net_exposure: BigDecimal,
}

impl ExposureTotals {
    pub fn zero() -> Self {
        Self {
            long_exposure: BigDecimal::from(0),
            short_exposure: BigDecimal::from(0),
            gross_exposure: BigDecimal::from(0),
            net_exposure: BigDecimal::from(0),
        }
    }
}
