use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The durable "date D has been processed for portfolio P" marker (§3/§4.E.7).
/// Written only after every prior engine for (P, D) has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioSnapshot {
    pub portfolio_id: Uuid,
    pub snapshot_date: NaiveDate,
    pub total_value: BigDecimal,
    pub cash_balance: BigDecimal,
    pub long_exposure: BigDecimal,
    pub short_exposure: BigDecimal,
    pub gross_exposure: BigDecimal,
    pub net_exposure: BigDecimal,
    pub daily_return: Option<f64>,
    pub position_count: i32,
}
