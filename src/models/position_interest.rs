use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Accrued interest for one fixed-income position as of D (§4.E.8). Runs
/// after the Snapshot engine — it updates a position's own ledger, not
/// anything the snapshot reads, so it sits outside the hard ordering
/// invariant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PositionInterestAccrual {
    pub position_id: Uuid,
    pub calculation_date: NaiveDate,
    pub days_accrued: i32,
    pub annual_rate: f64,
    pub accrued_interest: BigDecimal,
}
