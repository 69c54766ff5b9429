use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::factor::DataQuality;

/// A pairwise correlation between two symbols in a portfolio (§3/§4.E.5).
/// Invariant: `symbol_a < symbol_b` lexicographically; self-correlation is
/// always exactly 1.0 and is never stored as a pairwise row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PairwiseCorrelation {
    pub correlation_id: Uuid,
    pub symbol_a: String,
    pub symbol_b: String,
    pub correlation: f64,
}

/// Header row for one correlation run, keyed by
/// (portfolio_id, calculation_date, duration_days).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CorrelationCalculation {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub calculation_date: NaiveDate,
    pub duration_days: i32,
    pub average_correlation: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub calculation: CorrelationCalculation,
    pub pairwise: Vec<PairwiseCorrelation>,
    pub data_quality: Option<DataQuality>,
}
