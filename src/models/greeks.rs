use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Black–Scholes Greeks for one OPTIONS position on one calculation date
/// (§4.E.1). `None` means the engine failed soft — missing inputs, not an
/// error — and the position is recorded with a null Greek set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionGreeks {
    pub position_id: Uuid,
    pub calculation_date: NaiveDate,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
    pub rho: Option<f64>,
    pub quality_warning: Option<String>,
}

impl PositionGreeks {
    pub fn missing(position_id: Uuid, calculation_date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            position_id,
            calculation_date,
            delta: None,
            gamma: None,
            theta: None,
            vega: None,
            rho: None,
            quality_warning: Some(reason.into()),
        }
    }
}

/// The inputs the Greeks engine needs for one OPTIONS position, already
/// resolved from the Market Data Cache and position header fields.
#[derive(Debug, Clone)]
pub struct GreeksInput {
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry_years: f64,
    pub risk_free_rate: f64,
    pub implied_volatility: f64,
    pub is_call: bool,
}
