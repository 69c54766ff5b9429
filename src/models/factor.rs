use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A data-quality flag attached to a calculation result, per spec §6/§8.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataQualityFlag {
    FullHistory,
    LimitedHistory,
    NoPublicPositions,
    NoFactorExposures,
    InsufficientData,
    #[serde(rename = "NO_CALCULATIONS")]
    NoCalculations,
}

/// Describes how completely a calculation ran. Carried alongside both
/// successful and skipped results (§9 open question: populated eagerly).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQuality {
    pub flag: DataQualityFlag,
    pub message: String,
    pub positions_analyzed: Option<i32>,
    pub positions_total: Option<i32>,
    pub positions_skipped: Option<i32>,
    pub data_days: Option<i32>,
}

impl DataQuality {
    pub fn full_history(positions_analyzed: i32, positions_total: i32, data_days: i32) -> Self {
        Self {
            flag: DataQualityFlag::FullHistory,
            message: "All active factors computed with sufficient history".to_string(),
            positions_analyzed: Some(positions_analyzed),
            positions_total: Some(positions_total),
            positions_skipped: Some(positions_total - positions_analyzed),
            data_days: Some(data_days),
        }
    }

    pub fn no_public_positions(positions_total: i32) -> Self {
        Self {
            flag: DataQualityFlag::NoPublicPositions,
            message: "Portfolio has no PUBLIC positions eligible for factor analysis".to_string(),
            positions_analyzed: Some(0),
            positions_total: Some(positions_total),
            positions_skipped: Some(positions_total),
            data_days: None,
        }
    }

    pub fn no_factor_exposures() -> Self {
        Self {
            flag: DataQualityFlag::NoFactorExposures,
            message: "Portfolio has no factor exposures to stress".to_string(),
            positions_analyzed: None,
            positions_total: None,
            positions_skipped: None,
            data_days: None,
        }
    }

    pub fn insufficient_data(data_days: i32) -> Self {
        Self {
            flag: DataQualityFlag::InsufficientData,
            message: format!("Only {} overlapping observations available", data_days),
            positions_analyzed: None,
            positions_total: None,
            positions_skipped: None,
            data_days: Some(data_days),
        }
    }
}

/// Global configuration: one of the canonical factors, backed by a factor
/// ETF used as the return proxy in the regression (§4.E.3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FactorDefinition {
    pub id: Uuid,
    pub name: String,
    pub etf_symbol: String,
    pub is_active: bool,
}

impl FactorDefinition {
    /// The canonical seven-factor model referenced by spec §8's end-to-end
    /// scenario ("7 factor betas if 7-factor model").
    pub fn canonical_seven() -> Vec<FactorDefinition> {
        [
            ("Market", "SPY"),
            ("Size", "IWM"),
            ("Momentum", "MTUM"),
            ("Value", "VLUE"),
            ("Quality", "QUAL"),
            ("LowVolatility", "USMV"),
            ("Growth", "IWF"),
        ]
        .into_iter()
        .map(|(name, etf)| FactorDefinition {
            id: Uuid::new_v4(),
            name: name.to_string(),
            etf_symbol: etf.to_string(),
            is_active: true,
        })
        .collect()
    }
}

/// A symbol's beta against one factor ETF over the configured lookback,
/// keyed by (symbol, calculation_date, factor_id) in storage even though the
/// symbol itself isn't owned by any portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SymbolFactorExposure {
    pub symbol: String,
    pub calculation_date: NaiveDate,
    pub factor_id: Uuid,
    pub beta: f64,
    pub data_days: i32,
    pub insufficient_history: bool,
}

/// Portfolio-level factor beta, aggregated from position-level exposures
/// weighted by signed dollar exposure (§4.E.4).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FactorExposure {
    pub portfolio_id: Uuid,
    pub calculation_date: NaiveDate,
    pub factor_id: Uuid,
    pub exposure_value: f64,
    pub exposure_dollar: BigDecimal,
}

/// Per-position beta against one factor (§3 "Position Factor Exposure").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PositionFactorExposure {
    pub position_id: Uuid,
    pub calculation_date: NaiveDate,
    pub factor_id: Uuid,
    pub beta: f64,
}

/// The full output of the Factor Aggregation engine (§4.E.4) for one
/// portfolio on one date: either a populated set covering every active
/// factor, or a documented skip payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorAggregationResult {
    pub portfolio_id: Uuid,
    pub calculation_date: NaiveDate,
    pub exposures: Vec<FactorExposure>,
    pub position_exposures: Vec<PositionFactorExposure>,
    pub data_quality: DataQuality,
}
