pub mod analytics_response;
pub mod batch;
pub mod company_profile;
pub mod correlation;
pub mod factor;
pub mod greeks;
pub mod market_data;
pub mod market_value;
pub mod portfolio;
pub mod position;
pub mod position_interest;
pub mod snapshot;
pub mod stress;
pub mod symbol_universe;

pub use analytics_response::AnalyticsResponse;
pub use batch::{BatchRunHistory, BatchRunRequest, BatchScope, BatchSource, BatchStatus};
pub use company_profile::CompanyProfile;
pub use correlation::{CorrelationCalculation, CorrelationResult, PairwiseCorrelation};
pub use factor::{
    DataQuality, DataQualityFlag, FactorAggregationResult, FactorDefinition, FactorExposure,
    PositionFactorExposure, SymbolFactorExposure,
};
pub use greeks::{GreeksInput, PositionGreeks};
pub use market_data::MarketDataRow;
pub use market_value::{ExposureTotals, PositionMarketValue};
pub use portfolio::{AccountType, CreatePortfolio, Portfolio};
pub use position::{CreatePosition, InvestmentClass, OptionType, Position};
pub use position_interest::PositionInterestAccrual;
pub use snapshot::PortfolioSnapshot;
pub use stress::{FactorShock, FactorShockMap, ScenarioCategory, StressScenario, StressTestResult};
pub use symbol_universe::SymbolUniverseEntry;
