pub mod batch_queries;
pub mod company_profile_queries;
pub mod correlation_queries;
pub mod factor_queries;
pub mod market_data_queries;
pub mod portfolio_queries;
pub mod position_interest_queries;
pub mod position_queries;
pub mod snapshot_queries;
pub mod stress_queries;
pub mod symbol_universe_queries;
