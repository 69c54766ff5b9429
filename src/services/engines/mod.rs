pub mod correlations;
pub mod factor_aggregation;
pub mod greeks;
pub mod market_values;
pub mod position_interest;
pub mod snapshot;
pub mod stress_tests;
pub mod symbol_factors;
