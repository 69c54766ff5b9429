pub mod fmp;
pub mod polygon;
pub mod price_provider;
pub mod provider_chain;
pub mod yahoo_query;
pub mod yfinance;
