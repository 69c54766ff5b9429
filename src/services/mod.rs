pub mod batch_tracker;
pub mod engines;
pub mod failure_cache;
pub mod market_data_cache;
pub mod orchestrator;
pub mod rate_limiter;
pub mod stats;
pub mod symbol_universe_resolver;
pub mod trading_calendar;
pub mod watermark_service;
