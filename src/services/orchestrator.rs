use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::{
    batch_queries, correlation_queries, factor_queries, portfolio_queries, position_queries,
    snapshot_queries, stress_queries,
};
use crate::errors::AppError;
use crate::external::provider_chain::ProviderChain;
use crate::models::{
    BatchRunHistory, BatchScope, BatchSource, BatchStatus, FactorDefinition, Portfolio, Position,
    PositionMarketValue, StressScenario,
};
use crate::services::batch_tracker::BatchTracker;
use crate::services::engines::{
    correlations, factor_aggregation, greeks, market_values, position_interest, snapshot,
    stress_tests, symbol_factors,
};
use crate::services::{market_data_cache, symbol_universe_resolver, trading_calendar, watermark_service};

/// Serializes overlapping runs (§4.G/§9). A single global key means at most
/// one batch — of any scope — ever holds the lock at a time; scoped
/// onboarding runs are rare enough that this simplicity outweighs the
/// concurrency it gives up.
const ORCHESTRATOR_LOCK_KEY: i64 = 0x5347_4152_4953_4B; // "SGARISK" in hex-ish, arbitrary constant

const CORRELATION_DURATION_DAYS: i32 = 90;

pub struct BatchOrchestrator {
    pool: PgPool,
    chain: ProviderChain,
    config: Config,
    tracker: BatchTracker,
}

impl BatchOrchestrator {
    pub fn new(pool: PgPool, chain: ProviderChain, config: Config, tracker: BatchTracker) -> Self {
        Self { pool, chain, config, tracker }
    }

    /// Global mode (§4.G.1): all active portfolios (or an explicit subset),
    /// date range from the Watermark Service unless overridden.
    pub async fn run_daily_batch_with_backfill(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        portfolio_ids: Option<Vec<Uuid>>,
        source: BatchSource,
        force: bool,
    ) -> Result<BatchRunHistory, AppError> {
        let scope = BatchScope::Global { portfolio_ids };
        self.run(scope, source, start, end, force).await
    }

    /// Scoped mode (§4.G.1): a single portfolio being onboarded or having its
    /// settings changed, backfilled from its earliest position entry date.
    pub async fn run_portfolio_onboarding_backfill(
        &self,
        portfolio_id: Uuid,
        source: BatchSource,
    ) -> Result<BatchRunHistory, AppError> {
        let scope = BatchScope::Portfolio { portfolio_id };
        self.run(scope, source, None, None, true).await
    }

    async fn run(
        &self,
        scope: BatchScope,
        source: BatchSource,
        start_override: Option<NaiveDate>,
        end_override: Option<NaiveDate>,
        force: bool,
    ) -> Result<BatchRunHistory, AppError> {
        let mut history = BatchRunHistory::start(source, None);
        batch_queries::insert(&self.pool, &history).await?;
        self.tracker.record_running(history.batch_run_id, &scope);

        // The advisory lock is held by the Postgres *session*, not the pool —
        // it must be acquired and released on one dedicated connection kept
        // alive for the run's full duration, never on connections pulled
        // ad hoc from the pool.
        let lock_key = lock_key_for(&scope);
        let mut lock_conn = self.pool.acquire().await?;
        let acquired = batch_queries::try_acquire_run_lock(&mut lock_conn, lock_key).await?;
        if !acquired {
            self.finish(&mut history, BatchStatus::Failed, 0, 0, Some("lock held by another run".to_string())).await?;
            return Err(AppError::LockHeld);
        }

        let outcome = self.run_locked(&history, &scope, start_override, end_override, force).await;
        batch_queries::release_run_lock(&mut lock_conn, lock_key).await?;
        drop(lock_conn);

        match outcome {
            Ok((total, successful, error_summary)) => {
                let failed = total - successful;
                let status = if failed == 0 { BatchStatus::Completed } else { BatchStatus::Failed };
                self.finish(&mut history, status, total, successful, error_summary).await?;
                Ok(history)
            }
            Err(e) => {
                self.finish(&mut history, BatchStatus::Failed, 0, 0, Some(e.to_string())).await?;
                Err(e)
            }
        }
    }

    async fn finish(
        &self,
        history: &mut BatchRunHistory,
        status: BatchStatus,
        total: i32,
        successful: i32,
        error_summary: Option<String>,
    ) -> Result<(), AppError> {
        history.status = status;
        history.total_jobs = total;
        history.successful = successful;
        history.failed = total - successful;
        history.error_summary = error_summary.clone();
        batch_queries::mark_terminal(&self.pool, history.batch_run_id, status, total, successful, total - successful, error_summary.as_deref()).await?;
        self.tracker.record_terminal(history.batch_run_id, status);
        Ok(())
    }

    /// Runs with the advisory lock held. Never panics on a per-portfolio
    /// failure — those are caught and folded into the run's failure count so
    /// one bad portfolio cannot sink the whole run.
    async fn run_locked(
        &self,
        history: &BatchRunHistory,
        scope: &BatchScope,
        start_override: Option<NaiveDate>,
        end_override: Option<NaiveDate>,
        force: bool,
    ) -> Result<(i32, i32, Option<String>), AppError> {
        let portfolios = self.resolve_portfolios(scope).await?;
        if portfolios.is_empty() {
            return Ok((0, 0, None));
        }

        let end = match end_override {
            Some(d) => d,
            None => chrono::Utc::now().date_naive(),
        };
        let start = match start_override {
            Some(d) => d,
            None => self.resolve_start(scope, &portfolios).await?.unwrap_or(end),
        };

        let trading_days = trading_calendar::enumerate_trading_days(start, end);
        let factor_defs = self.factor_definitions().await?;
        let scenarios: Vec<StressScenario> = crate::models::stress::default_scenario_library()
            .into_iter()
            .filter(|s| s.is_active)
            .collect();

        let mut total = 0;
        let mut successful = 0;
        let mut errors = Vec::new();

        for date in trading_days {
            let already_done = if force {
                Default::default()
            } else {
                watermark_service::portfolios_with_snapshot(&self.pool, date).await?
            };

            let symbols = symbol_universe_resolver::resolve(&self.pool, scope, &self.config.factor_etfs).await?;
            let lookback_start = date - chrono::Duration::days(400);
            let fetch_result = market_data_cache::ingest(&self.pool, &self.chain, &symbols, lookback_start, date).await?;
            if !fetch_result.unavailable_symbols.is_empty() {
                warn!(date = %date, count = fetch_result.unavailable_symbols.len(), "symbols unavailable this run");
            }

            let symbol_exposures = symbol_factors::calculate(&self.pool, &symbols, &factor_defs, date).await?;
            for exposure in &symbol_exposures {
                factor_queries::upsert_symbol_exposure(&self.pool, exposure).await?;
            }

            for portfolio in &portfolios {
                if already_done.contains(&portfolio.id) {
                    continue;
                }
                total += 1;
                self.tracker.record_progress(history.batch_run_id, total, portfolios.len() as i32);

                match self
                    .process_portfolio_for_date(portfolio, date, &symbol_exposures, &factor_defs, &scenarios)
                    .await
                {
                    Ok(()) => successful += 1,
                    Err(e) => {
                        error!(portfolio_id = %portfolio.id, date = %date, error = %e, "portfolio batch failed, isolating");
                        errors.push(format!("{}@{}: {}", portfolio.id, date, e));
                    }
                }
            }
        }

        let error_summary = if errors.is_empty() { None } else { Some(errors.join("; ")) };
        Ok((total, successful, error_summary))
    }

    /// One portfolio, one date, engines in the hard ordering invariant
    /// (§4.E): Greeks → Market Values → Factor Aggregation → Correlations →
    /// Stress Tests → Snapshot → Position Interest.
    async fn process_portfolio_for_date(
        &self,
        portfolio: &Portfolio,
        date: NaiveDate,
        symbol_exposures: &[crate::models::SymbolFactorExposure],
        factor_defs: &[FactorDefinition],
        scenarios: &[StressScenario],
    ) -> Result<(), AppError> {
        let positions = position_queries::fetch_active(&self.pool, portfolio.id, date).await?;

        let mut market_values_by_id: HashMap<Uuid, PositionMarketValue> = HashMap::new();
        for position in &positions {
            let spot = market_data_cache::price_on(&self.pool, &position.symbol, date).await?;
            let position_greeks = if position.option_type.is_some() {
                let spot_f64 = spot.as_ref().and_then(|p| p.to_string().parse::<f64>().ok());
                let input = greeks::resolve_input(position, spot_f64, date, self.config.risk_free_rate);
                Some(greeks::calculate(position, input, date))
            } else {
                None
            };

            let (market_value, used_fallback) = market_values::calculate(position, date, spot.as_ref(), position_greeks.as_ref());
            if used_fallback {
                warn!(position_id = %position.id, date = %date, "no cached price, falling back to entry price");
            }
            market_values_by_id.insert(position.id, market_value);
        }

        let totals = market_values::aggregate_exposures(&market_values_by_id.values().cloned().collect::<Vec<_>>());

        let aggregation = factor_aggregation::calculate(
            portfolio.id,
            date,
            &positions,
            &market_values_by_id,
            symbol_exposures,
            factor_defs,
        );
        for exposure in &aggregation.exposures {
            factor_queries::upsert_portfolio_exposure(&self.pool, exposure).await?;
        }
        for exposure in &aggregation.position_exposures {
            factor_queries::upsert_position_exposure(&self.pool, exposure).await?;
        }

        let mut return_series = HashMap::new();
        for symbol in positions.iter().map(|p| &p.symbol).collect::<std::collections::BTreeSet<_>>() {
            let series = market_data_cache::close_returns(&self.pool, symbol, date - chrono::Duration::days(CORRELATION_DURATION_DAYS as i64 * 2), date).await?;
            return_series.insert(symbol.clone(), series);
        }
        let correlation_result = correlations::calculate(
            portfolio.id,
            date,
            CORRELATION_DURATION_DAYS,
            &positions,
            &market_values_by_id,
            &return_series,
        );
        correlation_queries::insert_calculation(&self.pool, &correlation_result.calculation).await?;
        if !correlation_result.pairwise.is_empty() {
            correlation_queries::insert_pairwise(&self.pool, correlation_result.calculation.id, &correlation_result.pairwise).await?;
        }

        let baseline_value: f64 = portfolio.equity_balance.to_string().parse().unwrap_or(0.0)
            + market_values_by_id.values().map(|v| v.market_value.to_string().parse::<f64>().unwrap_or(0.0)).sum::<f64>();
        for scenario in scenarios {
            if let Some(result) = stress_tests::calculate(portfolio.id, date, scenario, &aggregation.exposures, factor_defs, baseline_value) {
                stress_queries::upsert_result(&self.pool, &result).await?;
            }
        }

        // Position Interest must write before the snapshot upsert below: the
        // snapshot is the canonical "this (portfolio, date) is done" marker
        // that `portfolios_with_snapshot` uses to skip already-processed
        // pairs, so every other engine's output has to be durable first —
        // otherwise a crash between the snapshot and this loop would
        // permanently drop that date's accruals on the next run.
        for position in &positions {
            let since = position.entry_date;
            if let Some(accrual) = position_interest::calculate(position, date, since) {
                crate::db::position_interest_queries::upsert(&self.pool, &accrual).await?;
            }
        }

        let prior_snapshot = snapshot_queries::fetch_one(&self.pool, portfolio.id, date - chrono::Duration::days(1)).await?;
        let positions_snapshot: Vec<PositionMarketValue> = market_values_by_id.values().cloned().collect();
        let snapshot_row = snapshot::calculate(portfolio, date, &positions_snapshot, &totals, prior_snapshot.as_ref());
        snapshot_queries::upsert(&self.pool, &snapshot_row).await?;

        Ok(())
    }

    async fn resolve_portfolios(&self, scope: &BatchScope) -> Result<Vec<Portfolio>, AppError> {
        match scope {
            BatchScope::Portfolio { portfolio_id } => {
                match portfolio_queries::fetch_one(&self.pool, *portfolio_id).await? {
                    Some(p) => Ok(vec![p]),
                    None => Err(AppError::NotFound(format!("portfolio {} not found", portfolio_id))),
                }
            }
            BatchScope::Global { portfolio_ids } => match portfolio_ids {
                Some(ids) => portfolio_queries::fetch_many(&self.pool, ids).await.map_err(Into::into),
                None => portfolio_queries::fetch_all_active(&self.pool).await.map_err(Into::into),
            },
        }
    }

    async fn resolve_start(&self, scope: &BatchScope, portfolios: &[Portfolio]) -> Result<Option<NaiveDate>, AppError> {
        match scope {
            BatchScope::Portfolio { portfolio_id } => {
                watermark_service::earliest_position_date(&self.pool, *portfolio_id).await
            }
            BatchScope::Global { .. } => {
                match watermark_service::system_watermark(&self.pool).await? {
                    Some(watermark) => Ok(Some(watermark + chrono::Duration::days(1))),
                    None => {
                        let _ = portfolios;
                        watermark_service::earliest_position_date_global(&self.pool).await
                    }
                }
            }
        }
    }

    async fn factor_definitions(&self) -> Result<Vec<FactorDefinition>, AppError> {
        let defs = factor_queries::fetch_active_definitions(&self.pool).await?;
        if defs.is_empty() {
            Ok(FactorDefinition::canonical_seven())
        } else {
            Ok(defs)
        }
    }
}

fn lock_key_for(scope: &BatchScope) -> i64 {
    match scope {
        BatchScope::Global { .. } => ORCHESTRATOR_LOCK_KEY,
        BatchScope::Portfolio { portfolio_id } => {
            let bytes = portfolio_id.as_bytes();
            i64::from_le_bytes(bytes[0..8].try_into().unwrap())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_and_portfolio_scopes_use_different_lock_keys() {
        let global = BatchScope::Global { portfolio_ids: None };
        let portfolio = BatchScope::Portfolio { portfolio_id: Uuid::new_v4() };
        assert_ne!(lock_key_for(&global), lock_key_for(&portfolio));
    }
}
