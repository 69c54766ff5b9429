use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{FactorDefinition, SymbolFactorExposure};
use crate::services::{market_data_cache, stats};

/// Default and minimum lookback windows (§4.E.3): 252 trading days (one
/// year) preferred, 60 the floor below which a beta is still computed but
/// flagged `insufficient_history` rather than withheld.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 252;
pub const MINIMUM_LOOKBACK_DAYS: i64 = 60;

/// Phase 1.5 (§4.E.3): regress each universe symbol's daily returns against
/// every active factor ETF's returns over the lookback ending at
/// `calculation_date`. Runs once per run, ahead of the per-portfolio cohort,
/// since betas are symbol-level, not portfolio-level.
pub async fn calculate(
    pool: &PgPool,
    symbols: &[String],
    factors: &[FactorDefinition],
    calculation_date: NaiveDate,
) -> Result<Vec<SymbolFactorExposure>, AppError> {
    let start = calculation_date - chrono::Duration::days(DEFAULT_LOOKBACK_DAYS * 7 / 5 + 14);

    let mut factor_returns: HashMap<Uuid, Vec<(NaiveDate, f64)>> = HashMap::new();
    for factor in factors {
        let series = market_data_cache::close_series(pool, &factor.etf_symbol, start, calculation_date).await?;
        factor_returns.insert(factor.id, to_sorted_returns(series));
    }

    let mut results = Vec::new();
    for symbol in symbols {
        let series = market_data_cache::close_series(pool, symbol, start, calculation_date).await?;
        let symbol_returns = to_sorted_returns(series);

        for factor in factors {
            let returns = factor_returns.get(&factor.id).cloned().unwrap_or_default();
            let aligned = align(&symbol_returns, &returns);
            let data_days = aligned.len() as i32;
            let insufficient_history = (data_days as i64) < MINIMUM_LOOKBACK_DAYS;

            let beta = if aligned.is_empty() {
                0.0
            } else {
                let (xs, ys): (Vec<f64>, Vec<f64>) = aligned.into_iter().unzip();
                stats::ols_beta(&xs, &ys).unwrap_or(0.0)
            };

            results.push(SymbolFactorExposure {
                symbol: symbol.clone(),
                calculation_date,
                factor_id: factor.id,
                beta,
                data_days,
                insufficient_history,
            });
        }
    }

    Ok(results)
}

fn to_sorted_returns(series: HashMap<NaiveDate, bigdecimal::BigDecimal>) -> Vec<(NaiveDate, f64)> {
    let mut dated: Vec<(NaiveDate, f64)> = series
        .into_iter()
        .filter_map(|(date, price)| price.to_string().parse::<f64>().ok().map(|p| (date, p)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let mut returns = Vec::new();
    for window in dated.windows(2) {
        let (prev_date, prev) = window[0];
        let (date, price) = window[1];
        let _ = prev_date;
        if prev != 0.0 {
            returns.push((date, price / prev - 1.0));
        }
    }
    returns
}

/// Inner-join two (date, return) series on date, preserving chronological
/// order, so the regression never pairs a factor return with the wrong day's
/// symbol return.
fn align(a: &[(NaiveDate, f64)], b: &[(NaiveDate, f64)]) -> Vec<(f64, f64)> {
    let b_by_date: HashMap<NaiveDate, f64> = b.iter().cloned().collect();
    a.iter()
        .filter_map(|(date, value)| b_by_date.get(date).map(|other| (*value, *other)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn series(prices: &[(i32, i32, i32, f64)]) -> HashMap<NaiveDate, BigDecimal> {
        prices
            .iter()
            .map(|(y, m, d, p)| {
                (
                    NaiveDate::from_ymd_opt(*y, *m as u32, *d as u32).unwrap(),
                    BigDecimal::try_from(*p).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn returns_are_empty_for_single_observation_series() {
        let s = series(&[(2026, 1, 2, 100.0)]);
        assert!(to_sorted_returns(s).is_empty());
    }

    #[test]
    fn align_keeps_only_shared_dates() {
        let a = vec![
            (NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(), 0.01),
            (NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(), 0.02),
        ];
        let b = vec![(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(), 0.015)];
        let aligned = align(&a, &b);
        assert_eq!(aligned, vec![(0.02, 0.015)]);
    }
}
