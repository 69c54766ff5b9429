use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{portfolio_queries, position_queries, snapshot_queries};
use crate::errors::AppError;

/// `min over portfolios of max(snapshot_date)` (§4.F). Replaces the incorrect
/// global `MAX(snapshot_date)`, which let one fast portfolio mask silent
/// under-processing of a lagging one.
pub async fn system_watermark(pool: &PgPool) -> Result<Option<NaiveDate>, AppError> {
    let portfolios = portfolio_queries::fetch_all_active(pool).await?;
    if portfolios.is_empty() {
        return Ok(None);
    }

    let ids: Vec<Uuid> = portfolios.iter().map(|p| p.id).collect();
    let max_dates = snapshot_queries::fetch_max_dates(pool, &ids).await?;

    // A portfolio with no snapshot at all has an effective max of "never
    // caught up" — it must not be excluded from the minimum.
    if max_dates.iter().any(|(_, date)| date.is_none()) {
        return Ok(None);
    }

    Ok(max_dates.into_iter().filter_map(|(_, date)| date).min())
}

pub async fn portfolios_with_snapshot(pool: &PgPool, date: NaiveDate) -> Result<HashSet<Uuid>, AppError> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT portfolio_id FROM portfolio_snapshots WHERE snapshot_date = $1",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn active_portfolios(pool: &PgPool) -> Result<Vec<Uuid>, AppError> {
    Ok(portfolio_queries::fetch_all_active(pool)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect())
}

/// Cold-start fallback: earliest `entry_date` across a portfolio's positions,
/// used when the system has never produced a snapshot (§4.F).
pub async fn earliest_position_date(pool: &PgPool, portfolio_id: Uuid) -> Result<Option<NaiveDate>, AppError> {
    let today = chrono::Utc::now().date_naive();
    let positions = position_queries::fetch_active(pool, portfolio_id, today).await?;
    Ok(positions.into_iter().map(|p| p.entry_date).min())
}

pub async fn earliest_position_date_global(pool: &PgPool) -> Result<Option<NaiveDate>, AppError> {
    let portfolios = active_portfolios(pool).await?;
    let mut earliest = None;
    for portfolio_id in portfolios {
        if let Some(date) = earliest_position_date(pool, portfolio_id).await? {
            earliest = Some(match earliest {
                Some(current) if current <= date => current,
                _ => date,
            });
        }
    }
    Ok(earliest)
}
