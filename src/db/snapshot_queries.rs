use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PortfolioSnapshot;

pub async fn upsert(pool: &PgPool, snapshot: &PortfolioSnapshot) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO portfolio_snapshots
            (portfolio_id, snapshot_date, total_value, cash_balance, long_exposure,
             short_exposure, gross_exposure, net_exposure, daily_return, position_count)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (portfolio_id, snapshot_date) DO UPDATE SET
            total_value = EXCLUDED.total_value,
            cash_balance = EXCLUDED.cash_balance,
            long_exposure = EXCLUDED.long_exposure,
            short_exposure = EXCLUDED.short_exposure,
            gross_exposure = EXCLUDED.gross_exposure,
            net_exposure = EXCLUDED.net_exposure,
            daily_return = EXCLUDED.daily_return,
            position_count = EXCLUDED.position_count",
    )
    .bind(snapshot.portfolio_id)
    .bind(snapshot.snapshot_date)
    .bind(&snapshot.total_value)
    .bind(&snapshot.cash_balance)
    .bind(&snapshot.long_exposure)
    .bind(&snapshot.short_exposure)
    .bind(&snapshot.gross_exposure)
    .bind(&snapshot.net_exposure)
    .bind(snapshot.daily_return)
    .bind(snapshot.position_count)
    .execute(pool)
    .await?;
    Ok(())
}

/// The watermark service's core read (§4.F): the latest snapshot date on file
/// for one portfolio, or `None` if it has never been processed.
pub async fn fetch_max_date(pool: &PgPool, portfolio_id: Uuid) -> Result<Option<NaiveDate>, sqlx::Error> {
    let row: (Option<NaiveDate>,) = sqlx::query_as(
        "SELECT MAX(snapshot_date) FROM portfolio_snapshots WHERE portfolio_id = $1",
    )
    .bind(portfolio_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn fetch_max_dates(pool: &PgPool, portfolio_ids: &[Uuid]) -> Result<Vec<(Uuid, Option<NaiveDate>)>, sqlx::Error> {
    if portfolio_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as(
        "SELECT p.id, MAX(s.snapshot_date)
         FROM portfolios p
         LEFT JOIN portfolio_snapshots s ON s.portfolio_id = p.id
         WHERE p.id = ANY($1)
         GROUP BY p.id",
    )
    .bind(portfolio_ids)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(
    pool: &PgPool,
    portfolio_id: Uuid,
    snapshot_date: NaiveDate,
) -> Result<Option<PortfolioSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioSnapshot>(
        "SELECT portfolio_id, snapshot_date, total_value, cash_balance, long_exposure,
                short_exposure, gross_exposure, net_exposure, daily_return, position_count
         FROM portfolio_snapshots
         WHERE portfolio_id = $1 AND snapshot_date = $2",
    )
    .bind(portfolio_id)
    .bind(snapshot_date)
    .fetch_optional(pool)
    .await
}
