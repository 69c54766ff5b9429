use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CorrelationCalculation, PairwiseCorrelation};

pub async fn insert_calculation(pool: &PgPool, calculation: &CorrelationCalculation) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO correlation_calculations
            (id, portfolio_id, calculation_date, duration_days, average_correlation)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (portfolio_id, calculation_date, duration_days) DO UPDATE SET
            average_correlation = EXCLUDED.average_correlation",
    )
    .bind(calculation.id)
    .bind(calculation.portfolio_id)
    .bind(calculation.calculation_date)
    .bind(calculation.duration_days)
    .bind(calculation.average_correlation)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_pairwise(pool: &PgPool, calculation_id: Uuid, pairs: &[PairwiseCorrelation]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for pair in pairs {
        sqlx::query(
            "INSERT INTO pairwise_correlations (correlation_id, calculation_id, symbol_a, symbol_b, correlation)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (calculation_id, symbol_a, symbol_b) DO UPDATE SET
                correlation = EXCLUDED.correlation",
        )
        .bind(pair.correlation_id)
        .bind(calculation_id)
        .bind(&pair.symbol_a)
        .bind(&pair.symbol_b)
        .bind(pair.correlation)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn fetch_latest(
    pool: &PgPool,
    portfolio_id: Uuid,
    duration_days: i32,
) -> Result<Option<CorrelationCalculation>, sqlx::Error> {
    sqlx::query_as::<_, CorrelationCalculation>(
        "SELECT id, portfolio_id, calculation_date, duration_days, average_correlation
         FROM correlation_calculations
         WHERE portfolio_id = $1 AND duration_days = $2
         ORDER BY calculation_date DESC
         LIMIT 1",
    )
    .bind(portfolio_id)
    .bind(duration_days)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_pairwise(pool: &PgPool, calculation_id: Uuid) -> Result<Vec<PairwiseCorrelation>, sqlx::Error> {
    sqlx::query_as::<_, PairwiseCorrelation>(
        "SELECT correlation_id, symbol_a, symbol_b, correlation
         FROM pairwise_correlations
         WHERE calculation_id = $1",
    )
    .bind(calculation_id)
    .fetch_all(pool)
    .await
}
