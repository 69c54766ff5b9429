use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::StressTestResult;

pub async fn upsert_result(pool: &PgPool, result: &StressTestResult) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO stress_test_results
            (portfolio_id, scenario_id, calculation_date, scenario_name, direct_pnl, correlated_pnl, baseline_value, capped)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (portfolio_id, scenario_id, calculation_date) DO UPDATE SET
            direct_pnl = EXCLUDED.direct_pnl,
            correlated_pnl = EXCLUDED.correlated_pnl,
            baseline_value = EXCLUDED.baseline_value,
            capped = EXCLUDED.capped",
    )
    .bind(result.portfolio_id)
    .bind(result.scenario_id)
    .bind(result.calculation_date)
    .bind(&result.scenario_name)
    .bind(result.direct_pnl)
    .bind(result.correlated_pnl)
    .bind(result.baseline_value)
    .bind(result.capped)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_for_date(
    pool: &PgPool,
    portfolio_id: Uuid,
    calculation_date: NaiveDate,
) -> Result<Vec<StressTestResult>, sqlx::Error> {
    sqlx::query_as::<_, StressTestResult>(
        "SELECT portfolio_id, scenario_id, calculation_date, scenario_name, direct_pnl, correlated_pnl, baseline_value, capped
         FROM stress_test_results
         WHERE portfolio_id = $1 AND calculation_date = $2
         ORDER BY scenario_name ASC",
    )
    .bind(portfolio_id)
    .bind(calculation_date)
    .fetch_all(pool)
    .await
}
