use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PositionInterestAccrual;

pub async fn upsert(pool: &PgPool, accrual: &PositionInterestAccrual) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO position_interest_accruals
            (position_id, calculation_date, days_accrued, annual_rate, accrued_interest)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (position_id, calculation_date) DO UPDATE SET
            days_accrued = EXCLUDED.days_accrued,
            annual_rate = EXCLUDED.annual_rate,
            accrued_interest = EXCLUDED.accrued_interest",
    )
    .bind(accrual.position_id)
    .bind(accrual.calculation_date)
    .bind(accrual.days_accrued)
    .bind(accrual.annual_rate)
    .bind(&accrual.accrued_interest)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_one(
    pool: &PgPool,
    position_id: Uuid,
    calculation_date: NaiveDate,
) -> Result<Option<PositionInterestAccrual>, sqlx::Error> {
    sqlx::query_as::<_, PositionInterestAccrual>(
        "SELECT position_id, calculation_date, days_accrued, annual_rate, accrued_interest
         FROM position_interest_accruals
         WHERE position_id = $1 AND calculation_date = $2",
    )
    .bind(position_id)
    .bind(calculation_date)
    .fetch_optional(pool)
    .await
}
