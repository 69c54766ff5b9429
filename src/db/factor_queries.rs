use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{FactorDefinition, FactorExposure, PositionFactorExposure, SymbolFactorExposure};

pub async fn fetch_active_definitions(pool: &PgPool) -> Result<Vec<FactorDefinition>, sqlx::Error> {
    sqlx::query_as::<_, FactorDefinition>(
        "SELECT id, name, etf_symbol, is_active
         FROM factor_definitions
         WHERE is_active = true
         ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn upsert_symbol_exposure(pool: &PgPool, exposure: &SymbolFactorExposure) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO symbol_factor_exposures
            (symbol, calculation_date, factor_id, beta, data_days, insufficient_history)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (symbol, calculation_date, factor_id) DO UPDATE SET
            beta = EXCLUDED.beta,
            data_days = EXCLUDED.data_days,
            insufficient_history = EXCLUDED.insufficient_history",
    )
    .bind(&exposure.symbol)
    .bind(exposure.calculation_date)
    .bind(exposure.factor_id)
    .bind(exposure.beta)
    .bind(exposure.data_days)
    .bind(exposure.insufficient_history)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_symbol_exposures(
    pool: &PgPool,
    symbol: &str,
    calculation_date: NaiveDate,
) -> Result<Vec<SymbolFactorExposure>, sqlx::Error> {
    sqlx::query_as::<_, SymbolFactorExposure>(
        "SELECT symbol, calculation_date, factor_id, beta, data_days, insufficient_history
         FROM symbol_factor_exposures
         WHERE symbol = $1 AND calculation_date = $2",
    )
    .bind(symbol)
    .bind(calculation_date)
    .fetch_all(pool)
    .await
}

pub async fn upsert_portfolio_exposure(pool: &PgPool, exposure: &FactorExposure) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO factor_exposures
            (portfolio_id, calculation_date, factor_id, exposure_value, exposure_dollar)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (portfolio_id, calculation_date, factor_id) DO UPDATE SET
            exposure_value = EXCLUDED.exposure_value,
            exposure_dollar = EXCLUDED.exposure_dollar",
    )
    .bind(exposure.portfolio_id)
    .bind(exposure.calculation_date)
    .bind(exposure.factor_id)
    .bind(exposure.exposure_value)
    .bind(&exposure.exposure_dollar)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_portfolio_exposures(
    pool: &PgPool,
    portfolio_id: Uuid,
    calculation_date: NaiveDate,
) -> Result<Vec<FactorExposure>, sqlx::Error> {
    sqlx::query_as::<_, FactorExposure>(
        "SELECT portfolio_id, calculation_date, factor_id, exposure_value, exposure_dollar
         FROM factor_exposures
         WHERE portfolio_id = $1 AND calculation_date = $2",
    )
    .bind(portfolio_id)
    .bind(calculation_date)
    .fetch_all(pool)
    .await
}

pub async fn upsert_position_exposure(pool: &PgPool, exposure: &PositionFactorExposure) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO position_factor_exposures (position_id, calculation_date, factor_id, beta)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (position_id, calculation_date, factor_id) DO UPDATE SET
            beta = EXCLUDED.beta",
    )
    .bind(exposure.position_id)
    .bind(exposure.calculation_date)
    .bind(exposure.factor_id)
    .bind(exposure.beta)
    .execute(pool)
    .await?;
    Ok(())
}
