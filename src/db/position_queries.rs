use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Position;

/// All positions held by a portfolio that are active (not closed before the
/// given date) — the universe each engine iterates over (§4.E.*).
pub async fn fetch_active(
    pool: &PgPool,
    portfolio_id: Uuid,
    as_of: NaiveDate,
) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        "SELECT id, portfolio_id, symbol, quantity, entry_price, entry_date,
                investment_class, investment_subtype, underlying_symbol,
                strike_price, expiration_date, option_type, exit_date,
                exit_price, created_at
         FROM positions
         WHERE portfolio_id = $1
           AND entry_date <= $2
           AND (exit_date IS NULL OR exit_date > $2)
         ORDER BY entry_date ASC",
    )
    .bind(portfolio_id)
    .bind(as_of)
    .fetch_all(pool)
    .await
}

pub async fn fetch_distinct_symbols(pool: &PgPool, portfolio_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT symbol FROM positions WHERE portfolio_id = $1",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(s,)| s).collect())
}

pub async fn insert(pool: &PgPool, position: &Position) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO positions
            (id, portfolio_id, symbol, quantity, entry_price, entry_date,
             investment_class, investment_subtype, underlying_symbol,
             strike_price, expiration_date, option_type, exit_date,
             exit_price, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(position.id)
    .bind(position.portfolio_id)
    .bind(&position.symbol)
    .bind(&position.quantity)
    .bind(&position.entry_price)
    .bind(position.entry_date)
    .bind(position.investment_class)
    .bind(&position.investment_subtype)
    .bind(&position.underlying_symbol)
    .bind(&position.strike_price)
    .bind(position.expiration_date)
    .bind(position.option_type)
    .bind(position.exit_date)
    .bind(&position.exit_price)
    .bind(position.created_at)
    .execute(pool)
    .await?;
    Ok(())
}