use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::SymbolUniverseEntry;

pub async fn fetch_one(pool: &PgPool, symbol: &str) -> Result<Option<SymbolUniverseEntry>, sqlx::Error> {
    sqlx::query_as::<_, SymbolUniverseEntry>(
        "SELECT symbol, earliest_date, latest_date, sector, industry, country
         FROM symbol_universe
         WHERE symbol = $1",
    )
    .bind(symbol)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_many(pool: &PgPool, symbols: &[String]) -> Result<Vec<SymbolUniverseEntry>, sqlx::Error> {
    if symbols.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, SymbolUniverseEntry>(
        "SELECT symbol, earliest_date, latest_date, sector, industry, country
         FROM symbol_universe
         WHERE symbol = ANY($1)",
    )
    .bind(symbols)
    .fetch_all(pool)
    .await
}

/// First-seen insert: a symbol newly referenced by a Position or factor ETF
/// (§3/§4.C). Idempotent — a second resolution of the same symbol is a no-op.
pub async fn insert_if_absent(pool: &PgPool, symbol: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO symbol_universe (symbol)
         VALUES ($1)
         ON CONFLICT (symbol) DO NOTHING",
    )
    .bind(symbol)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn widen_coverage(
    pool: &PgPool,
    symbol: &str,
    earliest_date: NaiveDate,
    latest_date: NaiveDate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE symbol_universe
         SET earliest_date = LEAST(COALESCE(earliest_date, $2), $2),
             latest_date = GREATEST(COALESCE(latest_date, $3), $3)
         WHERE symbol = $1",
    )
    .bind(symbol)
    .bind(earliest_date)
    .bind(latest_date)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_profile(
    pool: &PgPool,
    symbol: &str,
    sector: Option<&str>,
    industry: Option<&str>,
    country: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE symbol_universe
         SET sector = COALESCE($2, sector),
             industry = COALESCE($3, industry),
             country = COALESCE($4, country)
         WHERE symbol = $1",
    )
    .bind(symbol)
    .bind(sector)
    .bind(industry)
    .bind(country)
    .execute(pool)
    .await?;
    Ok(())
}
