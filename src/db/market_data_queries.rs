use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::MarketDataRow;

/// Idempotent upsert into the Market Data Cache (§4.D). A later provider
/// write for the same (symbol, date) overwrites the earlier one — the cache
/// trusts whichever provider filled the row most recently, not priority order.
pub async fn upsert(pool: &PgPool, row: &MarketDataRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO market_data_cache
            (symbol, date, open, high, low, close, adjusted_close, volume, source_provider, ingested_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (symbol, date) DO UPDATE SET
            open = EXCLUDED.open,
            high = EXCLUDED.high,
            low = EXCLUDED.low,
            close = EXCLUDED.close,
            adjusted_close = EXCLUDED.adjusted_close,
            volume = EXCLUDED.volume,
            source_provider = EXCLUDED.source_provider,
            ingested_at = EXCLUDED.ingested_at",
    )
    .bind(&row.symbol)
    .bind(row.date)
    .bind(&row.open)
    .bind(&row.high)
    .bind(&row.low)
    .bind(&row.close)
    .bind(&row.adjusted_close)
    .bind(row.volume)
    .bind(&row.source_provider)
    .bind(row.ingested_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn upsert_many(pool: &PgPool, rows: &[MarketDataRow]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for row in rows {
        sqlx::query(
            "INSERT INTO market_data_cache
                (symbol, date, open, high, low, close, adjusted_close, volume, source_provider, ingested_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (symbol, date) DO UPDATE SET
                open = EXCLUDED.open,
                high = EXCLUDED.high,
                low = EXCLUDED.low,
                close = EXCLUDED.close,
                adjusted_close = EXCLUDED.adjusted_close,
                volume = EXCLUDED.volume,
                source_provider = EXCLUDED.source_provider,
                ingested_at = EXCLUDED.ingested_at",
        )
        .bind(&row.symbol)
        .bind(row.date)
        .bind(&row.open)
        .bind(&row.high)
        .bind(&row.low)
        .bind(&row.close)
        .bind(&row.adjusted_close)
        .bind(row.volume)
        .bind(&row.source_provider)
        .bind(row.ingested_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn fetch_range(
    pool: &PgPool,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<MarketDataRow>, sqlx::Error> {
    sqlx::query_as::<_, MarketDataRow>(
        "SELECT symbol, date, open, high, low, close, adjusted_close, volume, source_provider, ingested_at
         FROM market_data_cache
         WHERE symbol = $1 AND date BETWEEN $2 AND $3
         ORDER BY date ASC",
    )
    .bind(symbol)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn fetch_missing_dates(
    pool: &PgPool,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, sqlx::Error> {
    let rows: Vec<(NaiveDate,)> = sqlx::query_as(
        "SELECT d::date
         FROM generate_series($2::date, $3::date, interval '1 day') AS d
         WHERE NOT EXISTS (
             SELECT 1 FROM market_data_cache m WHERE m.symbol = $1 AND m.date = d::date
         )",
    )
    .bind(symbol)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}
