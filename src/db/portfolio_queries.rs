use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Portfolio;

pub async fn fetch_all_active(pool: &PgPool) -> Result<Vec<Portfolio>, sqlx::Error> {
    sqlx::query_as::<_, Portfolio>(
        "SELECT id, user_id, account_name, account_type, equity_balance, created_at
         FROM portfolios
         ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<Portfolio>, sqlx::Error> {
    sqlx::query_as::<_, Portfolio>(
        "SELECT id, user_id, account_name, account_type, equity_balance, created_at
         FROM portfolios
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Portfolio>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, Portfolio>(
        "SELECT id, user_id, account_name, account_type, equity_balance, created_at
         FROM portfolios
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn insert(pool: &PgPool, portfolio: &Portfolio) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO portfolios (id, user_id, account_name, account_type, equity_balance, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(portfolio.id)
    .bind(portfolio.user_id)
    .bind(&portfolio.account_name)
    .bind(portfolio.account_type)
    .bind(&portfolio.equity_balance)
    .bind(portfolio.created_at)
    .execute(pool)
    .await?;
    Ok(())
}
