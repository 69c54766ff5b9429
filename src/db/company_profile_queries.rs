use sqlx::PgPool;

use crate::models::CompanyProfile;

pub async fn upsert(pool: &PgPool, profile: &CompanyProfile) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO company_profiles (symbol, company_name, sector, industry, country, exchange)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (symbol) DO UPDATE SET
            company_name = COALESCE(EXCLUDED.company_name, company_profiles.company_name),
            sector = COALESCE(EXCLUDED.sector, company_profiles.sector),
            industry = COALESCE(EXCLUDED.industry, company_profiles.industry),
            country = COALESCE(EXCLUDED.country, company_profiles.country),
            exchange = COALESCE(EXCLUDED.exchange, company_profiles.exchange)",
    )
    .bind(&profile.symbol)
    .bind(&profile.company_name)
    .bind(&profile.sector)
    .bind(&profile.industry)
    .bind(&profile.country)
    .bind(&profile.exchange)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_one(pool: &PgPool, symbol: &str) -> Result<Option<CompanyProfile>, sqlx::Error> {
    sqlx::query_as::<_, CompanyProfile>(
        "SELECT symbol, company_name, sector, industry, country, exchange
         FROM company_profiles
         WHERE symbol = $1",
    )
    .bind(symbol)
    .fetch_optional(pool)
    .await
}
