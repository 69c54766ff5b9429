use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Static reference data for a symbol, persisted separately from the daily
/// Market Data Cache rows (§6 persisted-tables list). Populated opportunistically
/// by the provider chain and otherwise left null rather than re-fetched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyProfile {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
}
