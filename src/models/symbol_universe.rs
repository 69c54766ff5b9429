use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A symbol the system has committed to tracking (§3). Inserted by the
/// Universe Resolver the first time a symbol is referenced; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SymbolUniverseEntry {
    pub symbol: String,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Capacity ≥ 50 chars per §3/§9 — never truncate silently.
    pub country: Option<String>,
}
