use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::state::AppState;

/// Operator-only reset for demo/test portfolios (§1 Non-goals permits
/// mutating seeded demo data). Never exposed without the caller already
/// having deployment-level access — there is no auth layer in front of this,
/// matching the teacher's own `admin.rs`.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/reset-all-data", post(reset_all_data))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
    pub tables_cleared: Vec<String>,
}

pub async fn reset_all_data(State(state): State<AppState>) -> Result<Json<ResetResponse>, AppError> {
    info!("POST /admin/reset-all-data - Resetting all data");

    // Ordered so that rows referencing positions/portfolios are cleared
    // before the tables they reference.
    let tables = vec![
        "position_interest_accruals",
        "stress_test_results",
        "pairwise_correlations",
        "correlation_calculations",
        "position_factor_exposures",
        "factor_exposures",
        "portfolio_snapshots",
        "symbol_factor_exposures",
        "positions",
        "portfolios",
        "batch_run_history",
        "symbol_universe",
        "company_profiles",
        "market_data_cache",
    ];

    for table in &tables {
        let query = format!("DELETE FROM {}", table);
        match sqlx::query(&query).execute(&state.pool).await {
            Ok(result) => {
                info!("Deleted {} rows from {}", result.rows_affected(), table);
            }
            Err(e) => {
                error!("Failed to delete from {}: {}", table, e);
                return Err(AppError::Db(e));
            }
        }
    }

    info!("Successfully reset all data");

    Ok(Json(ResetResponse {
        message: "All data has been successfully deleted".to_string(),
        tables_cleared: tables.iter().map(|s| s.to_string()).collect(),
    }))
}
