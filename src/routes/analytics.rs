use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::factor_queries;
use crate::errors::AppError;
use crate::models::{AnalyticsResponse, DataQuality, FactorExposure};
use crate::state::AppState;

/// One representative read endpoint (§6), demonstrating the
/// `available/data/data_quality` envelope every analytics endpoint shares.
/// The batch core itself serves no interactive queries (§1 Non-goals); this
/// exists only to give `AnalyticsResponse<T>` a concrete caller.
pub fn router() -> Router<AppState> {
    Router::new().route("/:portfolio_id/factors", get(get_factor_exposures))
}

#[derive(Debug, Deserialize)]
struct FactorExposureQuery {
    date: NaiveDate,
}

async fn get_factor_exposures(
    Path(portfolio_id): Path<Uuid>,
    Query(params): Query<FactorExposureQuery>,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse<Vec<FactorExposure>>>, AppError> {
    let exposures = factor_queries::fetch_portfolio_exposures(&state.pool, portfolio_id, params.date).await?;

    if exposures.is_empty() {
        return Ok(Json(AnalyticsResponse::skipped(DataQuality::no_factor_exposures())));
    }
    Ok(Json(AnalyticsResponse::found(exposures, None)))
}
