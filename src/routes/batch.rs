use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::batch_queries;
use crate::errors::AppError;
use crate::models::{BatchRunHistory, BatchSource};
use crate::services::batch_tracker::BatchProgress;
use crate::state::AppState;

/// The invocation surfaces named in §4.G.1/§6: onboarding and settings both
/// trigger a scoped backfill for one portfolio, admin triggers (or
/// re-triggers) a global run, and cron is wired separately through
/// `src/jobs/scheduler.rs` rather than over HTTP.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/onboard/:portfolio_id", post(onboard_portfolio))
        .route("/settings/:portfolio_id", post(settings_backfill))
        .route("/admin/run", post(admin_run))
        .route("/:batch_run_id", get(batch_status))
}

async fn onboard_portfolio(
    Path(portfolio_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BatchRunHistory>, AppError> {
    let history = state
        .orchestrator
        .run_portfolio_onboarding_backfill(portfolio_id, BatchSource::Onboarding)
        .await?;
    Ok(Json(history))
}

async fn settings_backfill(
    Path(portfolio_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BatchRunHistory>, AppError> {
    let history = state
        .orchestrator
        .run_portfolio_onboarding_backfill(portfolio_id, BatchSource::Settings)
        .await?;
    Ok(Json(history))
}

#[derive(Debug, Deserialize, Default)]
pub struct AdminRunRequest {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub portfolio_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub force: bool,
}

async fn admin_run(
    State(state): State<AppState>,
    Json(request): Json<AdminRunRequest>,
) -> Result<Json<BatchRunHistory>, AppError> {
    let history = state
        .orchestrator
        .run_daily_batch_with_backfill(
            request.start,
            request.end,
            request.portfolio_ids,
            BatchSource::Admin,
            request.force,
        )
        .await?;
    Ok(Json(history))
}

/// Prefers the in-memory tracker (sub-second freshness) and falls back to
/// the persistent history when the tracker has no entry — a restarted
/// process, or a run triggered before this process started.
async fn batch_status(
    Path(batch_run_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BatchProgress>, AppError> {
    if let Some(progress) = state.batch_tracker.get(batch_run_id) {
        return Ok(Json(progress));
    }

    let history = batch_queries::fetch_one(&state.pool, batch_run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("batch run {} not found", batch_run_id)))?;

    Ok(Json(BatchProgress {
        batch_run_id: history.batch_run_id,
        status: history.status,
        scope_description: "unknown (tracker entry expired or process restarted)".to_string(),
        portfolios_done: history.successful + history.failed,
        portfolios_total: history.total_jobs,
        updated_at: history.completed_at.unwrap_or(history.started_at),
    }))
}
