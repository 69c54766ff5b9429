use axum::extract::State;
use axum::{Json, Router};
use axum::routing::get;
use serde::Serialize;
use tracing::{info, warn};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    info!("GET /health - Health check");
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "health check: database ping failed");
            "unreachable"
        }
    };
    Json(HealthResponse { status: "ok", database })
}