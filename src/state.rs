use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::batch_tracker::BatchTracker;
use crate::services::orchestrator::BatchOrchestrator;

/// Shared state handed to every route handler.
///
/// The teacher holds a bare `price_provider: Arc<dyn PriceProvider>` here
/// alongside the pool; this crate's read surface is thin enough (health,
/// admin, one analytics endpoint, batch control) that everything heavier —
/// the provider chain, rate limiters, failure cache — lives inside
/// `BatchOrchestrator` instead and is never reached from a handler directly.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub orchestrator: Arc<BatchOrchestrator>,
    pub batch_tracker: BatchTracker,
    pub config: Arc<Config>,
}
