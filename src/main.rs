mod app;
mod config;
mod db;
mod errors;
mod external;
mod jobs;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use config::Config;
use external::fmp::FmpProvider;
use external::polygon::PolygonProvider;
use external::price_provider::MarketDataProvider;
use external::provider_chain::ProviderChain;
use external::yahoo_query::YahooQueryProvider;
use external::yfinance::YFinanceProvider;
use jobs::scheduler::BatchScheduler;
use logging::LoggingConfig;
use services::batch_tracker::BatchTracker;
use services::failure_cache::FailureCache;
use services::orchestrator::BatchOrchestrator;
use services::rate_limiter::RateLimiter;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    logging::init_logging(LoggingConfig::from_env())?;

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.database_url)
        .await?;

    // Priority order per §4.B: free, key-less sources first, paid/keyed
    // sources as fallback. FMP and Polygon are only registered when their
    // API key is configured.
    let mut providers: Vec<(Arc<dyn MarketDataProvider>, Arc<RateLimiter>)> = vec![
        (Arc::new(YahooQueryProvider::new()), Arc::new(RateLimiter::new(3, 60))),
        (Arc::new(YFinanceProvider::new()), Arc::new(RateLimiter::new(3, 60))),
    ];
    if let Some(key) = &config.provider_api_keys.fmp {
        providers.push((Arc::new(FmpProvider::new(key.clone())), Arc::new(RateLimiter::new(3, 250))));
    }
    if let Some(key) = &config.provider_api_keys.polygon {
        providers.push((Arc::new(PolygonProvider::new(key.clone())), Arc::new(RateLimiter::new(3, 5))));
    }

    let chain = ProviderChain::new(providers, FailureCache::new());
    let tracker = BatchTracker::new();
    let orchestrator = Arc::new(BatchOrchestrator::new(pool.clone(), chain, config.clone(), tracker.clone()));

    let state = AppState {
        pool,
        orchestrator: orchestrator.clone(),
        batch_tracker: tracker,
        config: Arc::new(config),
    };

    let cron_expr = std::env::var("BATCH_CRON").unwrap_or_else(|_| "0 0 21 * * *".to_string());
    let scheduler = BatchScheduler::new(orchestrator, &cron_expr).await?;
    scheduler.start().await?;

    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("batch core running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
