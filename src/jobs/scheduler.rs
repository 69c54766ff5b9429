use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::BatchSource;
use crate::services::orchestrator::BatchOrchestrator;

/// Wires the cron invocation surface (§4.G.1/§6) onto `tokio-cron-scheduler`,
/// the same crate the teacher uses for its nightly job fleet. Unlike the
/// teacher's scheduler, which registers a dozen independent jobs, this one
/// owns a single recurring job: the daily batch with backfill.
pub struct BatchScheduler {
    scheduler: JobScheduler,
}

impl BatchScheduler {
    pub async fn new(orchestrator: Arc<BatchOrchestrator>, cron_expr: &str) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::External(format!("failed to create job scheduler: {}", e)))?;

        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                run_cron_batch(&orchestrator).await;
            })
        })
        .map_err(|e| AppError::External(format!("failed to create daily batch job: {}", e)))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| AppError::External(format!("failed to register daily batch job: {}", e)))?;

        Ok(Self { scheduler })
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::External(format!("failed to start job scheduler: {}", e)))
    }

    #[allow(dead_code)]
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::External(format!("failed to stop job scheduler: {}", e)))
    }
}

/// The cron-triggered entry point (§4.G.1): global scope, no date override
/// (watermark-driven), no forced re-run. A failure here is logged, not
/// propagated — `BatchRunHistory` already carries the terminal failure state
/// for later inspection, and a cron tick has no caller to return an error to.
async fn run_cron_batch(orchestrator: &BatchOrchestrator) {
    info!("cron-triggered daily batch starting");
    match orchestrator
        .run_daily_batch_with_backfill(None, None, None, BatchSource::Cron, false)
        .await
    {
        Ok(history) => info!(
            batch_run_id = %history.batch_run_id,
            successful = history.successful,
            failed = history.failed,
            "cron-triggered daily batch finished"
        ),
        Err(e) => error!(error = %e, "cron-triggered daily batch failed"),
    }
}
