use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
    Cron,
    Onboarding,
    Admin,
    Settings,
}

/// Lifecycle record for one batch invocation (§3/§4.G/§4.H). Created with
/// `status = Running` and guaranteed to reach a terminal state in the
/// orchestrator's `finally`-equivalent — never left `running` on crash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BatchRunHistory {
    pub batch_run_id: Uuid,
    pub status: BatchStatus,
    pub triggered_by: Option<String>,
    pub source: BatchSource,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_jobs: i32,
    pub successful: i32,
    pub failed: i32,
    pub error_summary: Option<String>,
}

impl BatchRunHistory {
    pub fn start(source: BatchSource, triggered_by: Option<String>) -> Self {
        Self {
            batch_run_id: Uuid::new_v4(),
            status: BatchStatus::Running,
            triggered_by,
            source,
            started_at: Utc::now(),
            completed_at: None,
            total_jobs: 0,
            successful: 0,
            failed: 0,
            error_summary: None,
        }
    }
}

/// Scope of a single orchestrator invocation (§4.C/§4.G).
#[derive(Debug, Clone)]
pub enum BatchScope {
    /// Global daily-with-backfill mode: all active portfolios, optionally
    /// restricted to an explicit id list (admin mode).
    Global { portfolio_ids: Option<Vec<Uuid>> },
    /// Scoped single-portfolio onboarding/settings backfill.
    Portfolio { portfolio_id: Uuid },
}

#[derive(Debug, Clone)]
pub struct BatchRunRequest {
    pub scope: BatchScope,
    pub source: BatchSource,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub force: bool,
}
