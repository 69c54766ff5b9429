use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BatchScope, BatchStatus};

/// Sub-second progress polling for the UI (§4.H). This is explicitly
/// non-authoritative: `BatchRunHistory` in Postgres is the system of record;
/// a process restart silently drops everything here and the UI falls back to
/// polling the persistent history until the tracker repopulates.
#[derive(Clone)]
pub struct BatchTracker {
    runs: Arc<DashMap<Uuid, BatchProgress>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    pub batch_run_id: Uuid,
    pub status: BatchStatus,
    pub scope_description: String,
    pub portfolios_done: i32,
    pub portfolios_total: i32,
    pub updated_at: DateTime<Utc>,
}

impl BatchTracker {
    pub fn new() -> Self {
        Self { runs: Arc::new(DashMap::new()) }
    }

    pub fn record_running(&self, batch_run_id: Uuid, scope: &BatchScope) {
        self.runs.insert(
            batch_run_id,
            BatchProgress {
                batch_run_id,
                status: BatchStatus::Running,
                scope_description: describe(scope),
                portfolios_done: 0,
                portfolios_total: 0,
                updated_at: Utc::now(),
            },
        );
    }

    pub fn record_progress(&self, batch_run_id: Uuid, done: i32, total: i32) {
        if let Some(mut entry) = self.runs.get_mut(&batch_run_id) {
            entry.portfolios_done = done;
            entry.portfolios_total = total;
            entry.updated_at = Utc::now();
        }
    }

    pub fn record_terminal(&self, batch_run_id: Uuid, status: BatchStatus) {
        if let Some(mut entry) = self.runs.get_mut(&batch_run_id) {
            entry.status = status;
            entry.updated_at = Utc::now();
        }
    }

    pub fn get(&self, batch_run_id: Uuid) -> Option<BatchProgress> {
        self.runs.get(&batch_run_id).map(|entry| entry.clone())
    }

    /// Drop entries for runs that finished more than an hour ago, so the map
    /// doesn't grow unbounded across a long-lived process.
    pub fn sweep(&self) {
        let cutoff = Utc::now() - chrono::Duration::hours(1);
        self.runs.retain(|_, progress| {
            matches!(progress.status, BatchStatus::Running) || progress.updated_at > cutoff
        });
    }
}

impl Default for BatchTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(scope: &BatchScope) -> String {
    match scope {
        BatchScope::Global { portfolio_ids: None } => "global".to_string(),
        BatchScope::Global { portfolio_ids: Some(ids) } => format!("global ({} portfolios)", ids.len()),
        BatchScope::Portfolio { portfolio_id } => format!("portfolio {}", portfolio_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_updates_are_visible_immediately() {
        let tracker = BatchTracker::new();
        let run_id = Uuid::new_v4();
        let scope = BatchScope::Global { portfolio_ids: None };
        tracker.record_running(run_id, &scope);
        tracker.record_progress(run_id, 3, 10);

        let progress = tracker.get(run_id).unwrap();
        assert_eq!(progress.portfolios_done, 3);
        assert_eq!(progress.portfolios_total, 10);
        assert_eq!(progress.status, BatchStatus::Running);
    }

    #[test]
    fn terminal_runs_survive_sweep_within_the_hour() {
        let tracker = BatchTracker::new();
        let run_id = Uuid::new_v4();
        let scope = BatchScope::Portfolio { portfolio_id: Uuid::new_v4() };
        tracker.record_running(run_id, &scope);
        tracker.record_terminal(run_id, BatchStatus::Completed);
        tracker.sweep();
        assert!(tracker.get(run_id).is_some());
    }
}
