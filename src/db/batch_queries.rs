use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{BatchRunHistory, BatchSource, BatchStatus};

pub async fn insert(pool: &PgPool, run: &BatchRunHistory) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO batch_run_history
            (batch_run_id, status, triggered_by, source, started_at, completed_at,
             total_jobs, successful, failed, error_summary)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(run.batch_run_id)
    .bind(run.status)
    .bind(&run.triggered_by)
    .bind(run.source)
    .bind(run.started_at)
    .bind(run.completed_at)
    .bind(run.total_jobs)
    .bind(run.successful)
    .bind(run.failed)
    .bind(&run.error_summary)
    .execute(pool)
    .await?;
    Ok(())
}

/// Write the terminal state of a run. Called from the orchestrator's
/// `finally`-equivalent path (§4.G/§4.H) — always, whether the run succeeded,
/// partially failed, or panicked.
pub async fn mark_terminal(
    pool: &PgPool,
    batch_run_id: Uuid,
    status: BatchStatus,
    total_jobs: i32,
    successful: i32,
    failed: i32,
    error_summary: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE batch_run_history
         SET status = $2, completed_at = now(), total_jobs = $3, successful = $4,
             failed = $5, error_summary = $6
         WHERE batch_run_id = $1",
    )
    .bind(batch_run_id)
    .bind(status)
    .bind(total_jobs)
    .bind(successful)
    .bind(failed)
    .bind(error_summary)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_one(pool: &PgPool, batch_run_id: Uuid) -> Result<Option<BatchRunHistory>, sqlx::Error> {
    sqlx::query_as::<_, BatchRunHistory>(
        "SELECT batch_run_id, status, triggered_by, source, started_at, completed_at,
                total_jobs, successful, failed, error_summary
         FROM batch_run_history
         WHERE batch_run_id = $1",
    )
    .bind(batch_run_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_recent(pool: &PgPool, limit: i64) -> Result<Vec<BatchRunHistory>, sqlx::Error> {
    sqlx::query_as::<_, BatchRunHistory>(
        "SELECT batch_run_id, status, triggered_by, source, started_at, completed_at,
                total_jobs, successful, failed, error_summary
         FROM batch_run_history
         ORDER BY started_at DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Guards against two orchestrator invocations running concurrently for the
/// same scope (§4.G/§9). Session-scoped — a Postgres advisory lock is held by
/// the *connection* that took it, not released when some other pooled
/// connection calls `pg_advisory_unlock`. Callers MUST acquire and release on
/// the same dedicated connection (see `BatchOrchestrator::run`, which holds
/// one via `pool.acquire()` for the run's full duration) and must not simply
/// pass the pool here.
pub async fn try_acquire_run_lock(conn: &mut PgConnection, key: i64) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .bind(key)
        .fetch_one(conn)
        .await?;
    Ok(row.0)
}

pub async fn release_run_lock(conn: &mut PgConnection, key: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}
