//! Scheduled invocation of the batch orchestrator.
//!
//! The teacher registers a dozen independent cron jobs here, each wrapped in
//! `execute_job_with_tracking`. This crate has exactly one scheduled job —
//! the daily batch with backfill — since every other calculation is a step
//! inside that single orchestrator run rather than an independent job.

pub mod scheduler;
