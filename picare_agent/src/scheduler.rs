//! Recurring collection on a cron cadence.
//!
//! Every tick runs each collection kind in its own task, so an error or panic in one
//! firing is logged and the job stays registered for the next tick.

use crate::collect::Pipeline;
use crate::error::AgentError;
use crate::types::{CollectKind, TelemetrySnapshot};
use std::str::FromStr;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Top of every hour (seconds-first cron syntax).
pub const DEFAULT_SCHEDULE: &str = "0 0 * * * *";

/// Accepts classic 5-field crontab lines by pinning seconds to 0; 6/7-field
/// expressions pass through. Anything `cron` rejects fails here, at startup.
pub fn normalize_schedule(expr: &str) -> Result<String, AgentError> {
    let expr = expr.split_whitespace().collect::<Vec<_>>().join(" ");
    let normalized = match expr.split(' ').count() {
        5 => format!("0 {expr}"),
        _ => expr.clone(),
    };
    cron::Schedule::from_str(&normalized).map_err(|e| AgentError::InvalidSchedule {
        expr: expr.clone(),
        reason: e.to_string(),
    })?;
    Ok(normalized)
}

/// Runs every collection kind once, each in its own task.
pub async fn fire(pipeline: &Pipeline) -> Vec<TelemetrySnapshot> {
    let handles: Vec<_> = CollectKind::ALL
        .into_iter()
        .map(|kind| {
            let p = pipeline.clone();
            (kind, tokio::spawn(async move { p.run(kind).await }))
        })
        .collect();

    let mut snapshots = Vec::with_capacity(handles.len());
    for (kind, handle) in handles {
        match handle.await {
            Ok(snap) => snapshots.push(snap),
            Err(e) => error!(kind = %kind, "[FAILED] scheduled collection aborted: {e}"),
        }
    }
    snapshots
}

pub struct CollectionScheduler {
    pipeline: Pipeline,
    schedule: String,
    inner: Option<JobScheduler>,
}

impl CollectionScheduler {
    /// Validates `expr` up front so a bad cadence never silently disables collection.
    pub fn new(pipeline: Pipeline, expr: &str) -> Result<Self, AgentError> {
        Ok(Self {
            pipeline,
            schedule: normalize_schedule(expr)?,
            inner: None,
        })
    }

    pub fn schedule(&self) -> &str {
        &self.schedule
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_some()
    }

    pub async fn start(&mut self) -> Result<(), AgentError> {
        if self.inner.is_some() {
            return Ok(());
        }
        let scheduler = JobScheduler::new().await?;
        let pipeline = self.pipeline.clone();
        let job = Job::new_async(self.schedule.as_str(), move |_uuid, _lock| {
            let pipeline = pipeline.clone();
            Box::pin(async move {
                let done = fire(&pipeline).await;
                if done.len() < CollectKind::ALL.len() {
                    warn!(completed = done.len(), "scheduled collection partially failed");
                } else {
                    info!("[SUCCESS] scheduled collection");
                }
            })
        })?;
        scheduler.add(job).await?;
        scheduler.start().await?;
        info!(schedule = %self.schedule, "collection scheduler started (cron)");
        self.inner = Some(scheduler);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), AgentError> {
        if let Some(mut scheduler) = self.inner.take() {
            scheduler.shutdown().await?;
            info!("collection scheduler stopped");
        }
        Ok(())
    }
}
