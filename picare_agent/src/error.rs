//! Error types surfaced by the agent. Command and field failures never appear here:
//! they are recovered inside the runner and normalizers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("unknown collection kind '{0}' (expected 'status' or 'activity')")]
    UnknownRequestKind(String),

    #[error("invalid cron schedule '{expr}': {reason}")]
    InvalidSchedule { expr: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Upstream delivery failures. Only the relay client sees these.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),

    #[error("request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),
}
