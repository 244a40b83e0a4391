//! Shared handler state. Everything in here is immutable after startup; each
//! collection builds its own snapshot.

use crate::collect::Pipeline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub schedule: Arc<str>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, schedule: impl Into<Arc<str>>) -> Self {
        Self {
            pipeline,
            schedule: schedule.into(),
        }
    }
}
