//! Upstream relay. Delivery is best effort: failures are logged here and never
//! reach the caller.

use crate::error::{AgentError, RelayError};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl RelayClient {
    /// `base_url` of `None` disables relaying; payloads are still returned locally.
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Posts `payload` to `<base_url><path>`. Never fails from the caller's view.
    pub async fn relay<T: Serialize + ?Sized>(&self, path: &str, payload: &T) {
        let Some(base) = self.base_url.as_deref() else {
            debug!(path, "no upstream configured, skipping relay");
            return;
        };
        match self.deliver(base, path, payload).await {
            Ok(()) => info!(path, "[SUCCESS] relayed payload upstream"),
            Err(e) => warn!(path, error = %e, "[FAILED] relay to upstream"),
        }
    }

    /// Single delivery attempt; any non-2xx status is an error.
    pub async fn deliver<T: Serialize + ?Sized>(
        &self,
        base: &str,
        path: &str,
        payload: &T,
    ) -> Result<(), RelayError> {
        let url = format!("{base}{path}");
        let response = self.client.post(&url).json(payload).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RelayError::Status(status))
        }
    }
}
