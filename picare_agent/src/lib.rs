//! picare_agent: normalizes local inspection-command output into telemetry
//! snapshots and relays them upstream.

pub mod collect;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod relay;
pub mod runner;
pub mod scheduler;
pub mod state;
pub mod types;

pub use collect::{Collector, CommandTable, Pipeline};
pub use error::{AgentError, RelayError};
pub use relay::RelayClient;
pub use types::{CollectKind, TelemetrySnapshot};
