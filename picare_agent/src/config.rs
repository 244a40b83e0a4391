//! Agent configuration: CLI flags over `PICARE_AGENT_*` environment variables over defaults.

use crate::collect::CommandTable;
use crate::error::AgentError;
use crate::runner::{CommandSpec, DEFAULT_COMMAND_TIMEOUT};
use crate::relay::DEFAULT_RELAY_TIMEOUT;
use crate::scheduler::DEFAULT_SCHEDULE;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;

pub const USAGE: &str = "Usage: picare_agent [--port PORT|-p PORT] [--schedule CRON|-s CRON] [--relay-url URL]";

/// Flags given on the command line; `None` means "not given".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub port: Option<u16>,
    pub schedule: Option<String>,
    pub relay_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cli {
    Run(ParsedArgs),
    Help,
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Cli, String> {
    let mut it = args.into_iter();
    let _ = it.next(); // program name
    let mut parsed = ParsedArgs::default();
    let mut port: Option<String> = None;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "--port" | "-p" => port = it.next(),
            "--schedule" | "-s" => parsed.schedule = it.next(),
            "--relay-url" => parsed.relay_url = it.next(),
            _ if arg.starts_with("--port=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    port = Some(v.to_string());
                }
            }
            _ if arg.starts_with("--schedule=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    parsed.schedule = Some(v.to_string());
                }
            }
            _ if arg.starts_with("--relay-url=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    parsed.relay_url = Some(v.to_string());
                }
            }
            _ => return Err(format!("Unexpected argument '{arg}'. {USAGE}")),
        }
    }

    if let Some(p) = port {
        let p = p
            .parse::<u16>()
            .map_err(|_| format!("Invalid port '{p}'. {USAGE}"))?;
        parsed.port = Some(p);
    }
    Ok(Cli::Run(parsed))
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub port: u16,
    pub schedule: String,
    pub relay_url: Option<String>,
    pub device_id: String,
    pub command_timeout: Duration,
    pub relay_timeout: Duration,
    pub commands: CommandTable,
}

impl AgentConfig {
    /// Layers `args` over `env` over defaults. `env` is injected so tests stay hermetic.
    pub fn resolve<F>(args: ParsedArgs, env: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| env(k).filter(|v| !v.trim().is_empty());
        let millis = |k: &str, default: Duration| {
            var(k)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let port = match args.port {
            Some(p) => p,
            None => var("PICARE_AGENT_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        let device_id = match var("PICARE_AGENT_DEVICE_ID") {
            Some(id) => id,
            None => hostname::get()
                .ok()
                .and_then(|s| s.into_string().ok())
                .ok_or_else(|| AgentError::Config("cannot determine host name for device id".into()))?,
        };

        let mut commands = CommandTable::default();
        for (key, slot) in [
            ("PICARE_AGENT_CMD_POWER", &mut commands.power),
            ("PICARE_AGENT_CMD_SYSTEM", &mut commands.system),
            ("PICARE_AGENT_CMD_DEVICE", &mut commands.device),
            ("PICARE_AGENT_CMD_NETWORK", &mut commands.network),
        ] {
            if let Some(line) = var(key) {
                *slot = CommandSpec::new(slot.name, line);
            }
        }

        Ok(Self {
            port,
            schedule: args
                .schedule
                .or_else(|| var("PICARE_AGENT_SCHEDULE"))
                .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
            relay_url: args.relay_url.or_else(|| var("PICARE_AGENT_RELAY_URL")),
            device_id,
            command_timeout: millis("PICARE_AGENT_COMMAND_TIMEOUT_MS", DEFAULT_COMMAND_TIMEOUT),
            relay_timeout: millis("PICARE_AGENT_RELAY_TIMEOUT_MS", DEFAULT_RELAY_TIMEOUT),
            commands,
        })
    }
}
