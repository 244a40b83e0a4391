//! Collection pipeline: runs the per-domain commands, feeds each normalizer, and
//! assembles one snapshot per call.

use crate::error::AgentError;
use crate::normalize::{parse_device, parse_network, parse_power, parse_system};
use crate::relay::RelayClient;
use crate::runner::{CommandRunner, CommandSpec};
use crate::types::{
    ActivitySnapshot, CollectKind, StatusRecord, StatusSnapshot, TelemetrySnapshot,
};
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info};

pub const POWER_ACTIVITY: &str = "power";

const POWER_CMD: &str = r#"printf '%s|%s' "$(uptime -s)" "$(last -x shutdown 2>/dev/null | awk '$1 == "shutdown" {print $5, $6, $7, $8}' | head -n 5 | paste -sd, -)""#;

const SYSTEM_CMD: &str = r#"printf '%s|%s|%s|%s|%s|%s' "$(cat /etc/timezone 2>/dev/null)" "$(vcgencmd get_throttled 2>/dev/null)" "$(vcgencmd measure_temp 2>/dev/null)" "$(top -bn1 | awk -F',' '/Cpu\(s\)/ {for (i = 1; i <= NF; i++) if ($i ~ /id/) {split($i, a, " "); print 100 - a[1]}}')" "$(free -m | awk '/^Mem:/ {print $2 "-" $7}')" "$(df / | awk 'NR == 2 {print $5}')""#;

// usb seconds approximated by uptime; traffic in KiB across wlan0 rx+tx
const DEVICE_CMD: &str = r#"s=/sys/class/net/wlan0/statistics; printf '%s|%s|%s' "$(lsusb 2>/dev/null | wc -l)" "$(awk '{print int($1)}' /proc/uptime)" "$(( ($(cat $s/rx_bytes 2>/dev/null || echo 0) + $(cat $s/tx_bytes 2>/dev/null || echo 0)) / 1024 ))""#;

// public ip is left to the lookup fragment
const NETWORK_CMD: &str = r#"p=$(ping -c1 -W1 8.8.8.8 >/dev/null 2>&1 && echo Success || echo Fail); s=/sys/class/net/wlan0/statistics; r1=$(cat $s/rx_bytes 2>/dev/null || echo 0); t1=$(cat $s/tx_bytes 2>/dev/null || echo 0); sleep 1; r2=$(cat $s/rx_bytes 2>/dev/null || echo 0); t2=$(cat $s/tx_bytes 2>/dev/null || echo 0); ext=$(curl -s --max-time 2 https://ipinfo.io/json | tr -d '\n'); printf '%s|%s|%s|%s|%s|%s|%s|%s|%s' "$p" "$(( (r2 - r1) * 8 / 1000 ))" "$(( (t2 - t1) * 8 / 1000 ))" "N/A" "${ext:-N/A}" "$(iwgetid -r 2>/dev/null || echo N/A)" "$(iwgetid -f -r 2>/dev/null || echo N/A)" "$(awk 'NR == 3 {print int($4)}' /proc/net/wireless 2>/dev/null)" "$(iw dev wlan0 scan dump 2>/dev/null | grep -c '^BSS')""#;

/// Which command feeds which normalizer. Configuration, not logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    pub power: CommandSpec,
    pub system: CommandSpec,
    pub device: CommandSpec,
    pub network: CommandSpec,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            power: CommandSpec::new("power", POWER_CMD),
            system: CommandSpec::new("system", SYSTEM_CMD),
            device: CommandSpec::new("device", DEVICE_CMD),
            network: CommandSpec::new("network", NETWORK_CMD),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Collector {
    runner: CommandRunner,
    commands: Arc<CommandTable>,
    device_id: Arc<str>,
}

impl Collector {
    pub fn new(runner: CommandRunner, commands: CommandTable, device_id: impl Into<Arc<str>>) -> Self {
        Self {
            runner,
            commands: Arc::new(commands),
            device_id: device_id.into(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Caller-facing entry: unknown kinds are an error, not an empty snapshot.
    pub async fn collect(&self, kind: &str) -> Result<TelemetrySnapshot, AgentError> {
        let kind: CollectKind = kind.parse()?;
        Ok(self.collect_kind(kind).await)
    }

    pub async fn collect_kind(&self, kind: CollectKind) -> TelemetrySnapshot {
        match kind {
            CollectKind::Status => TelemetrySnapshot::Status(self.status().await),
            CollectKind::Activity => TelemetrySnapshot::Activity(self.activity().await),
        }
    }

    async fn status(&self) -> StatusSnapshot {
        let c = &self.commands;
        // each command is bounded by the runner timeout; one failure leaves the others intact
        let (system, device, network) = tokio::join!(
            self.runner.run(&c.system),
            self.runner.run(&c.device),
            self.runner.run(&c.network),
        );
        debug!(
            system = system.is_available(),
            device = device.is_available(),
            network = network.is_available(),
            "status commands finished"
        );
        StatusSnapshot {
            device_id: self.device_id.to_string(),
            status: StatusRecord {
                system: parse_system(system.as_str()),
                device: parse_device(device.as_str()),
            },
            network: parse_network(network.as_str()),
        }
    }

    async fn activity(&self) -> ActivitySnapshot {
        let raw = self.runner.run(&self.commands.power).await;
        ActivitySnapshot {
            device_id: self.device_id.to_string(),
            activity_type: POWER_ACTIVITY,
            value: 1,
            meta: parse_power(raw.as_str(), &Local::now()),
        }
    }
}

/// Collector plus relay: what both the scheduler and HTTP triggers run.
#[derive(Clone, Debug)]
pub struct Pipeline {
    collector: Collector,
    relay: RelayClient,
}

impl Pipeline {
    pub fn new(collector: Collector, relay: RelayClient) -> Self {
        Self { collector, relay }
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn relay_client(&self) -> &RelayClient {
        &self.relay
    }

    pub async fn run(&self, kind: CollectKind) -> TelemetrySnapshot {
        let snapshot = self.collector.collect_kind(kind).await;
        info!(kind = %kind, device = self.collector.device_id(), "collected snapshot");
        self.relay.relay(kind.relay_path(), &snapshot).await;
        snapshot
    }

    /// String-keyed variant for inbound triggers.
    pub async fn run_named(&self, kind: &str) -> Result<TelemetrySnapshot, AgentError> {
        let kind: CollectKind = kind.parse()?;
        Ok(self.run(kind).await)
    }
}
