//! Records relayed upstream and returned to HTTP triggers.
//! Keep this module stable: the JSON keys are the collector's wire format.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder for any reading that could not be obtained.
pub const NOT_AVAILABLE: &str = "N/A";

/// Floor used for percentages when the reading is missing or unreliable.
pub const PERCENT_FLOOR: f64 = 0.1;

/// Trimmed stdout of one command, or the unavailable sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutput {
    Text(String),
    Unavailable,
}

impl RawOutput {
    pub fn as_str(&self) -> &str {
        match self {
            RawOutput::Text(s) => s,
            RawOutput::Unavailable => NOT_AVAILABLE,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, RawOutput::Text(_))
    }
}

impl From<&str> for RawOutput {
    fn from(s: &str) -> Self {
        RawOutput::Text(s.trim().to_string())
    }
}

/// Percentage in [0, 100], rendered as `"12.3%"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percent(f64);

impl Percent {
    pub const FLOOR: Percent = Percent(PERCENT_FLOOR);

    pub fn new(v: f64) -> Self {
        if v.is_nan() {
            return Self::FLOOR;
        }
        Percent(v.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

fn timestamp_or_na<S: Serializer>(v: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(ts) => s.collect_str(&ts.format("%Y-%m-%dT%H:%M:%SZ")),
        None => s.serialize_str(NOT_AVAILABLE),
    }
}

fn celsius_or_na<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(c) => s.collect_str(&format_args!("{c}°C")),
        None => s.serialize_str(NOT_AVAILABLE),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerRecord {
    #[serde(rename = "onCnt", serialize_with = "timestamp_or_na")]
    pub powered_on_at: Option<DateTime<Utc>>,
    #[serde(rename = "onDur")]
    pub on_duration_secs: u64,
    #[serde(rename = "offCnt", serialize_with = "timestamp_or_na")]
    pub powered_off_at: Option<DateTime<Utc>>,
    #[serde(rename = "offDur")]
    pub off_duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemRecord {
    pub geo: String,
    pub power: String,
    #[serde(rename = "temp", serialize_with = "celsius_or_na")]
    /// Numeric reading as reported by the sensor, e.g. `"48.50"`.
    pub temperature: Option<String>,
    pub cpu: Percent,
    pub mem: Percent,
    pub disk: Percent,
}

impl Default for SystemRecord {
    fn default() -> Self {
        Self {
            geo: NOT_AVAILABLE.into(),
            power: NOT_AVAILABLE.into(),
            temperature: None,
            cpu: Percent::FLOOR,
            mem: Percent::FLOOR,
            disk: Percent::FLOOR,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    #[serde(rename = "usbCnt")]
    pub usb_count: u64,
    #[serde(rename = "usbDur")]
    pub usb_duration_secs: u64,
    #[serde(rename = "trafficAmount")]
    pub traffic_amount: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkRecord {
    #[serde(rename = "ping")]
    pub reachable: bool,
    pub down: i64,
    pub up: i64,
    pub ip: String,
    pub isp: String,
    pub country: String,
    pub geo: GeoPoint,
    pub ssid: String,
    pub freq: String,
    pub signal: u64,
    pub ap_count: i64,
}

impl Default for NetworkRecord {
    fn default() -> Self {
        Self {
            reachable: false,
            down: 0,
            up: 0,
            ip: NOT_AVAILABLE.into(),
            isp: NOT_AVAILABLE.into(),
            country: NOT_AVAILABLE.into(),
            geo: GeoPoint::default(),
            ssid: NOT_AVAILABLE.into(),
            freq: NOT_AVAILABLE.into(),
            signal: 0,
            ap_count: 0,
        }
    }
}

/// System and device readings merged into one flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    #[serde(flatten)]
    pub system: SystemRecord,
    #[serde(flatten)]
    pub device: DeviceRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    #[serde(rename = "hwId")]
    pub device_id: String,
    pub status: StatusRecord,
    pub network: NetworkRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySnapshot {
    #[serde(rename = "hwId")]
    pub device_id: String,
    #[serde(rename = "activityType")]
    pub activity_type: &'static str,
    pub value: u32,
    pub meta: PowerRecord,
}

/// One collection cycle's output, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TelemetrySnapshot {
    Status(StatusSnapshot),
    Activity(ActivitySnapshot),
}

impl TelemetrySnapshot {
    pub fn kind(&self) -> CollectKind {
        match self {
            TelemetrySnapshot::Status(_) => CollectKind::Status,
            TelemetrySnapshot::Activity(_) => CollectKind::Activity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectKind {
    Status,
    Activity,
}

impl CollectKind {
    pub const ALL: [CollectKind; 2] = [CollectKind::Status, CollectKind::Activity];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectKind::Status => "status",
            CollectKind::Activity => "activity",
        }
    }

    /// Upstream path the snapshot of this kind is relayed to.
    pub fn relay_path(self) -> &'static str {
        match self {
            CollectKind::Status => "/v1/status_log",
            CollectKind::Activity => "/v1/activity_log",
        }
    }
}

impl fmt::Display for CollectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CollectKind {
    type Err = crate::error::AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(CollectKind::Status),
            "activity" => Ok(CollectKind::Activity),
            other => Err(crate::error::AgentError::UnknownRequestKind(other.to_string())),
        }
    }
}
