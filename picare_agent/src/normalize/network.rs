//! Network normalizer.
//!
//! Layout: `ping|down|up|ip|[{json}|]ssid|freq|signal|apCount`. The JSON fragment comes
//! from an external IP lookup and its position differs between host platforms: it can
//! replace the `ip` field or sit between `ip` and `ssid`. Fields after the SSID are read
//! relative to wherever the SSID was found.

use super::{leading_float, leading_int, split_fields};
use crate::types::{GeoPoint, NetworkRecord, NOT_AVAILABLE};
use serde::Deserialize;
use tracing::debug;

const REACHABLE_MARKER: &str = "Success";
const IP_FIELD: usize = 3;
const SSID_FIELD: usize = 4;

/// External lookup result; every key optional.
#[derive(Debug, Default, Deserialize)]
struct ExternalInfo {
    ip: Option<String>,
    org: Option<String>,
    country: Option<String>,
    loc: Option<String>,
}

impl ExternalInfo {
    fn from_fields(fields: &[&str]) -> Self {
        let Some(fragment) = fields.iter().find(|f| is_fragment(f)) else {
            return Self::default();
        };
        serde_json::from_str(fragment).unwrap_or_else(|e| {
            debug!("discarding unparseable lookup fragment: {e}");
            Self::default()
        })
    }

    fn geo(&self) -> GeoPoint {
        let (lat, lon) = self
            .loc
            .as_deref()
            .and_then(|l| l.split_once(','))
            .unwrap_or(("0", "0"));
        GeoPoint {
            lat: leading_float(lat).unwrap_or(0.0),
            lon: leading_float(lon).unwrap_or(0.0),
        }
    }
}

fn is_fragment(field: &str) -> bool {
    field.starts_with('{')
}

/// Index-checked access; absent or blank fields read as `None`.
fn field<'a>(fields: &[&'a str], idx: usize) -> Option<&'a str> {
    fields.get(idx).copied().filter(|f| !f.is_empty())
}

fn text_or_na(v: Option<&str>) -> String {
    v.unwrap_or(NOT_AVAILABLE).to_string()
}

fn known(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty() && s != NOT_AVAILABLE)
}

pub fn parse_network(raw: &str) -> NetworkRecord {
    let fields = split_fields(raw);
    let external = ExternalInfo::from_fields(&fields);
    let int = |idx| field(&fields, idx).and_then(leading_int).unwrap_or(0);

    let plain_ip = field(&fields, IP_FIELD)
        .filter(|f| !is_fragment(f) && *f != NOT_AVAILABLE)
        .map(str::to_string);

    let ssid_idx = match field(&fields, SSID_FIELD) {
        Some(f) if is_fragment(f) => SSID_FIELD + 1,
        _ => SSID_FIELD,
    };

    NetworkRecord {
        reachable: fields.first() == Some(&REACHABLE_MARKER),
        down: int(1),
        up: int(2),
        ip: plain_ip
            .or_else(|| known(external.ip.clone()))
            .unwrap_or_else(|| NOT_AVAILABLE.into()),
        isp: known(external.org.clone()).unwrap_or_else(|| NOT_AVAILABLE.into()),
        country: known(external.country.clone()).unwrap_or_else(|| NOT_AVAILABLE.into()),
        geo: external.geo(),
        ssid: text_or_na(field(&fields, ssid_idx)),
        freq: text_or_na(field(&fields, ssid_idx + 1)),
        signal: int(ssid_idx + 2).unsigned_abs(),
        ap_count: int(ssid_idx + 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"Success|100|50|N/A|{"ip":"1.2.3.4","org":"ACME","country":"US","loc":"1.5,2.5"}|MySSID|2.4GHz|-42|3"#;

    #[test]
    fn fragment_after_ip_field() {
        let rec = parse_network(SAMPLE);
        assert!(rec.reachable);
        assert_eq!(rec.down, 100);
        assert_eq!(rec.up, 50);
        assert_eq!(rec.ip, "1.2.3.4");
        assert_eq!(rec.isp, "ACME");
        assert_eq!(rec.country, "US");
        assert_eq!(rec.geo, GeoPoint { lat: 1.5, lon: 2.5 });
        assert_eq!(rec.ssid, "MySSID");
        assert_eq!(rec.freq, "2.4GHz");
        assert_eq!(rec.signal, 42);
        assert_eq!(rec.ap_count, 3);
    }

    #[test]
    fn fragment_in_place_of_ip_field() {
        let raw = r#"Success|20|10|{"ip":"5.6.7.8","org":"Net","country":"KR","loc":"37.5,127.0"}|Home|5GHz|-61|7"#;
        let rec = parse_network(raw);
        assert_eq!(rec.ip, "5.6.7.8");
        assert_eq!(rec.ssid, "Home");
        assert_eq!(rec.freq, "5GHz");
        assert_eq!(rec.signal, 61);
        assert_eq!(rec.ap_count, 7);
        assert_eq!(rec.geo, GeoPoint { lat: 37.5, lon: 127.0 });
    }

    #[test]
    fn plain_ip_wins_over_lookup() {
        let raw = r#"Success|1|1|10.0.0.2|{"ip":"1.2.3.4"}|S|2.4GHz|-50|1"#;
        assert_eq!(parse_network(raw).ip, "10.0.0.2");
    }

    #[test]
    fn broken_fragment_is_treated_as_empty() {
        let raw = r#"Success|100|50|N/A|{"ip":"1.2.3.4",|MySSID|2.4GHz|-42|3"#;
        let rec = parse_network(raw);
        assert_eq!(rec.ip, "N/A");
        assert_eq!(rec.isp, "N/A");
        assert_eq!(rec.geo, GeoPoint::default());
        assert_eq!(rec.ssid, "MySSID");
        assert_eq!(rec.signal, 42);
    }

    #[test]
    fn no_fragment_reads_plain_layout() {
        let rec = parse_network("Fail|0|0|192.168.0.9|Office|5GHz|-70|12");
        assert!(!rec.reachable);
        assert_eq!(rec.ip, "192.168.0.9");
        assert_eq!(rec.isp, "N/A");
        assert_eq!(rec.ssid, "Office");
        assert_eq!(rec.signal, 70);
        assert_eq!(rec.ap_count, 12);
    }

    #[test]
    fn unavailable_output_is_default_record() {
        assert_eq!(parse_network("N/A"), NetworkRecord::default());
        assert_eq!(parse_network(""), NetworkRecord::default());
    }

    #[test]
    fn truncated_output_keeps_what_is_present() {
        let rec = parse_network("Success|30");
        assert!(rec.reachable);
        assert_eq!(rec.down, 30);
        assert_eq!(rec.up, 0);
        assert_eq!(rec.ssid, "N/A");
        assert_eq!(rec.freq, "N/A");
        assert_eq!(rec.signal, 0);
    }

    #[test]
    fn non_numeric_numbers_default_to_zero() {
        let rec = parse_network("Success|fast|slow|N/A|S|F|weak|many");
        assert_eq!((rec.down, rec.up, rec.signal, rec.ap_count), (0, 0, 0, 0));
    }

    #[test]
    fn malformed_loc_defaults_coordinates() {
        let raw = r#"Success|1|1|N/A|{"ip":"1.1.1.1","loc":"north"}|S|F|-1|1"#;
        assert_eq!(parse_network(raw).geo, GeoPoint::default());
    }

    #[test]
    fn repeated_parse_is_identical() {
        assert_eq!(parse_network(SAMPLE), parse_network(SAMPLE));
    }
}
