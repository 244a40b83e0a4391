//! System status normalizer.
//!
//! Input: `geo|power|temperature|cpu|memTotal-memAvailable|disk`.

use super::{leading_float, leading_int, split_fields};
use crate::types::{Percent, SystemRecord, NOT_AVAILABLE};

const FIELD_COUNT: usize = 6;

pub fn parse_system(raw: &str) -> SystemRecord {
    let fields = split_fields(raw);
    let [geo, power, temp, cpu, mem, disk] = match fields.get(..FIELD_COUNT) {
        Some(&[a, b, c, d, e, f]) => [a, b, c, d, e, f],
        _ => return SystemRecord::default(),
    };

    SystemRecord {
        geo: non_empty_or(geo, "Unknown"),
        power: non_empty_or(power, NOT_AVAILABLE),
        temperature: parse_temperature(temp),
        cpu: parse_cpu(cpu),
        mem: parse_memory(mem),
        disk: parse_disk(disk),
    }
}

fn non_empty_or(s: &str, fallback: &str) -> String {
    let v = if s.is_empty() { fallback } else { s };
    v.to_string()
}

/// Zero or unreadable load is reported as the floor, never as exact zero.
fn parse_cpu(s: &str) -> Percent {
    leading_float(s)
        .filter(|v| *v > 0.0)
        .map(Percent::new)
        .unwrap_or(Percent::FLOOR)
}

/// `total-available` in any consistent unit.
fn parse_memory(s: &str) -> Percent {
    let (total, avail) = match s.split_once('-') {
        Some((t, a)) => (leading_int(t).unwrap_or(0), leading_int(a).unwrap_or(0)),
        None => (leading_int(s).unwrap_or(0), 0),
    };
    if total <= 0 {
        return Percent::FLOOR;
    }
    let used = total.saturating_sub(avail) as f64;
    Percent::new((used / total as f64 * 100.0).max(Percent::FLOOR.value()))
}

/// Either `"45%"` or a bare number such as `"45"` / `"use:45"`.
fn parse_disk(s: &str) -> Percent {
    let v = match s.split_once('%') {
        Some((num, _)) => {
            let kept: String = num.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            leading_float(&kept).unwrap_or(0.0)
        }
        None => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse::<f64>().unwrap_or(0.0)
        }
    };
    Percent::new(v)
}

/// `"0"` and empty mean the sensor is absent. The reading keeps its digits as written.
fn parse_temperature(s: &str) -> Option<String> {
    if s.is_empty() || s == "0" {
        return None;
    }
    let kept: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    leading_float(&kept).map(|_| kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_yields_placeholder_record() {
        for raw in ["", "N/A", "Seoul|on|48.3|12.0|8000-2000"] {
            let rec = parse_system(raw);
            assert_eq!(rec, SystemRecord::default(), "input {raw:?}");
            assert_eq!(rec.cpu.to_string(), "0.1%");
            assert_eq!(rec.mem.to_string(), "0.1%");
            assert_eq!(rec.disk.to_string(), "0.1%");
            assert_eq!(rec.temperature, None);
        }
    }

    #[test]
    fn full_line_is_normalized() {
        let rec = parse_system("Seoul|on|temp=48.3'C|12.5|8000-2000|45%");
        assert_eq!(rec.geo, "Seoul");
        assert_eq!(rec.power, "on");
        assert_eq!(rec.temperature.as_deref(), Some("48.3"));
        assert_eq!(rec.cpu.to_string(), "12.5%");
        assert_eq!(rec.mem.to_string(), "75.0%");
        assert_eq!(rec.disk.to_string(), "45.0%");
    }

    #[test]
    fn cpu_non_positive_or_garbage_is_floor() {
        for cpu in ["0", "-4", "abc", "", "0.0"] {
            let rec = parse_system(&format!("g|p|40|{cpu}|100-50|10%"));
            assert_eq!(rec.cpu.to_string(), "0.1%", "cpu {cpu:?}");
        }
    }

    #[test]
    fn cpu_is_clamped_to_hundred() {
        let rec = parse_system("g|p|40|350.2|100-50|10%");
        assert_eq!(rec.cpu.to_string(), "100.0%");
    }

    #[test]
    fn memory_stays_within_floor_and_hundred() {
        let cases = [
            ("100-100", "0.1%"),
            ("100-150", "0.1%"),
            ("100-0", "100.0%"),
            ("100", "100.0%"),
            ("1000000-999999", "0.1%"),
            ("3-1", "66.7%"),
        ];
        for (mem, want) in cases {
            let rec = parse_system(&format!("g|p|40|5|{mem}|10%"));
            assert_eq!(rec.mem.to_string(), want, "mem {mem:?}");
            assert!((0.1..=100.0).contains(&rec.mem.value()));
        }
    }

    #[test]
    fn memory_without_positive_total_is_floor() {
        for mem in ["0-0", "-5-1", "", "x-y"] {
            let rec = parse_system(&format!("g|p|40|5|{mem}|10%"));
            assert_eq!(rec.mem, Percent::FLOOR, "mem {mem:?}");
        }
    }

    #[test]
    fn disk_accepts_percent_or_bare_number() {
        assert_eq!(parse_system("g|p|40|5|10-5|87%").disk.to_string(), "87.0%");
        assert_eq!(parse_system("g|p|40|5|10-5|use 33").disk.to_string(), "33.0%");
        assert_eq!(parse_system("g|p|40|5|10-5|none").disk.to_string(), "0.0%");
        assert_eq!(parse_system("g|p|40|5|10-5|950").disk.to_string(), "100.0%");
    }

    #[test]
    fn oversized_bare_disk_number_clamps_to_hundred() {
        let rec = parse_system("g|p|40|5|10-5|123456789012345678901234567890");
        assert_eq!(rec.disk.to_string(), "100.0%");
    }

    #[test]
    fn temperature_zero_or_empty_is_not_available() {
        assert_eq!(parse_system("g|p|0|5|10-5|1%").temperature, None);
        assert_eq!(parse_system("g|p||5|10-5|1%").temperature, None);
        assert_eq!(parse_system("g|p|n/a|5|10-5|1%").temperature, None);
        assert_eq!(parse_system("g|p|51C|5|10-5|1%").temperature.as_deref(), Some("51"));
    }

    #[test]
    fn temperature_text_is_kept_verbatim() {
        let temp = |t: &str| {
            let rec = parse_system(&format!("g|p|{t}|5|10-5|1%"));
            serde_json::to_value(&rec).unwrap()["temp"].clone()
        };
        assert_eq!(temp("41.0"), "41.0°C");
        assert_eq!(temp("48.50"), "48.50°C");
        assert_eq!(temp("temp=52.6'C"), "52.6°C");
        assert_eq!(temp("0"), "N/A");
    }

    #[test]
    fn empty_labels_fall_back() {
        let rec = parse_system("||40|5|10-5|1%");
        assert_eq!(rec.geo, "Unknown");
        assert_eq!(rec.power, "N/A");
    }

    #[test]
    fn same_input_same_record() {
        let raw = "Seoul|on|temp=48.3'C|12.5|8000-2000|45%";
        assert_eq!(parse_system(raw), parse_system(raw));
        assert_eq!(parse_system("garbage"), parse_system("garbage"));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let a = parse_system("g|p|40|5|10-5|1%|trailing|junk");
        let b = parse_system("g|p|40|5|10-5|1%");
        assert_eq!(a, b);
    }
}
