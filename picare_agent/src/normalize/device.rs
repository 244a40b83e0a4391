//! Peripheral usage normalizer: `<usbCount>|<usbSeconds>|<networkActiveSeconds>`.

use super::{leading_int, split_fields};
use crate::types::DeviceRecord;

pub fn parse_device(raw: &str) -> DeviceRecord {
    if !raw.contains('|') {
        return DeviceRecord::default();
    }
    let fields = split_fields(raw);
    let &[count, usb_secs, traffic, ..] = fields.as_slice() else {
        return DeviceRecord::default();
    };
    DeviceRecord {
        usb_count: counter(count),
        usb_duration_secs: counter(usb_secs),
        traffic_amount: counter(traffic),
    }
}

fn counter(s: &str) -> u64 {
    leading_int(s)
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(0)
}
