//! Normalizers: pure functions from raw command text to fixed-shape records.
//!
//! Command output is an unstable, platform-dependent wire format, so every parser here
//! is lenient. Missing or malformed fields fall back to documented defaults instead of
//! failing the record.

pub mod device;
pub mod network;
pub mod power;
pub mod system;

pub use device::parse_device;
pub use network::parse_network;
pub use power::parse_power;
pub use system::parse_system;

/// Splits on `|` and trims every field.
pub(crate) fn split_fields(raw: &str) -> Vec<&str> {
    raw.split('|').map(str::trim).collect()
}

/// Leading-integer parse: optional sign then digits, anything after is ignored.
/// `"42ms"` gives 42, `"abc"` gives `None`.
pub(crate) fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// Leading-float parse: the longest prefix that reads as a decimal number.
/// `"12.5%"` gives 12.5, `".5"` gives 0.5, `"load"` gives `None`.
pub(crate) fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let mut end = usize::from(s.starts_with(['+', '-']));
    let int_digits = b[end..].iter().take_while(|c| c.is_ascii_digit()).count();
    end += int_digits;
    let mut frac_digits = 0;
    if b.get(end) == Some(&b'.') {
        frac_digits = b[end + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_stops_at_first_non_digit() {
        assert_eq!(leading_int("42"), Some(42));
        assert_eq!(leading_int(" -42dBm"), Some(-42));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("3.9"), Some(3));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn leading_float_reads_decimal_prefix() {
        assert_eq!(leading_float("12.5%"), Some(12.5));
        assert_eq!(leading_float("0"), Some(0.0));
        assert_eq!(leading_float(".5"), Some(0.5));
        assert_eq!(leading_float("7."), Some(7.0));
        assert_eq!(leading_float("-1.25,2"), Some(-1.25));
        assert_eq!(leading_float("N/A"), None);
        assert_eq!(leading_float("."), None);
    }

    #[test]
    fn split_fields_trims() {
        assert_eq!(split_fields(" a | b|c "), vec!["a", "b", "c"]);
        assert_eq!(split_fields(""), vec![""]);
    }
}
