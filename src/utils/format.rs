use std::fmt::Display;

use chrono::{Local, TimeZone};

/// Format a price as a currency tick label: `$` followed by the number
/// grouped by thousands with at most three fraction digits
/// (e.g. `64321.5` -> `$64,321.5`).
pub fn format_currency(value: f64) -> String {
    format!("${}", group_thousands(value))
}

fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(rounded.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Time-of-day label for a unix timestamp (seconds) in the given zone,
/// e.g. `3:04:05 PM`. `None` if the timestamp is out of range.
pub fn time_label<Tz>(timestamp: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let dt = tz.timestamp_opt(timestamp, 0).single()?;
    Some(dt.format("%-I:%M:%S %p").to_string())
}

/// Time-of-day label in the host's local time zone
pub fn local_time_label(timestamp: i64) -> Option<String> {
    time_label(timestamp, &Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_currency_grouping() {
        assert_eq!(format_currency(64321.5), "$64,321.5");
        assert_eq!(format_currency(1234567.0), "$1,234,567");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(1000.0), "$1,000");
    }

    #[test]
    fn test_format_currency_fraction_digits() {
        assert_eq!(format_currency(0.12345), "$0.123");
        assert_eq!(format_currency(145.2), "$145.2");
        assert_eq!(format_currency(2.0006), "$2.001");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(-1500.25), "$-1,500.25");
        assert_eq!(format_currency(-0.0001), "$-0");
    }

    #[test]
    fn test_time_label_utc() {
        // 2024-06-10 06:13:20 UTC
        assert_eq!(time_label(1718000000, &Utc).as_deref(), Some("6:13:20 AM"));
        // 2024-06-10 18:00:00 UTC
        assert_eq!(time_label(1718042400, &Utc).as_deref(), Some("6:00:00 PM"));
    }

    #[test]
    fn test_time_label_out_of_range() {
        assert_eq!(time_label(i64::MAX, &Utc), None);
    }

    #[test]
    fn test_local_time_label_non_empty() {
        let label = local_time_label(1718000000).unwrap();
        assert!(!label.is_empty());
    }
}
