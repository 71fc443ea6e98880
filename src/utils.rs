// Utility functions: value coercion and number formatting
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Coerces a visits cell into a non-negative integer.
///
/// Accepts plain integers and integral decimals such as `"120.0"`. Empty,
/// negative, fractional or non-numeric input yields `None`.
pub fn parse_visits(raw: &str) -> Option<u64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(v) = text.parse::<u64>() {
        return Some(v);
    }
    let v = text.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
        Some(v as u64)
    } else {
        None
    }
}

/// Coerces a share cell; a trailing `%` is allowed.
pub fn parse_share(raw: &str) -> Option<f64> {
    let text = raw.trim();
    let text = text.strip_suffix('%').unwrap_or(text).trim_end();
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a capture date, accepting plain dates, naive datetimes and RFC 3339.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// Formats an integer with `,` thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Rounds to the nearest integer and groups thousands.
pub fn group_thousands_f64(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    if rounded < 0.0 {
        format!("-{}", group_thousands((-rounded) as u64))
    } else {
        group_thousands(rounded as u64)
    }
}

/// Formats a fraction as a percentage with one decimal, e.g. `0.4567` -> `45.7%`.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
