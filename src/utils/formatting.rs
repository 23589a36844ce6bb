use chrono::{DateTime, NaiveDateTime, Utc};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a backend timestamp. Accepts RFC 3339 and the naive
/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` form (interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Ordering key for "most recent first" sorts. Unparseable timestamps
/// sort before every parseable one.
pub fn timestamp_sort_key(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(raw)
}

/// Render a backend timestamp, falling back to the raw text.
pub fn format_timestamp(raw: &str, format: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format(format).to_string(),
        None => raw.to_string(),
    }
}

/// `sql_injection` → `Sql Injection`.
pub fn readable_type_name(vuln_type: &str) -> String {
    vuln_type
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}
