//! Small text helpers for terminal rows.

/// Shorten `value` to at most `max_length` characters, ending in `...` when cut.
pub fn truncate(value: &str, max_length: usize) -> String {
    let text = value.trim();
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// First ten characters of an ISO timestamp (the date part), or `-` when missing.
pub fn format_date(iso_timestamp: Option<&str>) -> String {
    match iso_timestamp {
        None | Some("") => "-".to_string(),
        Some(ts) => ts.chars().take(10).collect(),
    }
}
