//! Cell formatting for the runs table and status bar.

/// Format a millisecond duration for human display.
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1_000.0)
    } else {
        let secs = ms / 1_000;
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Shorten an ISO-8601 timestamp (`2024-05-01T12:34:56`) to
/// `2024-05-01 12:34`. Anything unparseable renders as-is.
pub fn short_timestamp(ts: &str) -> String {
    match chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_millis() {
        assert_eq!(format_duration_ms(500), "500ms");
    }

    #[test]
    fn format_duration_seconds() {
        assert_eq!(format_duration_ms(2_500), "2.5s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration_ms(65_000), "1m 5s");
    }

    #[test]
    fn short_timestamp_trims_seconds() {
        assert_eq!(short_timestamp("2024-05-01T12:34:56"), "2024-05-01 12:34");
    }

    #[test]
    fn short_timestamp_passes_through_garbage() {
        assert_eq!(short_timestamp("yesterday"), "yesterday");
        assert_eq!(short_timestamp(""), "");
    }
}
