//! Display timestamps for transcript blocks

/// Format seconds as `M:SS`, or `H:MM:SS` once past the first hour.
///
/// Each unit is truncated, so 59.9 seconds renders as `0:59`. Negative and
/// non-finite input renders as `0:00`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format a millisecond offset, dropping sub-second precision
pub fn format_offset_millis(offset_millis: u64) -> String {
    format_timestamp((offset_millis / 1000) as f64)
}
