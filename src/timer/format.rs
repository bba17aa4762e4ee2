// File: ./src/timer/format.rs
use chrono::{DateTime, Utc};

/// Milliseconds between `start` and `now`, clamped at zero for start
/// instants that lie in the future.
pub fn elapsed_ms(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_milliseconds().max(0) as u64
}

/// Renders a duration as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let total_seconds = elapsed_ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
