//! Time utilities for fuelbot
//!
//! All timestamps handled by fuelbot are UTC wall-clock times; the remote
//! service reports fuel expiry in UTC and the chat service renders embed
//! timestamps from RFC 3339 strings.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `FUELBOT_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations. This is
//! useful for exercising the refuel window without waiting for a structure to
//! actually run low.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` interpreted as UTC (e.g., `2021-05-10 12:00:00`)
//!
//! Example:
//! ```bash
//! FUELBOT_MOCK_TIME="2021-05-10 12:00:00" cargo run -p fuelbotd -- --once
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "FUELBOT_MOCK_TIME";

/// Format accepted by [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset between mock time and real time, computed once at first use so
/// that mock time advances naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, MOCK_TIME_FORMAT) {
                    Ok(naive_dt) => {
                        let mock_dt = naive_dt.and_utc();
                        let offset = mock_dt.signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    Err(e) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = MOCK_TIME_FORMAT,
                            error = %e,
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current UTC time, respecting mock time settings in debug builds.
pub fn now() -> DateTime<Utc> {
    let real_now = Utc::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Convert a std duration into a chrono duration, saturating on overflow.
pub fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::MAX)
}

/// Format a timestamp the way it is shown next to a relative time.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Describe `target` relative to `now` ("3 days from now", "2 hours ago").
///
/// Magnitudes are truncated to the largest fitting unit.
pub fn format_relative(target: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let delta = target.signed_duration_since(*now);
    let secs = delta.num_seconds();
    let magnitude = secs.unsigned_abs();

    if magnitude < 1 {
        return "now".to_string();
    }

    let (amount, unit) = match magnitude {
        s if s < 60 => (s, "second"),
        s if s < 3600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3600, "hour"),
        s if s < 14 * 86_400 => (s / 86_400, "day"),
        s if s < 60 * 86_400 => (s / (7 * 86_400), "week"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    let plural = if amount == 1 { "" } else { "s" };
    if secs > 0 {
        format!("{} {}{} from now", amount, unit, plural)
    } else {
        format!("{} {}{} ago", amount, unit, plural)
    }
}
