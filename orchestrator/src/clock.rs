//! Small ambient clock helpers. `aide-prompt`'s assembly functions take
//! `today` as a caller-supplied string rather than reading the system
//! clock themselves, to stay pure; this is where the orchestrator
//! produces that string.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;

/// Today's date, in `YYYY-MM-DD` form, derived from the system clock.
pub fn today_utc_date() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Current Unix time in milliseconds. Saturates to 0 on a clock set
/// before the epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
