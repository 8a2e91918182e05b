use chrono::{DateTime, Utc};

pub const DISPLAY_FORMAT: &str = "%b %d, %Y — %I:%M %p";

pub const UNKNOWN_TIME: &str = "Unknown";

/// Renders a provider `modifiedTime` (RFC 3339) for display, in UTC.
/// Anything unparseable becomes [`UNKNOWN_TIME`].
pub fn format_modified_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc).format(DISPLAY_FORMAT).to_string(),
        Err(_) => UNKNOWN_TIME.to_string(),
    }
}
