//! Utility functions for general-purpose use across the application.

use chrono::{DateTime, Utc};

/// Layout used for the `expires` field of creation responses.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an expiry timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use curelink::util::format_expiry;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 6, 9, 5, 0).unwrap();
/// assert_eq!(format_expiry(at), "2024-01-06 09:05:00");
/// ```
pub fn format_expiry(dt: DateTime<Utc>) -> String {
    dt.format(EXPIRY_FORMAT).to_string()
}

/// Join the public base URL and a code into a short link.
///
/// A trailing slash on the base is tolerated.
pub fn compose_short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}
