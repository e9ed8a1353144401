//! RFC 1123 dates as used by `Expires`, `Last-Modified` and cookie `expires`.

use chrono::{DateTime, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Formats an absolute Unix timestamp, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
///
/// Timestamps outside the range chrono can represent fall back to the epoch.
pub fn http_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default().format(HTTP_DATE_FORMAT).to_string()
}

/// Formats the current instant.
pub fn http_date_now() -> String {
    let mut buf = faf_http_date::get_date_buff_no_key();
    faf_http_date::get_date_no_key(&mut buf);
    String::from_utf8_lossy(&buf[..]).trim().to_owned()
}

/// Current Unix timestamp in seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
