//! Small helpers for URL escaping, file naming and date stamps

use chrono::{Local, NaiveDate};
use url::form_urlencoded;

/// Date stamp format used in distribution names (YYYYMMDD)
pub const DATE_STAMP_FORMAT: &str = "%Y%m%d";

/// Percent-escape a single path segment
///
/// Uses the `application/x-www-form-urlencoded` byte set, not RFC 3986 path
/// escaping: `A-Z a-z 0-9 - . _ *` pass through and everything else, `/` and
/// `~` included, is escaped. Spaces become `%20` rather than `+`.
pub fn escape_url_segment(segment: &str) -> String {
  // form_urlencoded writes a literal '+' as %2B, so any '+' left is a space
  form_urlencoded::byte_serialize(segment.as_bytes())
    .collect::<String>()
    .replace('+', "%20")
}

/// Percent-escape a relative path, keeping its `/` separators
pub fn escape_url_path(path: &str) -> String {
  path.split('/').map(escape_url_segment).collect::<Vec<_>>().join("/")
}

/// Turn a branch name into something usable as a single file name
///
/// Matches how hosting services name branch archives: `feature/x` → `feature-x`.
pub fn branch_file_stem(branch: &str) -> String {
  branch
    .chars()
    .map(|c| if c == '/' || c == '\\' { '-' } else { c })
    .collect()
}

/// Today's local date as YYYYMMDD
pub fn today_stamp() -> String {
  Local::now().format(DATE_STAMP_FORMAT).to_string()
}

/// Validate a user-supplied YYYYMMDD stamp
pub fn parse_date_stamp(value: &str) -> Result<String, String> {
  if value.len() != 8 || !value.chars().all(|c| c.is_ascii_digit()) {
    return Err(format!("'{}' is not a YYYYMMDD date", value));
  }
  NaiveDate::parse_from_str(value, DATE_STAMP_FORMAT)
    .map(|d| d.format(DATE_STAMP_FORMAT).to_string())
    .map_err(|e| format!("'{}' is not a valid date: {}", value, e))
}
