//! Cache-related header helpers.
//!
//! HTTP dates use the fixed RFC 1123 form only
//! (`Sun, 06 Nov 1994 08:49:37 GMT`); anything else is treated as absent.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use ogpcache_core::Validators;
use reqwest::header::{self, HeaderMap, HeaderName};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Largest delta-seconds value honored in `max-age` (RFC 9111 §1.2.2).
const MAX_DELTA_SECONDS: i64 = 2_147_483_648;

/// Validators attached to an outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalHeaders {
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<DateTime<Utc>>,
}

impl ConditionalHeaders {
    /// Build the conditional headers for revalidating `previous`.
    ///
    /// Both validators are sent when both are known.
    pub fn from_validators(previous: Option<&Validators>) -> Self {
        match previous {
            Some(v) => Self {
                if_none_match: v.conditional_etag().map(str::to_string),
                if_modified_since: v.last_modified,
            },
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.if_none_match.is_none() && self.if_modified_since.is_none()
    }
}

/// Parse an RFC 1123 HTTP date.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a timestamp as an RFC 1123 HTTP date.
pub fn format_http_date(ts: &DateTime<Utc>) -> String {
    ts.format(HTTP_DATE_FORMAT).to_string()
}

/// Read a date-valued header, if present and well-formed.
pub fn header_date(headers: &HeaderMap, name: HeaderName) -> Option<DateTime<Utc>> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date)
}

/// `max-age` advertised by the response's `Cache-Control` header.
///
/// Directives are matched case-insensitively; every `Cache-Control` line is
/// considered and the first valid `max-age` wins.
pub fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get_all(header::CACHE_CONTROL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(','))
        .find_map(|directive| {
            let (name, value) = directive.split_once('=')?;
            if !name.trim().eq_ignore_ascii_case("max-age") {
                return None;
            }
            let secs: u64 = value.trim().trim_matches('"').parse().ok()?;
            let secs = i64::try_from(secs).unwrap_or(MAX_DELTA_SECONDS).min(MAX_DELTA_SECONDS);
            Some(Duration::seconds(secs))
        })
}

/// Entity tag of the response; empty values count as absent.
pub fn etag(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
}
