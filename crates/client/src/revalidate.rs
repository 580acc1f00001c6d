//! Conditional revalidation against the origin.
//!
//! Callers decide whether a stored entry is fresh; once [`revalidate`] is
//! called it always makes exactly one round trip and never retries.

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use ogpcache_core::{Error, FreshnessPolicy, Validators};
use reqwest::header;

use crate::fetch::headers::{self, ConditionalHeaders};
use crate::fetch::Fetcher;

/// How far ahead of our clock an origin `Date` may run before it is ignored.
const MAX_DATE_SKEW_SECS: i64 = 300;

/// Outcome of one revalidation round trip.
#[derive(Debug, Clone)]
pub enum Revalidation {
    /// 304: the previous validators with only the expiry advanced.
    NotModified(Validators),
    /// 2xx: fresh content and the validators describing it.
    Modified { body: Bytes, content_type: Option<String>, validators: Validators },
}

impl Revalidation {
    pub fn changed(&self) -> bool {
        matches!(self, Revalidation::Modified { .. })
    }

    pub fn validators(&self) -> &Validators {
        match self {
            Revalidation::NotModified(validators) | Revalidation::Modified { validators, .. } => validators,
        }
    }
}

/// Ask the origin whether `previous` still describes `url`.
///
/// # Errors
///
/// - `PROTOCOL_VIOLATION` when the origin answers 304 and there is no `previous`
/// - `FETCH_FAILED` for any status that is neither 2xx nor 304
/// - whatever the fetcher reports for transport failures
pub async fn revalidate(
    fetcher: &dyn Fetcher, url: &str, previous: Option<&Validators>, policy: &FreshnessPolicy,
) -> Result<Revalidation, Error> {
    let conditional = ConditionalHeaders::from_validators(previous);
    let response = fetcher.send(url, &conditional).await?;
    let lifetime = policy.lifetime(headers::max_age(&response.headers));

    if response.is_not_modified() {
        let Some(previous) = previous else {
            return Err(Error::ProtocolViolation(format!(
                "{url} answered 304 Not Modified but nothing was cached"
            )));
        };
        let validators = previous.extended(Utc::now(), lifetime);
        tracing::debug!(url, expires_at = %validators.expires_at, "not modified");
        return Ok(Revalidation::NotModified(validators));
    }

    if !response.status.is_success() {
        return Err(Error::FetchFailed { url: url.to_string(), status: response.status.as_u16() });
    }

    let now = Utc::now();
    let issued_at = match headers::header_date(&response.headers, header::DATE) {
        Some(date) if date <= now + Duration::seconds(MAX_DATE_SKEW_SECS) => date,
        Some(date) => {
            tracing::warn!(url, %date, "ignoring Date header ahead of local clock");
            now
        }
        None => now,
    };
    let last_modified = match response.headers.get(header::LAST_MODIFIED) {
        None => None,
        Some(raw) => {
            let parsed = raw.to_str().ok().and_then(headers::parse_http_date);
            if parsed.is_none() {
                tracing::warn!(url, value = ?raw, "ignoring malformed Last-Modified");
            }
            parsed
        }
    };

    let validators = Validators {
        issued_at,
        expires_at: issued_at.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
        etag: headers::etag(&response.headers),
        last_modified,
    };
    tracing::debug!(url, bytes = response.body.len(), expires_at = %validators.expires_at, "modified");

    let content_type = response
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(Revalidation::Modified { body: response.body, content_type, validators })
}
