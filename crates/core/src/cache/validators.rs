//! HTTP validator sets and the freshness floor.
//!
//! A [`Validators`] value is the only authority on whether a stored record may
//! be served without going back to the origin. It is produced by the
//! revalidation protocol and never edited by readers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Revalidation state of a cached entity.
///
/// Invariant: `expires_at - issued_at` is never below the freshness floor
/// that was in force when the set was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validators {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Validators {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    /// Copy with only the expiry pushed to `now + lifetime`.
    ///
    /// This is what a 304 Not Modified does: identity fields stay untouched.
    pub fn extended(&self, now: DateTime<Utc>, lifetime: Duration) -> Self {
        let expires_at = now.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { expires_at, ..self.clone() }
    }

    /// Whether both sets describe the same origin version.
    pub fn same_version(&self, other: &Validators) -> bool {
        self.etag == other.etag && self.last_modified == other.last_modified
    }

    /// ETag usable in `If-None-Match`; empty tags are ignored.
    pub fn conditional_etag(&self) -> Option<&str> {
        self.etag.as_deref().filter(|tag| !tag.is_empty())
    }
}

/// Lower bound applied to every advertised freshness lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    min_lifetime: Duration,
}

impl FreshnessPolicy {
    pub fn new(min_lifetime: Duration) -> Self {
        Self { min_lifetime }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000)))
    }

    pub fn min_lifetime(&self) -> Duration {
        self.min_lifetime
    }

    /// Lifetime for a response advertising `advertised` (absent counts as zero).
    ///
    /// The floor only ever raises the value; longer lifetimes are kept as-is.
    pub fn lifetime(&self, advertised: Option<Duration>) -> Duration {
        advertised.unwrap_or_else(Duration::zero).max(self.min_lifetime)
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(issued_at: DateTime<Utc>) -> Validators {
        Validators {
            issued_at,
            expires_at: issued_at + Duration::hours(1),
            etag: Some("\"v1\"".to_string()),
            last_modified: Some(issued_at - Duration::days(3)),
        }
    }

    #[test]
    fn test_fresh_strictly_before_expiry() {
        let now = Utc::now();
        let v = sample(now);
        assert!(v.is_fresh_at(now));
        assert!(v.is_fresh_at(v.expires_at - Duration::milliseconds(1)));
        assert!(!v.is_fresh_at(v.expires_at));
        assert!(!v.is_fresh_at(v.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_floor_raises_short_lifetimes() {
        let policy = FreshnessPolicy::default();
        assert_eq!(policy.lifetime(None), Duration::hours(1));
        assert_eq!(policy.lifetime(Some(Duration::zero())), Duration::hours(1));
        assert_eq!(policy.lifetime(Some(Duration::seconds(60))), Duration::hours(1));
    }

    #[test]
    fn test_floor_keeps_long_lifetimes() {
        let policy = FreshnessPolicy::default();
        assert_eq!(policy.lifetime(Some(Duration::hours(2))), Duration::hours(2));
    }

    #[test]
    fn test_custom_floor() {
        let policy = FreshnessPolicy::from_secs(600);
        assert_eq!(policy.min_lifetime(), Duration::minutes(10));
        assert_eq!(policy.lifetime(Some(Duration::seconds(30))), Duration::minutes(10));
    }

    #[test]
    fn test_extended_only_moves_expiry() {
        let issued = Utc::now() - Duration::hours(5);
        let before = sample(issued);
        let now = Utc::now();
        let after = before.extended(now, Duration::hours(1));

        assert_eq!(after.issued_at, before.issued_at);
        assert_eq!(after.etag, before.etag);
        assert_eq!(after.last_modified, before.last_modified);
        assert_eq!(after.expires_at, now + Duration::hours(1));
    }

    #[test]
    fn test_extended_ignores_future_issue_time() {
        let now = Utc::now();
        let before = sample(now + Duration::days(30));
        let after = before.extended(now, Duration::hours(1));

        assert_eq!(after.expires_at, now + Duration::hours(1));
        assert_eq!(after.issued_at, before.issued_at);
    }

    #[test]
    fn test_same_version() {
        let now = Utc::now();
        let a = sample(now);
        let mut b = a.extended(now + Duration::hours(2), Duration::hours(3));
        assert!(a.same_version(&b));

        b.etag = Some("\"v2\"".to_string());
        assert!(!a.same_version(&b));

        let mut c = a.clone();
        c.last_modified = None;
        assert!(!a.same_version(&c));
    }

    #[test]
    fn test_conditional_etag_ignores_empty() {
        let mut v = sample(Utc::now());
        assert_eq!(v.conditional_etag(), Some("\"v1\""));
        v.etag = Some(String::new());
        assert_eq!(v.conditional_etag(), None);
        v.etag = None;
        assert_eq!(v.conditional_etag(), None);
    }
}
