//! Content-addressed keys for derived artifacts.
//!
//! An address is the tail of a SHA-256 hash chain: the seed is hashed first,
//! then every part is folded into the previous digest. Because each link is a
//! fixed-width digest, both the order of the parts and the boundaries between
//! them change the result. Each artifact class has its own seed, so thumbnail
//! and card addresses never collide even for identical parts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Error;

/// Seed for thumbnail addresses.
pub const THUMBNAIL_SEED: &str = "ogp-cache:thumbnail:77a05c22";

/// Seed for rendered card addresses.
pub const CARD_SEED: &str = "ogp-cache:card:95dde42a";

/// A 64-character lower-case hex content address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Derive an address from a seed and an ordered chain of parts.
    pub fn derive<I, S>(seed: &str, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut digest = Sha256::digest(seed.as_bytes());
        for part in parts {
            let mut hasher = Sha256::new();
            hasher.update(&digest);
            hasher.update(part.as_ref().as_bytes());
            digest = hasher.finalize();
        }
        Self(hex::encode(digest))
    }

    /// Address of the thumbnail fetched from `origin_url`.
    pub fn thumbnail(origin_url: &str) -> Self {
        Self::derive(THUMBNAIL_SEED, [origin_url])
    }

    /// Address of a card rendered for `url` with the given parameters.
    ///
    /// The custom stylesheet is appended as an extra part only when supplied.
    pub fn card(url: &str, style: &str, scale: u32, custom_css: Option<&str>) -> Self {
        let scale = scale.to_string();
        let mut parts = vec![url, style, scale.as_str()];
        if let Some(css) = custom_css {
            parts.push(css);
        }
        Self::derive(CARD_SEED, parts)
    }

    /// Parse an externally supplied address.
    ///
    /// Upper-case hex is accepted and normalized.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        if trimmed.len() != 64 || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidAddress(input.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Rebuild an address read back from storage.
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
