//! Conditional HTTP fetch pipeline with SSRF protection.
//!
//! ### URL handling
//! - Trim whitespace, ensure scheme (default: `https`)
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Safety gates
//! - Deny private ranges (RFC1918, link-local, localhost, etc.) unless
//!   `allow_private_hosts` is set.
//! - Resolve DNS and validate all A/AAAA answers are public.
//! - Max redirects: 5
//! - Max body bytes: 10MB (configurable)
//!
//! ### Conditional requests
//! - `If-None-Match` / `If-Modified-Since` come from the stored validators.
//! - 304 and non-2xx responses are returned without reading a body.

pub mod headers;
pub mod ssrf;
pub mod url;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

pub use headers::ConditionalHeaders;
pub use ssrf::{SsrfError, check_host, is_public};
pub use url::{UrlError, canonicalize};

use ogpcache_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "ogp-cache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Skip the public-address check (default: false)
    pub allow_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "ogp-cache/0.1".to_string(),
            max_bytes: 10 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            allow_private_hosts: false,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            allow_private_hosts: config.allow_private_hosts,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL as sent on the wire
    pub url: String,
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Response body; empty for 304 and error statuses
    pub body: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    pub fn is_not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED
    }
}

/// Issues a single GET, optionally conditional.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn send(&self, url: &str, conditional: &ConditionalHeaders) -> Result<FetchResponse, Error>;
}

/// reqwest-backed [`Fetcher`].
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn read_body(&self, mut response: reqwest::Response) -> Result<Bytes, Error> {
        let limit = self.config.max_bytes;
        if let Some(len) = response.content_length()
            && len as usize > limit
        {
            return Err(Error::FetchTooLarge(format!("{len} bytes exceeds {limit}")));
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if body.len() + chunk.len() > limit {
                return Err(Error::FetchTooLarge(format!("body exceeds {limit} bytes")));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::FetchTimeout(e.to_string())
    } else {
        Error::HttpError(format!("network error: {e}"))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn send(&self, url_str: &str, conditional: &ConditionalHeaders) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = canonicalize(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        if !self.config.allow_private_hosts {
            check_host(&url).await.map_err(|e| Error::SsrfBlocked(e.to_string()))?;
        }

        let mut request = self.http.get(url.as_str());
        if let Some(tag) = &conditional.if_none_match {
            request = request.header(header::IF_NONE_MATCH, tag.as_str());
        }
        if let Some(since) = &conditional.if_modified_since {
            request = request.header(header::IF_MODIFIED_SINCE, headers::format_http_date(since));
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();

        let body = if status.is_success() { self.read_body(response).await? } else { Bytes::new() };

        let fetch_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            conditional = !conditional.is_empty(),
            bytes = body.len(),
            fetch_ms,
            "origin fetch"
        );

        Ok(FetchResponse { url: url.to_string(), status, headers, body, fetch_ms })
    }
}
