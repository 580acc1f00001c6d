//! Preview pipeline: metadata, thumbnail and card caches.
//!
//! Every operation is read-then-conditionally-write against one key. Freshness
//! is decided here; [`crate::revalidate`] is only invoked once a stored entry
//! is missing or stale. Concurrent refreshes of the same key are not
//! coalesced; the last upsert wins.

mod card;
mod metadata;
mod thumbnail;

use std::sync::Arc;

use ogpcache_core::{AppConfig, Error, FreshnessPolicy, Store};

use crate::codec::ImageCodec;
use crate::extract::MetadataExtractor;
use crate::fetch::Fetcher;
use crate::render::{CardStyle, Renderer};

/// Default upper bound on the card scale factor.
pub const DEFAULT_MAX_SCALE: u32 = 4;

/// Prefix of the image reference handed out for a stored thumbnail.
pub const THUMB_PREFIX: &str = "thumb/";

/// Parameters selecting one rendered card variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRequest {
    pub style: CardStyle,
    pub scale: u32,
    pub custom_css: Option<String>,
}

impl Default for CardRequest {
    fn default() -> Self {
        Self { style: CardStyle::default(), scale: 1, custom_css: None }
    }
}

impl CardRequest {
    pub fn new(style: CardStyle, scale: u32) -> Self {
        Self { style, scale, custom_css: None }
    }

    pub fn with_custom_css(mut self, href: impl Into<String>) -> Self {
        self.custom_css = Some(href.into());
        self
    }

    /// Build a request from loosely typed tool parameters.
    pub fn parse(style: Option<&str>, scale: Option<u32>, custom_css: Option<String>) -> Result<Self, Error> {
        let style = match style {
            Some(name) => name.parse()?,
            None => CardStyle::default(),
        };
        Ok(Self { style, scale: scale.unwrap_or(1), custom_css: custom_css.filter(|css| !css.trim().is_empty()) })
    }

    fn validate(&self, max_scale: u32) -> Result<(), Error> {
        if !(1..=max_scale).contains(&self.scale) {
            return Err(Error::InvalidInput(format!("scale must be between 1 and {max_scale}, got {}", self.scale)));
        }
        if self.style == CardStyle::Custom && self.custom_css.is_none() {
            return Err(Error::InvalidStyle("Custom style requires a stylesheet URL".into()));
        }
        Ok(())
    }
}

/// Facade over the three caches with every collaborator injected.
pub struct PreviewService {
    store: Arc<dyn Store>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn MetadataExtractor>,
    codec: Arc<dyn ImageCodec>,
    renderer: Option<Arc<dyn Renderer>>,
    policy: FreshnessPolicy,
    max_scale: u32,
}

impl PreviewService {
    pub fn new(
        store: Arc<dyn Store>, fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn MetadataExtractor>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        Self {
            store,
            fetcher,
            extractor,
            codec,
            renderer: None,
            policy: FreshnessPolicy::default(),
            max_scale: DEFAULT_MAX_SCALE,
        }
    }

    /// Enable card rendering.
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_policy(mut self, policy: FreshnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_scale(mut self, max_scale: u32) -> Self {
        self.max_scale = max_scale;
        self
    }

    /// Apply the freshness floor and scale limit from configuration.
    pub fn configured(self, config: &AppConfig) -> Self {
        self.with_policy(config.freshness_policy()).with_max_scale(config.max_scale)
    }

    pub fn render_enabled(&self) -> bool {
        self.renderer.is_some()
    }

    /// MIME type of every stored image.
    pub fn image_mime_type(&self) -> &'static str {
        self.codec.mime_type()
    }

    /// Re-encode on the blocking pool.
    async fn reencode(&self, source: Vec<u8>) -> Result<Vec<u8>, Error> {
        let codec = Arc::clone(&self.codec);
        tokio::task::spawn_blocking(move || codec.reencode(&source))
            .await
            .map_err(|e| Error::CodecFailed(format!("codec task failed: {e}")))?
    }
}
