//! Card rasterisation.
//!
//! Cards are composed as standalone HTML ([`template`]) and handed to a
//! [`Renderer`], which screenshots only the `.ogp-card` element. The headless
//! Chromium implementation is feature-gated behind `render`.

pub mod template;

use thiserror::Error;

pub use template::{CARD_SELECTOR, CardContent, CardImage, CardStyle, compose_card_html};

/// Errors that can occur during card rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to open a page or load the card document.
    #[error("page setup failed: {0}")]
    Page(String),

    /// Card element not present in the composed document.
    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    /// Screenshot capture failed.
    #[error("screenshot failed: {0}")]
    Screenshot(String),

    /// Timeout waiting for the render to finish.
    #[error("render timeout after {0}ms")]
    Timeout(u64),
}

impl From<RenderError> for ogpcache_core::Error {
    fn from(err: RenderError) -> Self {
        ogpcache_core::Error::RenderFailed(err.to_string())
    }
}

/// Rasterises composed card HTML.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Render `html` at `scale` device pixels per CSS pixel, returning PNG
    /// bytes of the card element only.
    async fn render(&self, html: &str, scale: u32) -> Result<Vec<u8>, RenderError>;
}

/// Options for the headless renderer.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Timeout in milliseconds (default: 30000).
    pub timeout_ms: u64,

    /// Viewport dimensions in CSS pixels (default: 1280x720).
    pub viewport: (u32, u32),

    /// Element captured by the screenshot (default: `.ogp-card`).
    pub selector: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 30000, viewport: (1280, 720), selector: CARD_SELECTOR.to_string() }
    }
}

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;

#[cfg(feature = "render")]
mod headless {
    use super::{RenderError, RenderOptions, Renderer};
    use chromiumoxide::Page;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport};
    use chromiumoxide::page::ScreenshotParams;
    use futures_util::StreamExt;
    use std::time::Duration;

    /// Headless Chrome/Chromium renderer using chromiumoxide.
    pub struct HeadlessRenderer {
        browser: Browser,
        opts: RenderOptions,
    }

    impl HeadlessRenderer {
        /// Launch a headless browser instance.
        ///
        /// A background task drives the Chrome DevTools Protocol event stream
        /// for as long as the browser lives.
        pub async fn new(opts: RenderOptions) -> Result<Self, RenderError> {
            let (width, height) = opts.viewport;
            let (browser, mut handler) =
                Browser::launch(BrowserConfig::builder().window_size(width, height).build().map_err(RenderError::BrowserLaunch)?)
                    .await
                    .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!("browser handler event error: {e}");
                        break;
                    }
                }
            });

            Ok(Self { browser, opts })
        }

        async fn capture(&self, page: &Page, html: &str, scale: u32) -> Result<Vec<u8>, RenderError> {
            let (width, height) = self.opts.viewport;
            page.execute(SetDeviceMetricsOverrideParams::new(i64::from(width), i64::from(height), f64::from(scale), false))
                .await
                .map_err(|e| RenderError::Page(e.to_string()))?;

            page.set_content(html).await.map_err(|e| RenderError::Page(e.to_string()))?;

            let element = page
                .find_element(self.opts.selector.as_str())
                .await
                .map_err(|_| RenderError::SelectorNotFound(self.opts.selector.clone()))?;

            let bounds = element
                .scroll_into_view()
                .await
                .map_err(|e| RenderError::Screenshot(e.to_string()))?
                .bounding_box()
                .await
                .map_err(|e| RenderError::Screenshot(e.to_string()))?;

            // Transparent outside the card so rounded corners survive.
            let params = ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .omit_background(true)
                .clip(Viewport { x: bounds.x, y: bounds.y, width: bounds.width, height: bounds.height, scale: 1.0 })
                .build();
            page.screenshot(params).await.map_err(|e| RenderError::Screenshot(e.to_string()))
        }
    }

    #[async_trait::async_trait]
    impl Renderer for HeadlessRenderer {
        async fn render(&self, html: &str, scale: u32) -> Result<Vec<u8>, RenderError> {
            let start = std::time::Instant::now();
            let page = self.browser.new_page("about:blank").await.map_err(|e| RenderError::Page(e.to_string()))?;

            let result = tokio::time::timeout(Duration::from_millis(self.opts.timeout_ms), self.capture(&page, html, scale))
                .await
                .map_err(|_| RenderError::Timeout(self.opts.timeout_ms))
                .and_then(|inner| inner);

            page.close().await.ok();

            tracing::debug!(scale, render_ms = start.elapsed().as_millis() as u64, ok = result.is_ok(), "card rendered");
            result
        }
    }
}
