//! Scripted collaborators for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use ogpcache_core::Error;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::fetch::{ConditionalHeaders, FetchResponse, Fetcher};
use crate::render::{RenderError, Renderer};

/// A canned origin response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl StubResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: body.into() }
    }

    pub fn not_modified() -> Self {
        Self { status: StatusCode::NOT_MODIFIED, headers: HeaderMap::new(), body: Bytes::new() }
    }

    pub fn status(code: u16) -> Self {
        Self {
            status: StatusCode::from_u16(code).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        self.headers.append(name, HeaderValue::from_str(value).unwrap());
        self
    }
}

/// Replays scripted responses per URL and records every request.
#[derive(Default)]
pub struct StubFetcher {
    scripts: Mutex<HashMap<String, VecDeque<StubResponse>>>,
    requests: Mutex<Vec<(String, ConditionalHeaders)>>,
}

impl StubFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, url: &str, response: StubResponse) {
        self.scripts.lock().unwrap().entry(url.to_string()).or_default().push_back(response);
    }

    pub fn requests(&self) -> Vec<(String, ConditionalHeaders)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn send(&self, url: &str, conditional: &ConditionalHeaders) -> Result<FetchResponse, Error> {
        self.requests.lock().unwrap().push((url.to_string(), conditional.clone()));
        let next = self.scripts.lock().unwrap().get_mut(url).and_then(VecDeque::pop_front);
        let Some(response) = next else {
            return Err(Error::HttpError(format!("no scripted response for {url}")));
        };
        Ok(FetchResponse {
            url: url.to_string(),
            status: response.status,
            headers: response.headers,
            body: response.body,
            fetch_ms: 0,
        })
    }
}

/// Counts renders and answers with a small PNG.
#[derive(Default)]
pub struct StubRenderer {
    renders: AtomicUsize,
    last_html: Mutex<Option<String>>,
}

impl StubRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn last_html(&self) -> Option<String> {
        self.last_html.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render(&self, html: &str, scale: u32) -> Result<Vec<u8>, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().unwrap() = Some(html.to_string());
        Ok(png_bytes(60 * scale, 32 * scale))
    }
}

/// A solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 80, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A page carrying the usual OGP tags.
pub fn ogp_page(url: &str, image: &str, description: Option<&str>) -> String {
    let description = description
        .map(|d| format!(r#"<meta property="og:description" content="{d}">"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Fallback title</title>
  <meta property="og:url" content="{url}">
  <meta property="og:title" content="Example Post">
  <meta property="og:type" content="article">
  <meta property="og:image" content="{image}">
  <meta property="og:site_name" content="Example">
  <meta property="og:locale" content="en_US">
  {description}
</head>
<body><p>hello</p></body>
</html>"#
    )
}

/// A service over an in-memory store with scripted collaborators.
pub struct Harness {
    pub service: crate::preview::PreviewService,
    pub db: Arc<ogpcache_core::CacheDb>,
    pub fetcher: Arc<StubFetcher>,
    pub renderer: Arc<StubRenderer>,
}

impl Harness {
    pub async fn new() -> Self {
        let db = Arc::new(ogpcache_core::CacheDb::open_in_memory().await.unwrap());
        let fetcher = StubFetcher::new();
        let renderer = StubRenderer::new();
        let service = crate::preview::PreviewService::new(
            db.clone(),
            fetcher.clone(),
            Arc::new(crate::extract::OgpExtractor::new()),
            Arc::new(crate::codec::WebpCodec),
        )
        .with_renderer(renderer.clone());
        Self { service, db, fetcher, renderer }
    }

    /// Script a page at `url` and a PNG at `image`.
    pub fn script_page(&self, url: &str, image: &str, page: StubResponse) {
        self.fetcher.script(url, page);
        self.fetcher.script(image, StubResponse::ok(png_bytes(16, 9)));
    }
}
