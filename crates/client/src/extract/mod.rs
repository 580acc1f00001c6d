//! Open Graph metadata extraction.
//!
//! ### Rules
//! - Reads `<meta property="og:*" content="...">`, also accepting `name=`.
//! - The first occurrence of each property wins.
//! - `og:url` and `og:image` resolve against the page URL when relative; a
//!   page missing either cannot be previewed.
//! - `og:title` falls back to `<title>`, then to the empty string.
//! - `og:type` falls back to `website`.

mod charset;

pub use charset::decode_html;

use ogpcache_core::Error;
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Social-preview fields read from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    /// Canonical URL, absolute.
    pub url: String,
    pub title: String,
    pub og_type: String,
    /// Thumbnail URL, absolute.
    pub image: String,
    pub site_name: Option<String>,
    pub description: Option<String>,
    pub locale: Option<String>,
}

/// Stable extractor trait so the HTML engine can be swapped.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, html: &str, base_url: &Url) -> Result<PageMetadata, Error>;
}

/// `scraper`-based Open Graph reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct OgpExtractor;

impl OgpExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::ExtractFailed(format!("invalid selector {css}: {e}")))
}

fn resolve(base_url: &Url, raw: Option<String>, property: &str) -> Result<String, Error> {
    let raw = raw.ok_or_else(|| Error::ExtractFailed(format!("page has no {property}")))?;
    base_url
        .join(&raw)
        .map(|u| u.to_string())
        .map_err(|e| Error::ExtractFailed(format!("{property} {raw:?} is not a URL: {e}")))
}

impl MetadataExtractor for OgpExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> Result<PageMetadata, Error> {
        let document = Html::parse_document(html);
        let meta = selector("meta[content]")?;

        let mut properties: HashMap<String, String> = HashMap::new();
        for element in document.select(&meta) {
            let el = element.value();
            let Some(key) = el.attr("property").or_else(|| el.attr("name")) else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            if !key.starts_with("og:") {
                continue;
            }
            let content = el.attr("content").unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            properties.entry(key).or_insert_with(|| content.to_string());
        }

        let url = resolve(base_url, properties.remove("og:url"), "og:url")?;
        let image = resolve(base_url, properties.remove("og:image"), "og:image")?;

        let title = match properties.remove("og:title") {
            Some(title) => title,
            None => {
                let title_selector = selector("title")?;
                document
                    .select(&title_selector)
                    .next()
                    .map(|t| t.text().collect::<String>().trim().to_string())
                    .unwrap_or_default()
            }
        };

        Ok(PageMetadata {
            url,
            title,
            og_type: properties.remove("og:type").unwrap_or_else(|| "website".to_string()),
            image,
            site_name: properties.remove("og:site_name"),
            description: properties.remove("og:description"),
            locale: properties.remove("og:locale"),
        })
    }
}
