use ogpcache_core::{Address, Error, ImageKind, ImageRecord};

use super::{CardRequest, PreviewService, THUMB_PREFIX};
use crate::render::{CardContent, CardImage, CardStyle, compose_card_html};

impl PreviewService {
    /// Rendered card for `url` in the requested variant.
    ///
    /// A stored card is reused only while it is unexpired and was rendered
    /// from the metadata version that is current now.
    pub async fn get_card(&self, url: &str, request: &CardRequest) -> Result<(Address, ImageRecord), Error> {
        request.validate(self.max_scale)?;

        let metadata = self.get_metadata(url).await?;
        let address = Address::card(&metadata.url, request.style.as_str(), request.scale, request.custom_css.as_deref());

        if let Some(card) = self.store.get_image(ImageKind::Card, &address).await? {
            if card.validators.is_fresh() && card.validators.same_version(&metadata.validators) {
                tracing::debug!(url, %address, "card cache hit");
                return Ok((address, card));
            }
            tracing::debug!(url, %address, "card outdated");
        }

        let renderer = self.renderer.as_ref().ok_or(Error::RenderDisabled)?;
        let thumbnail = self
            .store
            .get_image(ImageKind::Thumbnail, &metadata.thumbnail)
            .await?
            .ok_or_else(|| Error::CacheMiss(format!("thumbnail {} for {url}", metadata.thumbnail)))?;

        let content = CardContent {
            title: &metadata.title,
            url: &metadata.url,
            description: metadata.description.as_deref(),
            site_name: metadata.site_name.as_deref(),
            image: CardImage::Inline { bytes: &thumbnail.image, mime: self.codec.mime_type() },
        };
        let html = compose_card_html(request.style, &content, request.custom_css.as_deref())?;

        let png = renderer.render(&html, request.scale).await?;
        let image = self.reencode(png).await?;

        let record = ImageRecord { address: address.clone(), url: url.to_string(), image, validators: metadata.validators };
        self.store.upsert_image(ImageKind::Card, &record).await?;
        tracing::info!(url, %address, style = %request.style, scale = request.scale, "card stored");
        Ok((address, record))
    }

    /// Card document for `url` with the image linked as `thumb/<address>`.
    ///
    /// Nothing is rendered or stored; the document is meant to be served
    /// next to the thumbnail endpoint.
    pub async fn get_embed(&self, url: &str, style: CardStyle, custom_css: Option<&str>) -> Result<String, Error> {
        if style == CardStyle::Custom && custom_css.is_none_or(|css| css.trim().is_empty()) {
            return Err(Error::InvalidStyle("Custom style requires a stylesheet URL".into()));
        }

        let metadata = self.get_metadata(url).await?;
        let image = format!("{THUMB_PREFIX}{}", metadata.thumbnail);
        let content = CardContent {
            title: &metadata.title,
            url: &metadata.url,
            description: metadata.description.as_deref(),
            site_name: metadata.site_name.as_deref(),
            image: CardImage::Link(&image),
        };
        compose_card_html(style, &content, custom_css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, StubResponse, ogp_page};
    use chrono::{Duration, Utc};
    use ogpcache_core::{MetadataRecord, Validators};
    use reqwest::header;
    use std::sync::Arc;

    const PAGE: &str = "http://example.com/a";
    const THUMB: &str = "http://example.com/t.jpg";

    async fn expire_metadata(h: &Harness) {
        let mut stale = h.db.get_metadata(PAGE).await.unwrap().unwrap();
        stale.validators.expires_at = Utc::now() - Duration::minutes(1);
        h.db.upsert_metadata(&stale).await.unwrap();
    }

    #[tokio::test]
    async fn test_card_inherits_metadata_validators() {
        let h = Harness::new().await;
        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, Some("desc"))).header(header::ETAG, "\"e1\""));

        let request = CardRequest::new(CardStyle::Portrait, 2);
        let (address, card) = h.service.get_card(PAGE, &request).await.unwrap();
        let metadata = h.db.get_metadata(PAGE).await.unwrap().unwrap();

        assert_eq!(address, Address::card(PAGE, "Portrait", 2, None));
        assert_eq!(card.url, PAGE);
        assert_eq!(card.validators, metadata.validators);
        assert_eq!(image::guess_format(&card.image).unwrap(), image::ImageFormat::WebP);
        assert_eq!(h.db.get_image(ImageKind::Card, &address).await.unwrap(), Some(card));

        let html = h.renderer.last_html().unwrap();
        assert!(html.contains("Example Post"));
        assert!(html.contains("data:image/webp;base64,"));
    }

    #[tokio::test]
    async fn test_card_reused_while_metadata_unchanged() {
        let h = Harness::new().await;
        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, None)).header(header::ETAG, "\"e1\""));

        let request = CardRequest::default();
        let (a1, first) = h.service.get_card(PAGE, &request).await.unwrap();
        let (a2, second) = h.service.get_card(PAGE, &request).await.unwrap();
        assert_eq!(a1, a2);
        assert_eq!(first, second);
        assert_eq!(h.renderer.render_count(), 1);
    }

    #[tokio::test]
    async fn test_metadata_change_forces_rerender() {
        let h = Harness::new().await;
        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, None)).header(header::ETAG, "\"e1\""));

        let request = CardRequest::new(CardStyle::Landscape, 1);
        let (address, first) = h.service.get_card(PAGE, &request).await.unwrap();
        h.service.get_card(PAGE, &request).await.unwrap();
        assert_eq!(h.renderer.render_count(), 1);

        expire_metadata(&h).await;
        h.fetcher.script(PAGE, StubResponse::ok(ogp_page(PAGE, THUMB, None)).header(header::ETAG, "\"e2\""));

        let stored = h.db.get_image(ImageKind::Card, &address).await.unwrap().unwrap();
        assert!(stored.validators.is_fresh());

        let (again, second) = h.service.get_card(PAGE, &request).await.unwrap();
        assert_eq!(again, address);
        assert_eq!(h.renderer.render_count(), 2);
        assert_eq!(first.validators.etag.as_deref(), Some("\"e1\""));
        assert_eq!(second.validators.etag.as_deref(), Some("\"e2\""));
    }

    #[tokio::test]
    async fn test_not_modified_metadata_rerenders_with_new_expiry() {
        let h = Harness::new().await;
        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, None)).header(header::ETAG, "\"e1\""));

        let request = CardRequest::default();
        let (address, _) = h.service.get_card(PAGE, &request).await.unwrap();

        let mut stale_card = h.db.get_image(ImageKind::Card, &address).await.unwrap().unwrap();
        stale_card.validators.expires_at = Utc::now() - Duration::minutes(1);
        h.db.upsert_image(ImageKind::Card, &stale_card).await.unwrap();
        expire_metadata(&h).await;
        h.fetcher.script(PAGE, StubResponse::not_modified());

        let (_, card) = h.service.get_card(PAGE, &request).await.unwrap();
        assert_eq!(h.renderer.render_count(), 2);
        assert!(card.validators.is_fresh());
        assert_eq!(card.validators.etag.as_deref(), Some("\"e1\""));
    }

    #[tokio::test]
    async fn test_variants_get_distinct_addresses() {
        let h = Harness::new().await;
        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, None)));

        let (one, _) = h.service.get_card(PAGE, &CardRequest::new(CardStyle::Landscape, 1)).await.unwrap();
        let (two, _) = h.service.get_card(PAGE, &CardRequest::new(CardStyle::Landscape, 2)).await.unwrap();
        let custom = CardRequest::new(CardStyle::Custom, 1).with_custom_css("https://cdn.example.com/c.css");
        let (three, _) = h.service.get_card(PAGE, &custom).await.unwrap();

        assert_ne!(one, two);
        assert_ne!(one, three);
        assert_eq!(h.renderer.render_count(), 3);
        assert!(h.renderer.last_html().unwrap().contains(r#"href="https://cdn.example.com/c.css""#));
    }

    #[tokio::test]
    async fn test_render_disabled_without_renderer() {
        let h = Harness::new().await;
        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, None)));
        let service = super::PreviewService::new(
            h.db.clone(),
            h.fetcher.clone(),
            Arc::new(crate::extract::OgpExtractor::new()),
            Arc::new(crate::codec::WebpCodec),
        );

        let result = service.get_card(PAGE, &CardRequest::default()).await;
        assert!(matches!(result, Err(Error::RenderDisabled)));
        assert!(h.db.get_metadata(PAGE).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_thumbnail_record_is_cache_miss() {
        let h = Harness::new().await;
        let now = Utc::now();
        let thumbnail = Address::thumbnail(THUMB);
        let metadata = MetadataRecord {
            origin: PAGE.into(),
            url: PAGE.into(),
            title: "Example Post".into(),
            og_type: "article".into(),
            thumbnail: thumbnail.clone(),
            site_name: None,
            description: None,
            locale: None,
            validators: Validators { issued_at: now, expires_at: now + Duration::hours(1), etag: None, last_modified: None },
        };
        h.db.upsert_metadata(&metadata).await.unwrap();

        let request = CardRequest::default();
        let result = h.service.get_card(PAGE, &request).await;
        assert!(matches!(result, Err(Error::CacheMiss(_))));

        let address = Address::card(PAGE, request.style.as_str(), request.scale, None);
        assert_eq!(h.db.get_image(ImageKind::Card, &address).await.unwrap(), None);
        assert_eq!(h.db.get_image(ImageKind::Thumbnail, &thumbnail).await.unwrap(), None);
        assert_eq!(h.fetcher.request_count(), 0);
        assert_eq!(h.renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_embed_links_thumbnail_without_rendering() {
        let h = Harness::new().await;
        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, Some("desc"))));

        let html = h.service.get_embed(PAGE, CardStyle::Compact, None).await.unwrap();
        let thumbnail = Address::thumbnail(THUMB);
        assert!(html.contains(&format!(r#"<img src="thumb/{thumbnail}""#)));
        assert!(html.contains("ogp-card-compact"));
        assert!(html.contains("Example Post"));
        assert!(!html.contains("data:image"));
        assert_eq!(h.renderer.render_count(), 0);
        assert!(h.db.get_image(ImageKind::Thumbnail, &thumbnail).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_embed_custom_style_needs_stylesheet() {
        let h = Harness::new().await;
        let result = h.service.get_embed(PAGE, CardStyle::Custom, Some(" ")).await;
        assert!(matches!(result, Err(Error::InvalidStyle(_))));
        assert_eq!(h.fetcher.request_count(), 0);

        h.script_page(PAGE, THUMB, StubResponse::ok(ogp_page(PAGE, THUMB, None)));
        let html = h.service.get_embed(PAGE, CardStyle::Custom, Some("https://cdn.example.com/c.css")).await.unwrap();
        assert!(html.contains(r#"<link rel="stylesheet" href="https://cdn.example.com/c.css">"#));
    }

    #[tokio::test]
    async fn test_invalid_requests_fail_before_fetching() {
        let h = Harness::new().await;

        let too_big = CardRequest::new(CardStyle::Landscape, 9);
        assert!(matches!(h.service.get_card(PAGE, &too_big).await, Err(Error::InvalidInput(_))));

        let no_css = CardRequest::new(CardStyle::Custom, 1);
        assert!(matches!(h.service.get_card(PAGE, &no_css).await, Err(Error::InvalidStyle(_))));

        assert_eq!(h.fetcher.request_count(), 0);
    }
}
