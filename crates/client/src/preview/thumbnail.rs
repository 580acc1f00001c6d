use ogpcache_core::{Address, Error, ImageKind, ImageRecord};

use super::PreviewService;
use crate::revalidate::{Revalidation, revalidate};

impl PreviewService {
    /// Re-encoded thumbnail for `origin_url`, keyed by its thumbnail address.
    pub async fn get_thumbnail(&self, origin_url: &str) -> Result<(Address, ImageRecord), Error> {
        let address = Address::thumbnail(origin_url);
        let stored = self.store.get_image(ImageKind::Thumbnail, &address).await?;
        if let Some(record) = &stored
            && record.validators.is_fresh()
        {
            tracing::debug!(url = origin_url, %address, "thumbnail cache hit");
            return Ok((address, record.clone()));
        }

        let previous = stored.as_ref().map(|r| &r.validators);
        let record = match revalidate(self.fetcher.as_ref(), origin_url, previous, &self.policy).await? {
            Revalidation::NotModified(validators) => {
                let mut record = stored.ok_or_else(|| {
                    Error::ProtocolViolation(format!("{origin_url} not modified but nothing cached"))
                })?;
                record.validators = validators;
                record
            }
            Revalidation::Modified { body, validators, .. } => {
                let image = self.reencode(body.to_vec()).await?;
                ImageRecord { address: address.clone(), url: origin_url.to_string(), image, validators }
            }
        };

        self.store.upsert_image(ImageKind::Thumbnail, &record).await?;
        tracing::info!(url = origin_url, %address, bytes = record.image.len(), "thumbnail stored");
        Ok((address, record))
    }

    /// Stored image at `address`, without touching the origin.
    ///
    /// Card addresses are looked up too, so any address handed out by this
    /// service resolves.
    pub async fn get_thumbnail_bytes(&self, address: &Address) -> Result<ImageRecord, Error> {
        for kind in [ImageKind::Thumbnail, ImageKind::Card] {
            if let Some(record) = self.store.get_image(kind, address).await? {
                return Ok(record);
            }
        }
        Err(Error::CacheMiss(format!("no image stored at {address}")))
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{Harness, StubResponse, png_bytes};
    use chrono::{Duration, Utc};
    use ogpcache_core::{Address, Error, ImageKind};
    use reqwest::header;

    const THUMB: &str = "http://example.com/t.jpg";

    #[tokio::test]
    async fn test_thumbnail_is_reencoded_and_stored() {
        let h = Harness::new().await;
        h.fetcher.script(THUMB, StubResponse::ok(png_bytes(20, 10)));

        let (address, record) = h.service.get_thumbnail(THUMB).await.unwrap();
        assert_eq!(address, Address::thumbnail(THUMB));
        assert_eq!(record.address, address);
        assert_eq!(image::guess_format(&record.image).unwrap(), image::ImageFormat::WebP);
        assert_eq!(h.db.get_image(ImageKind::Thumbnail, &address).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_fresh_thumbnail_skips_network() {
        let h = Harness::new().await;
        h.fetcher.script(THUMB, StubResponse::ok(png_bytes(20, 10)));

        h.service.get_thumbnail(THUMB).await.unwrap();
        h.service.get_thumbnail(THUMB).await.unwrap();
        assert_eq!(h.fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_thumbnail_not_modified_keeps_bytes() {
        let h = Harness::new().await;
        h.fetcher.script(THUMB, StubResponse::ok(png_bytes(20, 10)).header(header::ETAG, "\"t1\""));
        let (address, first) = h.service.get_thumbnail(THUMB).await.unwrap();

        let mut stale = first.clone();
        stale.validators.expires_at = Utc::now() - Duration::seconds(1);
        h.db.upsert_image(ImageKind::Thumbnail, &stale).await.unwrap();
        h.fetcher.script(THUMB, StubResponse::not_modified());

        let (_, second) = h.service.get_thumbnail(THUMB).await.unwrap();
        assert_eq!(second.image, first.image);
        assert_eq!(second.validators.etag.as_deref(), Some("\"t1\""));
        assert!(second.validators.is_fresh());
        assert_eq!(h.db.get_image(ImageKind::Thumbnail, &address).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_undecodable_thumbnail_is_codec_failure() {
        let h = Harness::new().await;
        h.fetcher.script(THUMB, StubResponse::ok("<html>oops</html>"));

        let result = h.service.get_thumbnail(THUMB).await;
        assert!(matches!(result, Err(Error::CodecFailed(_))));
        let address = Address::thumbnail(THUMB);
        assert_eq!(h.db.get_image(ImageKind::Thumbnail, &address).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_thumbnail_bytes_pass_through() {
        let h = Harness::new().await;
        h.fetcher.script(THUMB, StubResponse::ok(png_bytes(20, 10)));
        let (address, record) = h.service.get_thumbnail(THUMB).await.unwrap();

        assert_eq!(h.service.get_thumbnail_bytes(&address).await.unwrap(), record);
        assert_eq!(h.fetcher.request_count(), 1);

        let unknown = Address::thumbnail("http://example.com/other.png");
        assert!(matches!(h.service.get_thumbnail_bytes(&unknown).await, Err(Error::CacheMiss(_))));
    }
}
