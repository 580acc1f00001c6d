use ogpcache_core::{Error, MetadataRecord};

use super::PreviewService;
use crate::extract::decode_html;
use crate::fetch::canonicalize;
use crate::revalidate::{Revalidation, revalidate};

impl PreviewService {
    /// Social-preview metadata for `url`, refreshed from the origin when stale.
    ///
    /// A 304 only advances the stored record's expiry. A changed page is
    /// re-extracted, its thumbnail refreshed, and the record replaced whole.
    pub async fn get_metadata(&self, url: &str) -> Result<MetadataRecord, Error> {
        if url.trim().is_empty() {
            return Err(Error::InvalidInput("url must not be empty".into()));
        }

        let stored = self.store.get_metadata(url).await?;
        if let Some(record) = &stored
            && record.validators.is_fresh()
        {
            tracing::debug!(url, "metadata cache hit");
            return Ok(record.clone());
        }

        let previous = stored.as_ref().map(|r| &r.validators);
        let record = match revalidate(self.fetcher.as_ref(), url, previous, &self.policy).await? {
            Revalidation::NotModified(validators) => {
                let mut record = stored
                    .ok_or_else(|| Error::ProtocolViolation(format!("{url} not modified but nothing cached")))?;
                record.validators = validators;
                record
            }
            Revalidation::Modified { body, content_type, validators } => {
                let base = canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
                let html = decode_html(&body, content_type.as_deref());
                let page = self.extractor.extract(&html, &base)?;
                let (thumbnail, _) = self.get_thumbnail(&page.image).await?;

                MetadataRecord {
                    origin: url.to_string(),
                    url: page.url,
                    title: page.title,
                    og_type: page.og_type,
                    thumbnail,
                    site_name: page.site_name,
                    description: page.description,
                    locale: page.locale,
                    validators,
                }
            }
        };

        self.store.upsert_metadata(&record).await?;
        tracing::info!(url, expires_at = %record.validators.expires_at, "metadata stored");
        Ok(record)
    }
}
