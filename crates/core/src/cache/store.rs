//! Storage capability consumed by the preview pipeline.
//!
//! The pipeline only ever needs keyed reads and whole-record upserts, so the
//! trait is deliberately that small. [`CacheDb`] is the SQLite implementation.

use super::address::Address;
use super::connection::CacheDb;
use super::images::{ImageKind, ImageRecord};
use super::metadata::MetadataRecord;
use crate::Error;

/// Keyed get/upsert access to metadata and image records.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Metadata stored for the exact requested URL.
    async fn get_metadata(&self, origin: &str) -> Result<Option<MetadataRecord>, Error>;

    /// Insert, or fully replace, the record keyed by `record.origin`.
    async fn upsert_metadata(&self, record: &MetadataRecord) -> Result<(), Error>;

    async fn get_image(&self, kind: ImageKind, address: &Address) -> Result<Option<ImageRecord>, Error>;

    async fn upsert_image(&self, kind: ImageKind, record: &ImageRecord) -> Result<(), Error>;
}

#[async_trait::async_trait]
impl Store for CacheDb {
    async fn get_metadata(&self, origin: &str) -> Result<Option<MetadataRecord>, Error> {
        CacheDb::get_metadata(self, origin).await
    }

    async fn upsert_metadata(&self, record: &MetadataRecord) -> Result<(), Error> {
        CacheDb::upsert_metadata(self, record).await
    }

    async fn get_image(&self, kind: ImageKind, address: &Address) -> Result<Option<ImageRecord>, Error> {
        CacheDb::get_image(self, kind, address).await
    }

    async fn upsert_image(&self, kind: ImageKind, record: &ImageRecord) -> Result<(), Error> {
        CacheDb::upsert_image(self, kind, record).await
    }
}
