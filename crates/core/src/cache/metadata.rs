//! Page metadata records.
//!
//! One row per requested URL. A successful refresh replaces the whole row;
//! a 304 only rewrites the validator columns of the same record.

use super::address::Address;
use super::connection::{CacheDb, decode_optional_timestamp, decode_timestamp, encode_timestamp};
use super::validators::Validators;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Social-preview metadata cached for one requested URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// The exact URL the caller asked for (storage key).
    pub origin: String,
    /// Canonical URL declared by the page (`og:url`).
    pub url: String,
    pub title: String,
    #[serde(rename = "type")]
    pub og_type: String,
    /// Address of the re-encoded thumbnail in the thumbnail table.
    pub thumbnail: Address,
    pub site_name: Option<String>,
    pub description: Option<String>,
    pub locale: Option<String>,
    pub validators: Validators,
}

impl CacheDb {
    /// Insert or fully replace the metadata record for `record.origin`.
    pub async fn upsert_metadata(&self, record: &MetadataRecord) -> Result<(), Error> {
        let record = record.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO metadata (
                    origin, url, title, type, thumbnail, site_name, description, locale,
                    issued_at, expires_at, etag, last_modified
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT(origin) DO UPDATE SET
                    url = excluded.url,
                    title = excluded.title,
                    type = excluded.type,
                    thumbnail = excluded.thumbnail,
                    site_name = excluded.site_name,
                    description = excluded.description,
                    locale = excluded.locale,
                    issued_at = excluded.issued_at,
                    expires_at = excluded.expires_at,
                    etag = excluded.etag,
                    last_modified = excluded.last_modified",
                    params![
                        &record.origin,
                        &record.url,
                        &record.title,
                        &record.og_type,
                        record.thumbnail.as_str(),
                        &record.site_name,
                        &record.description,
                        &record.locale,
                        encode_timestamp(&record.validators.issued_at),
                        encode_timestamp(&record.validators.expires_at),
                        &record.validators.etag,
                        record.validators.last_modified.as_ref().map(encode_timestamp),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the metadata record stored for a requested URL.
    pub async fn get_metadata(&self, origin: &str) -> Result<Option<MetadataRecord>, Error> {
        let origin = origin.to_string();
        self.conn
            .call(move |conn| -> Result<Option<MetadataRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT
                    origin, url, title, type, thumbnail, site_name, description, locale,
                    issued_at, expires_at, etag, last_modified
                FROM metadata WHERE origin = ?1",
                )?;

                let result = stmt.query_row(params![origin], |row| {
                    Ok(MetadataRecord {
                        origin: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        og_type: row.get(3)?,
                        thumbnail: Address::from_stored(row.get(4)?),
                        site_name: row.get(5)?,
                        description: row.get(6)?,
                        locale: row.get(7)?,
                        validators: Validators {
                            issued_at: decode_timestamp(row, 8)?,
                            expires_at: decode_timestamp(row, 9)?,
                            etag: row.get(10)?,
                            last_modified: decode_optional_timestamp(row, 11)?,
                        },
                    })
                });

                match result {
                    Ok(record) => Ok(Some(record)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
