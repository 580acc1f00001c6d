//! Image records for thumbnails and rendered cards.
//!
//! Both artifact classes share one row layout but live in separate tables.
//! Their keys come from differently seeded address chains, so a thumbnail can
//! never be mistaken for a card.

use super::address::Address;
use super::connection::{CacheDb, decode_optional_timestamp, decode_timestamp, encode_timestamp};
use super::validators::Validators;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Which image table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Thumbnail,
    Card,
}

impl ImageKind {
    fn table(self) -> &'static str {
        match self {
            ImageKind::Thumbnail => "thumbnails",
            ImageKind::Card => "cards",
        }
    }
}

/// An encoded image and the validators it was derived under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub address: Address,
    /// URL the image was derived from (thumbnail origin or requested page).
    pub url: String,
    /// Encoded image bytes in the stored format.
    pub image: Vec<u8>,
    pub validators: Validators,
}

impl CacheDb {
    /// Insert or fully replace the image stored at `record.address`.
    pub async fn upsert_image(&self, kind: ImageKind, record: &ImageRecord) -> Result<(), Error> {
        let record = record.clone();
        let sql = format!(
            "INSERT INTO {table} (
                address, url, image, issued_at, expires_at, etag, last_modified
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(address) DO UPDATE SET
                url = excluded.url,
                image = excluded.image,
                issued_at = excluded.issued_at,
                expires_at = excluded.expires_at,
                etag = excluded.etag,
                last_modified = excluded.last_modified",
            table = kind.table()
        );
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    &sql,
                    params![
                        record.address.as_str(),
                        &record.url,
                        &record.image,
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

    /// Get an image by address.
    ///
    /// Returns None if nothing is stored at that address.
    pub async fn get_image(&self, kind: ImageKind, address: &Address) -> Result<Option<ImageRecord>, Error> {
        let address = address.clone();
        let sql = format!(
            "SELECT address, url, image, issued_at, expires_at, etag, last_modified
            FROM {table} WHERE address = ?1",
            table = kind.table()
        );
        self.conn
            .call(move |conn| -> Result<Option<ImageRecord>, Error> {
                let mut stmt = conn.prepare(&sql)?;

                let result = stmt.query_row(params![address.as_str()], |row| {
                    Ok(ImageRecord {
                        address: Address::from_stored(row.get(0)?),
                        url: row.get(1)?,
                        image: row.get(2)?,
                        validators: Validators {
                            issued_at: decode_timestamp(row, 3)?,
                            expires_at: decode_timestamp(row, 4)?,
                            etag: row.get(5)?,
                            last_modified: decode_optional_timestamp(row, 6)?,
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
