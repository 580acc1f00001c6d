//! SQLite-backed cache for page metadata and derived images.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - Content addressing of derived artifacts via a SHA-256 hash chain
//! - HTTP validator sets with a configurable freshness floor
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//!
//! Entries expire by time only. Nothing here deletes a record; an expired
//! entry is simply revalidated the next time it is asked for.

pub mod address;
pub mod connection;
pub mod images;
pub mod metadata;
pub mod migrations;
pub mod store;
pub mod validators;

pub use crate::Error;

pub use address::{Address, CARD_SEED, THUMBNAIL_SEED};
pub use connection::CacheDb;
pub use images::{ImageKind, ImageRecord};
pub use metadata::MetadataRecord;
pub use store::Store;
pub use validators::{FreshnessPolicy, Validators};
