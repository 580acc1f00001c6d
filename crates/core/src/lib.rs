//! Core types and shared functionality for ogp-cache.
//!
//! This crate provides:
//! - Content addressing and HTTP validator bookkeeping
//! - Metadata and image records with a SQLite-backed store
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Address, CacheDb, FreshnessPolicy, ImageKind, ImageRecord, MetadataRecord, Store, Validators};
pub use config::AppConfig;
pub use error::Error;
