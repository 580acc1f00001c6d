//! MCP tool implementations.
//!
//! This module contains all tools exposed by the ogp-cache server. Each tool
//! parses its parameters, calls one [`PreviewService`] operation, and renders
//! the result as JSON text plus, for images, an image content block. `ogp_embed`
//! answers with the card HTML itself.

pub mod card;
pub mod embed;
pub mod info;
pub mod thumb;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use ogpcache_client::PreviewService;
use ogpcache_core::{Address, ImageRecord, Validators};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::Serialize;

pub use card::OgpCardParams;
pub use embed::OgpEmbedParams;
pub use info::OgpInfoParams;
pub use thumb::OgpThumbParams;

pub use ogpcache_client::THUMB_PREFIX;

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Revalidation state as reported to tool clients.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ValidatorsOutput {
    /// RFC 3339 time the origin issued this version.
    pub issued_at: String,
    /// RFC 3339 time after which the entry is revalidated.
    pub expires_at: String,
    pub etag: Option<String>,
    /// RFC 3339 `Last-Modified` of the origin, if it sent one.
    pub last_modified: Option<String>,
}

impl From<&Validators> for ValidatorsOutput {
    fn from(v: &Validators) -> Self {
        Self {
            issued_at: timestamp(&v.issued_at),
            expires_at: timestamp(&v.expires_at),
            etag: v.etag.clone(),
            last_modified: v.last_modified.as_ref().map(timestamp),
        }
    }
}

/// Summary of a stored image; the bytes travel as a separate content block.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ImageOutput {
    /// Content address of the image.
    pub address: String,
    /// URL the image was derived from.
    pub url: String,
    pub mime_type: String,
    /// Encoded size in bytes.
    pub size: usize,
    pub validators: ValidatorsOutput,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("failed to serialize output: {e}"), None))
}

/// JSON summary plus the image itself.
pub(crate) fn image_result(service: &PreviewService, address: &Address, record: &ImageRecord) -> Result<CallToolResult, McpError> {
    let mime_type = service.image_mime_type();
    let output = ImageOutput {
        address: address.to_string(),
        url: record.url.clone(),
        mime_type: mime_type.to_string(),
        size: record.image.len(),
        validators: ValidatorsOutput::from(&record.validators),
    };

    Ok(CallToolResult::success(vec![
        Content::text(to_json(&output)?),
        Content::image(STANDARD.encode(&record.image), mime_type),
    ]))
}
