//! ogp_info tool implementation.
//!
//! Returns the cached social-preview metadata for a URL, revalidating it
//! against the origin when stale.

use ogpcache_client::PreviewService;
use ogpcache_core::{Error, MetadataRecord};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{THUMB_PREFIX, ValidatorsOutput, to_json};

/// Parameters for the ogp_info tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OgpInfoParams {
    /// The page URL. It is also the cache key, so use the same spelling on every call.
    pub url: String,
}

/// Output from the ogp_info tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct OgpInfoOutput {
    /// The URL as requested.
    pub origin: String,
    /// Canonical URL declared by the page.
    pub url: String,
    pub title: String,
    #[serde(rename = "type")]
    pub og_type: String,
    /// Thumbnail reference, `thumb/<address>`; pass the address to `ogp_thumb`.
    pub image: String,
    pub site_name: Option<String>,
    pub description: Option<String>,
    pub locale: Option<String>,
    pub validators: ValidatorsOutput,
}

impl From<&MetadataRecord> for OgpInfoOutput {
    fn from(record: &MetadataRecord) -> Self {
        Self {
            origin: record.origin.clone(),
            url: record.url.clone(),
            title: record.title.clone(),
            og_type: record.og_type.clone(),
            image: format!("{THUMB_PREFIX}{}", record.thumbnail),
            site_name: record.site_name.clone(),
            description: record.description.clone(),
            locale: record.locale.clone(),
            validators: ValidatorsOutput::from(&record.validators),
        }
    }
}

/// Implementation of the ogp_info tool.
pub async fn info_impl(service: &PreviewService, params: OgpInfoParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let record = service.get_metadata(&params.url).await?;
    let output = OgpInfoOutput::from(&record);

    Ok(CallToolResult::success(vec![Content::text(to_json(&output)?)]))
}
