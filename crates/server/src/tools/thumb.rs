//! ogp_thumb tool implementation.
//!
//! Pass-through read of a stored image by content address. Never contacts
//! the origin.

use ogpcache_client::PreviewService;
use ogpcache_core::Address;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{THUMB_PREFIX, image_result};

/// Parameters for the ogp_thumb tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OgpThumbParams {
    /// Content address, either bare or as the `thumb/<address>` reference from `ogp_info`.
    pub address: String,
}

/// Implementation of the ogp_thumb tool.
pub async fn thumb_impl(service: &PreviewService, params: OgpThumbParams) -> Result<CallToolResult, McpError> {
    let raw = params.address.trim();
    let address = Address::parse(raw.strip_prefix(THUMB_PREFIX).unwrap_or(raw))?;
    let record = service.get_thumbnail_bytes(&address).await?;
    image_result(service, &address, &record)
}
