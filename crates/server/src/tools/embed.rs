//! ogp_embed tool implementation.
//!
//! Returns the card as an HTML document instead of a rendered image.

use ogpcache_client::{CardStyle, PreviewService};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the ogp_embed tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OgpEmbedParams {
    /// The page URL.
    pub url: String,

    /// Card style: "Landscape" (default), "Portrait", "Compact" or "Custom".
    #[serde(default)]
    pub style: Option<String>,

    /// Stylesheet URL linked into the card; required for the "Custom" style.
    #[serde(default)]
    pub custom_css: Option<String>,
}

/// Implementation of the ogp_embed tool.
pub async fn embed_impl(service: &PreviewService, params: OgpEmbedParams) -> Result<CallToolResult, McpError> {
    let style = match params.style.as_deref() {
        Some(name) => name.parse::<CardStyle>()?,
        None => CardStyle::default(),
    };
    let html = service.get_embed(&params.url, style, params.custom_css.as_deref()).await?;
    Ok(CallToolResult::success(vec![Content::text(html)]))
}
