//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the preview pipeline.
use std::sync::Arc;

use crate::tools::{
    OgpCardParams, OgpEmbedParams, OgpInfoParams, OgpThumbParams, card::card_impl, embed::embed_impl, info::info_impl,
    thumb::thumb_impl,
};

use ogpcache_client::PreviewService;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for ogp-cache.
#[derive(Clone)]
pub struct OgpCacheServer {
    service: Arc<PreviewService>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl OgpCacheServer {
    /// Create a new server handler over a configured preview service.
    pub fn new(service: Arc<PreviewService>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    /// Social-preview metadata for a page.
    #[tool(
        description = "Get Open Graph metadata (title, type, canonical url, description, site name, locale) for a URL. Served from cache while fresh, revalidated with the origin otherwise. The `image` field is a thumb/<address> reference for ogp_thumb."
    )]
    async fn ogp_info(&self, params: Parameters<OgpInfoParams>) -> Result<CallToolResult, McpError> {
        info_impl(&self.service, params.0).await
    }

    /// Rendered preview card for a page.
    #[tool(
        description = "Render a preview card image (WebP) for a URL. Styles: Landscape (default), Portrait, Compact, Custom (requires custom_css stylesheet URL). Cards are re-rendered only when the page metadata changes."
    )]
    async fn ogp_card(&self, params: Parameters<OgpCardParams>) -> Result<CallToolResult, McpError> {
        card_impl(&self.service, params.0).await
    }

    /// Card HTML for a page, image linked to the thumbnail.
    #[tool(
        description = "Get the preview card as an HTML document for a URL, without rendering it. The image points at thumb/<address>, resolvable with ogp_thumb. Styles as for ogp_card."
    )]
    async fn ogp_embed(&self, params: Parameters<OgpEmbedParams>) -> Result<CallToolResult, McpError> {
        embed_impl(&self.service, params.0).await
    }

    /// Stored image by content address.
    #[tool(description = "Get a stored thumbnail or card image (WebP) by content address. Never contacts the origin.")]
    async fn ogp_thumb(&self, params: Parameters<OgpThumbParams>) -> Result<CallToolResult, McpError> {
        thumb_impl(&self.service, params.0).await
    }
}

impl ServerHandler for OgpCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "ogp-cache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
