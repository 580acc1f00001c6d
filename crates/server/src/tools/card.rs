//! ogp_card tool implementation.
//!
//! Renders (or reuses) the preview card image for a URL.

use ogpcache_client::{CardRequest, PreviewService};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::image_result;

/// Parameters for the ogp_card tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OgpCardParams {
    /// The page URL.
    pub url: String,

    /// Card style: "Landscape" (default), "Portrait", "Compact" or "Custom".
    #[serde(default)]
    pub style: Option<String>,

    /// Device-pixel scale factor (default: 1).
    #[serde(default)]
    pub scale: Option<u32>,

    /// Stylesheet URL linked into the card; required for the "Custom" style.
    #[serde(default)]
    pub custom_css: Option<String>,
}

/// Implementation of the ogp_card tool.
pub async fn card_impl(service: &PreviewService, params: OgpCardParams) -> Result<CallToolResult, McpError> {
    let request = CardRequest::parse(params.style.as_deref(), params.scale, params.custom_css)?;
    let (address, record) = service.get_card(&params.url, &request).await?;
    image_result(service, &address, &record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_service;
    use rmcp::model::ErrorCode;

    fn params(style: Option<&str>, scale: Option<u32>) -> OgpCardParams {
        OgpCardParams {
            url: "https://example.com/a".into(),
            style: style.map(str::to_string),
            scale,
            custom_css: None,
        }
    }

    #[tokio::test]
    async fn test_card_impl_invalid_style() {
        let (service, _db) = offline_service().await;
        let err = card_impl(&service, params(Some("Hexagonal"), None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32602));
        assert!(err.message.contains("INVALID_STYLE"));
    }

    #[tokio::test]
    async fn test_card_impl_custom_without_css() {
        let (service, _db) = offline_service().await;
        let err = card_impl(&service, params(Some("custom"), None)).await.unwrap_err();
        assert!(err.message.contains("INVALID_STYLE"));
    }

    #[tokio::test]
    async fn test_card_impl_scale_out_of_range() {
        let (service, _db) = offline_service().await;
        let err = card_impl(&service, params(None, Some(40))).await.unwrap_err();
        assert!(err.message.contains("INVALID_INPUT"));
    }

    #[test]
    fn test_card_params_defaults() {
        let parsed: OgpCardParams = serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();
        assert_eq!(parsed.style, None);
        assert_eq!(parsed.scale, None);
        assert_eq!(parsed.custom_css, None);
    }
}
