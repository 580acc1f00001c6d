//! ogp-cache server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use ogpcache_client::{FetchConfig, HttpFetcher, OgpExtractor, PreviewService, WebpCodec};
use ogpcache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db_path = %config.db_path.display(), render_enabled = config.render_enabled, "starting ogp-cache server on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = HttpFetcher::new(FetchConfig::from(&config))?;
    let service = PreviewService::new(Arc::new(db), Arc::new(fetcher), Arc::new(OgpExtractor::new()), Arc::new(WebpCodec))
        .configured(&config);
    let service = attach_renderer(service, &config).await?;

    let handler = handler::OgpCacheServer::new(Arc::new(service));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

#[cfg(feature = "render")]
async fn attach_renderer(service: PreviewService, config: &AppConfig) -> Result<PreviewService> {
    use ogpcache_client::{HeadlessRenderer, RenderOptions};

    if !config.render_enabled {
        return Ok(service);
    }
    let renderer = HeadlessRenderer::new(RenderOptions { timeout_ms: config.timeout_ms, ..Default::default() }).await?;
    tracing::info!("headless renderer ready");
    Ok(service.with_renderer(Arc::new(renderer)))
}

#[cfg(not(feature = "render"))]
async fn attach_renderer(service: PreviewService, config: &AppConfig) -> Result<PreviewService> {
    if config.render_enabled {
        tracing::warn!("render_enabled is set but this build has no renderer; ogp_card will fail with RENDER_DISABLED");
    }
    Ok(service)
}
