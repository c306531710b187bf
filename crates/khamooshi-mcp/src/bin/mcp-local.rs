use std::sync::Arc;

use khamooshi::{OutageChecker, Settings};
use khamooshi_mcp::McpServer;
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Never)
        .init();

    let settings = Settings::from_env();
    log::info!(
        "Starting khamooshi MCP server over stdio (source: {}, cache ttl: {}s)",
        settings.url,
        settings.cache_ttl_secs
    );

    let checker = OutageChecker::new(settings)
        .inspect_err(|e| log::error!("Failed to build HTTP client: {e}"))?;

    let service = McpServer::new(Arc::new(checker))
        .serve(stdio())
        .await
        .inspect_err(|e| log::error!("Serve error: {e:?}"))?;

    service.waiting().await?;

    Ok(())
}
