use std::sync::Arc;

use khamooshi::{OutageChecker, Settings};
use khamooshi_mcp::McpServer;
use rmcp::transport::{
    StreamableHttpServerConfig, StreamableHttpService,
    streamable_http_server::session::local::LocalSessionManager,
};
use tower_http::cors::CorsLayer;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8056";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Never)
        .init();

    let ct = tokio_util::sync::CancellationToken::new();

    // One checker for every session, so the page cache is shared.
    let checker = Arc::new(OutageChecker::new(Settings::from_env())?);

    let service = StreamableHttpService::new(
        move || Ok::<_, std::io::Error>(McpServer::new(checker.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: ct.child_token(),
            ..Default::default()
        },
    );

    let address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.into());
    let router = axum::Router::new()
        .nest_service("/mcp", service)
        .layer(CorsLayer::permissive());
    let tcp_listener = tokio::net::TcpListener::bind(&address).await?;

    log::info!("Starting mcp server on address: {}", address);

    let _ = axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {e}");
            }
            ct.cancel();
        })
        .await;

    Ok(())
}
