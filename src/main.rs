use std::sync::Arc;

use brandbot::agent::Orchestrator;
use brandbot::channels::LineChannel;
use brandbot::config::AppConfig;
use brandbot::server::{self, AppState};
use brandbot::store::LibSqlBackend;
use brandbot::tools::ToolRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("🤖 brandbot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.gemini.model);
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook", config.port);
    eprintln!("   Database: {}", config.db_path);

    let store = Arc::new(LibSqlBackend::new_local(std::path::Path::new(&config.db_path)).await?);

    let tools = ToolRegistry::new(store);
    let orchestrator = Orchestrator::from_config(&config.gemini, tools);
    let line = LineChannel::new(config.line.access_token.clone());

    let state = Arc::new(AppState {
        channel_secret: config.line.channel_secret.clone(),
        line,
        orchestrator,
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
