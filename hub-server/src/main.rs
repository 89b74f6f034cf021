//! XQL Hub - server entry point

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xql_hub_core::{DatasetSnapshot, GitSource, RefreshController, SnapshotStore};
use xql_hub_server::{build_router, AppState, Config, LogFormat};

const DEFAULT_LOG_FILTER: &str = "xql_hub_server=info,xql_hub_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(config.log_format);

    tracing::info!("XQL Hub {} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!("Content directory: {}", config.content_dir.display());
    warn_on_unsafe_config(&config);

    // Initial load, off the async runtime
    let data = config.data_paths();
    let initial = tokio::task::spawn_blocking(move || DatasetSnapshot::build(&data))
        .await
        .context("initial content load did not complete")?;
    tracing::info!(
        "Loaded {} queries ({} load errors), {} tactics, {} techniques",
        initial.records.len(),
        initial.load_errors.len(),
        initial.taxonomy.tactics.len(),
        initial.taxonomy.techniques.len()
    );
    let store = Arc::new(SnapshotStore::new(initial));

    // Refresh pipeline
    let source = GitSource::new(config.git_source_config()).context("invalid git configuration")?;
    let refresh = Arc::new(RefreshController::new(
        config.refresh_config(),
        Arc::new(source),
        store,
    ));

    // Build router
    let app = build_router(AppState::new(config.clone(), refresh));

    // Start server
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn warn_on_unsafe_config(config: &Config) {
    if config.webhook_secret.is_none() {
        tracing::warn!("GITHUB_WEBHOOK_SECRET is not set; the refresh webhook will reject every request");
    }
    if config.is_production() && config.expected_repo_url.is_none() {
        tracing::warn!("EXPECTED_REPO_URL is not set; refreshes will pull from whatever remote is configured");
    }
    if config.is_production() && config.host == "0.0.0.0" {
        tracing::warn!("Listening on all interfaces in production; put a reverse proxy in front");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
