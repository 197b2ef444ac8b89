use std::sync::Arc;

use casedesk::backend::{BackendHandles, MemorySessionStore};
use casedesk::handlers::AppState;
use casedesk::notify::TracingNotifier;
use casedesk::services::Services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up BACKEND_URL, BACKEND_SERVICE_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = casedesk::config::config();
    tracing::info!("Starting Casedesk API in {:?} mode", config.environment);

    // The server acts for callers, never for a stored session of its own
    let backend = BackendHandles::from_config(config, Arc::new(MemorySessionStore::default()))?;
    let services = Services::compose(config, &backend, Arc::new(TracingNotifier));
    let app = casedesk::server::app(AppState::new(&backend, &services), &config.server);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Casedesk API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
