//! Stockline API server entry point.

use std::sync::Arc;

use anyhow::Result;
use stockline_api::{routes, AppContext};
use stockline_core::{MarketplaceApi, ProductRepository, SyncEngine, TokenLifecycleManager, TokenStore};
use stockline_infra::{
    InMemoryProductStore, InMemoryTokenStore, MercadoLibreClient, RefreshSchedulerConfig,
    TokenRefreshScheduler,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    // Load configuration
    let config = stockline_infra::config::load()?;

    // Stores are constructed once here and injected everywhere they are
    // needed; nothing holds ambient module state.
    let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let products: Arc<dyn ProductRepository> = Arc::new(InMemoryProductStore::new());
    let marketplace: Arc<dyn MarketplaceApi> =
        Arc::new(MercadoLibreClient::new(&config.marketplace)?);

    let lifecycle = Arc::new(TokenLifecycleManager::new(
        marketplace.clone(),
        tokens.clone(),
        config.marketplace.clone(),
    ));
    let sync = Arc::new(
        SyncEngine::new(lifecycle.clone(), marketplace.clone(), products)
            .with_concurrency(config.marketplace.sync_concurrency),
    );

    // Background refresh sweep shares the lifecycle manager with the request
    // path, so both go through the same per-token serialization
    let mut scheduler = TokenRefreshScheduler::new(
        lifecycle.clone(),
        tokens,
        RefreshSchedulerConfig {
            interval: std::time::Duration::from_secs(config.marketplace.refresh_interval_seconds),
        },
    );
    scheduler.start().await?;

    let context = AppContext { lifecycle, sync, marketplace };
    let app = routes::router().with_state(context);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    scheduler.stop().await?;
    Ok(())
}
