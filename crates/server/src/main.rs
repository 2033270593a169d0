use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bestiary_core::{
    load_config, validate_config, CatalogRepository, CatalogStore, FavoritesPersistence, Gateway,
    HttpGateway, KeyValueStore, RestCatalogRepository, SqliteKeyValueStore,
};
use bestiary_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("BESTIARY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Upstream: {}", config.upstream.base_url);
    info!("Favorites database: {:?}", config.favorites.path);

    let gateway: Arc<dyn Gateway> = Arc::new(
        HttpGateway::new(&config.upstream).context("Failed to create upstream gateway")?,
    );

    let repository: Arc<dyn CatalogRepository> = Arc::new(RestCatalogRepository::new(
        gateway,
        &config.upstream,
        config.fetch.clone(),
    ));

    let kv: Arc<dyn KeyValueStore> = Arc::new(
        SqliteKeyValueStore::new(&config.favorites.path)
            .context("Failed to open favorites database")?,
    );
    let favorites = FavoritesPersistence::new(kv, config.favorites.key.clone());

    let store = Arc::new(CatalogStore::new(
        repository,
        favorites,
        config.fetch.page_size,
    ));

    // The server still starts when the upstream is down; the error stays in state.
    match store.refresh().await {
        Ok(window) => info!(
            "Loaded first page: {} record(s) of {}",
            window.items.len(),
            window.total_items
        ),
        Err(e) => warn!("Initial page load failed: {}", e),
    }

    let state = Arc::new(AppState::new(config.clone(), store));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
