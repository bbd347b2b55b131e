use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use objdex_core::{
    connect_s3, load_config, validate_config, ListingSource, ObjectCatalog, S3ListingSource,
    S3UrlIssuer, SqliteCatalog, SyncEngine, SyncProgress, SyncScheduler, UrlIssuer,
};
use objdex_server::api::create_router;
use objdex_server::state::AppState;

/// Run a single sync and exit instead of serving.
const SYNC_ONCE_FLAG: &str = "--sync-once";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let sync_once = std::env::args().skip(1).any(|arg| arg == SYNC_ONCE_FLAG);

    // Determine config path
    let config_path = std::env::var("OBJDEX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Bucket: {}", config.storage.bucket);
    info!("Database path: {:?}", config.database.path);

    // Create SQLite catalog
    let catalog: Arc<dyn ObjectCatalog> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to open object catalog")?,
    );
    info!("Object catalog initialized");

    // Remote store clients
    let s3 = connect_s3(&config.storage).await;
    let listing: Arc<dyn ListingSource> = Arc::new(
        S3ListingSource::new(s3.clone())
            .with_prefix(config.storage.prefix.clone())
            .with_page_size(config.storage.page_size),
    );
    let url_issuer: Arc<dyn UrlIssuer> = Arc::new(S3UrlIssuer::new(
        s3,
        config.storage.bucket.clone(),
        config.access.url_expiry_secs,
    ));

    let engine = SyncEngine::new(
        config.storage.bucket.clone(),
        config.sync.clone(),
        Arc::clone(&catalog),
        listing,
    )
    .with_progress_callback(Arc::new(|progress: &SyncProgress| {
        info!(
            "Sync progress: batch {} added {} objects ({} total)",
            progress.batch_number, progress.batch_inserted, progress.total_inserted
        );
    }));

    if sync_once {
        let report = engine.synchronize().await.context("Sync failed")?;
        info!(
            "Sync complete: {} new objects indexed ({} scanned)",
            report.inserted_count, report.scanned_count
        );
        return Ok(());
    }

    let scheduler = Arc::new(SyncScheduler::new(Arc::new(engine), config.sync.clone()));
    scheduler.start().await;

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        catalog,
        url_issuer,
        Arc::clone(&scheduler),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    scheduler.stop().await;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
