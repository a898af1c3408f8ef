//! arlab-web - Laboratory AR content service
//!
//! Serves the admin console, the laboratory picker, and the AR scan pages.
//! Content lives in local SQLite with media on disk unless a hosted backend
//! is configured.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use arlab_common::config::RootFolderInitializer;
use arlab_web::config::{Args, ServiceConfig};
use arlab_web::storage::{LocalObjectStore, ObjectStore, RemoteObjectStore};
use arlab_web::store::{
    AssetBackend, AssetStore, LabConfigBackend, LabConfigStore, LocalMirror, RestBackend,
    SqliteBackend,
};
use arlab_web::{api::SessionRegistry, build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_filter())),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting arlab-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = ServiceConfig::resolve(&args).context("Failed to load configuration")?;
    config.log_summary();

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let mirror = LocalMirror::new(initializer.mirror_path());

    let (asset_backend, config_backend, objects, media_dir) = match &config.remote {
        Some(remote) => {
            info!("Using hosted backend at {}", remote.url);
            let backend = Arc::new(RestBackend::new(remote));
            (
                backend.clone() as Arc<dyn AssetBackend>,
                backend as Arc<dyn LabConfigBackend>,
                Arc::new(RemoteObjectStore::new(remote)) as Arc<dyn ObjectStore>,
                None,
            )
        }
        None => {
            let db_path = initializer.database_path();
            info!("Database path: {}", db_path.display());
            let pool = arlab_common::db::init_database(&db_path)
                .await
                .context("Failed to open database")?;
            info!("✓ Connected to database");

            let backend = Arc::new(SqliteBackend::new(pool));
            let media_dir = initializer.media_path();
            (
                backend.clone() as Arc<dyn AssetBackend>,
                backend as Arc<dyn LabConfigBackend>,
                Arc::new(LocalObjectStore::new(
                    media_dir.clone(),
                    config.public_base_url.clone(),
                )) as Arc<dyn ObjectStore>,
                Some(media_dir),
            )
        }
    };

    let sessions = SessionRegistry::new(
        config.admin_password_digest.clone(),
        config.session_ttl_secs,
    );
    if !sessions.is_configured() {
        warn!("No admin password configured; set ARLAB_ADMIN_PASSWORD to enable the admin console");
    }

    let mut state = AppState::new(
        AssetStore::new(asset_backend, mirror),
        LabConfigStore::new(config_backend),
        objects,
        sessions,
        config.scanner.clone(),
    );
    if let Some(dir) = media_dir {
        state = state.with_media_dir(dir);
    }
    let app = build_router(state);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("arlab-web listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
