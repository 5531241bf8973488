//! chantrack-server - channel submission backend for the browser extension
//!
//! Startup sequence:
//! 1. Load configuration (environment > TOML > defaults)
//! 2. Initialize tracing (stderr or log file)
//! 3. Open the database and build the long-lived clients
//! 4. Serve until Ctrl-C / SIGTERM

use anyhow::{Context, Result};
use chantrack_common::config::{LoggingConfig, ServiceConfig};
use chantrack_server::api::{build_rate_limiter, cors_layer};
use chantrack_server::identity::GoogleIdentityVerifier;
use chantrack_server::resolver::ChannelResolver;
use chantrack_server::youtube::YouTubeDataClient;
use chantrack_server::{build_router, AppState};
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    // Log build identification immediately after tracing init
    info!(
        "Starting chantrack-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config.config_file {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("No configuration file, using environment and defaults"),
    }

    info!("Database: {}", config.database_path.display());
    let db = chantrack_common::db::init_database(&config.database_path, config.db_max_connections)
        .await
        .context("Failed to open database")?;
    info!("✓ Database ready");

    let verifier = GoogleIdentityVerifier::new(
        config.google_client_id.clone(),
        config.tokeninfo_url.clone(),
        config.http_timeout(),
    )?;
    let youtube = YouTubeDataClient::new(
        config.youtube_api_key.clone(),
        config.youtube_api_base_url.clone(),
        config.http_timeout(),
    )?;
    let resolver = ChannelResolver::new(Arc::new(youtube));
    let rate_limiter = build_rate_limiter(config.rate_limit_max_requests, config.rate_limit_window())?;
    info!(
        "Rate limit: {} requests per {}s per client",
        config.rate_limit_max_requests, config.rate_limit_window_secs
    );

    let state = AppState::new(
        db.clone(),
        Arc::new(verifier),
        Arc::new(resolver),
        Arc::new(rate_limiter),
    );
    let app = build_router(state, cors_layer(&config.cors_allowed_origins));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    info!("chantrack-server listening on http://{}", config.bind_address());
    info!("Health check: http://{}/health", config.bind_address());

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db.close().await;
    info!("chantrack-server stopped");

    Ok(())
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("Invalid log level {:?}", logging.level))?,
    };

    match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
