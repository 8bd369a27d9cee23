//! Geo Catalog server entry point.

use std::fs::{self, File, OpenOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use geo_catalog::{api::create_router, spawn_janitor_task, AppState, Config};

/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing to stdout and to the application log file
/// 3. Build the repository, cache and services
/// 4. Start the cache janitor, sweeping once per TTL
/// 5. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Plain-text copy of the log; log exports filter it by date prefix.
    let (file_layer, file_error) = match open_log_file(&config.log_file) {
        Ok(file) => (
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geo_catalog=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .with(file_layer)
        .init();

    info!("Starting Geo Catalog");
    if let Some(err) = file_error {
        warn!("Application log file disabled: {:#}", err);
    }

    info!(
        "Configuration loaded: cache_max_entries={}, cache_ttl_ms={}, port={}",
        config.cache_max_entries, config.cache_ttl_ms, config.server_port
    );

    let state = AppState::from_config(&config);
    let janitor_handle = spawn_janitor_task(state.cache.clone(), config.cache_ttl());
    info!("Cache janitor started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(janitor_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Opens the application log for appending, creating its directory.
fn open_log_file(path: &str) -> anyhow::Result<File> {
    let path = Path::new(path);
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))
}

/// Waits for Ctrl+C or SIGTERM, then stops the janitor.
async fn shutdown_signal(janitor_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    janitor_handle.abort();
    warn!("Cache janitor aborted");
}
