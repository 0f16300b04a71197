//! cachekv - Layered write-back cache server
//!
//! Serves a stack of cache layers over an in-memory base store.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachekv::api::create_router;
use cachekv::{spawn_clear_task, AppState, Config};

/// Main entry point for the cachekv server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache stack over an empty base store
/// 4. Start background read-cache clear task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachekv=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cachekv server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_depth={}, clear_interval={}s, max_clean_entries={}",
        config.server_port, config.cache_depth, config.clear_interval, config.max_clean_entries
    );

    let state = AppState::from_config(&config);
    info!("Cache stack initialized with {} layer(s)", state.depth);

    let clear_handle = spawn_clear_task(
        state.cache.clone(),
        config.clear_interval,
        config.max_clean_entries,
    );
    info!("Background clear task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(clear_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the clear task and allows graceful shutdown.
/// Pending writes in the stack are not persisted anywhere beyond the
/// in-memory base store.
async fn shutdown_signal(clear_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    clear_handle.abort();
    warn!("Clear task aborted");
}
