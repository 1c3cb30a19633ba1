//! `ots-server`: one-time secret service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise logging (JSON tracing, plus OTLP span export if configured).
//! 3. Connect the secret store (Redis, or in-process memory).
//! 4. Build the [`Sealer`] and [`SecretService`] around the master key.
//! 5. Build the Axum router and serve until Ctrl-C / SIGTERM.

mod config;
mod crypto;
mod secret;
mod server;
mod store;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use config::{Config, StoreBackend};
use crypto::Sealer;
use secret::SecretService;
use server::state::AppState;
use store::{MemoryStore, RedisStore, SecretStore};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        store_backend = ?cfg.store_backend,
        encrypt_version = cfg.encrypt_version,
        "ots-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Secret store
    // -----------------------------------------------------------------------
    let store: Arc<dyn SecretStore> = match cfg.store_backend {
        StoreBackend::Redis => {
            Arc::new(RedisStore::connect(&cfg.redis_url, cfg.redis_atomic_take).await?)
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; secrets are lost on restart and not shared between instances");
            Arc::new(MemoryStore::new())
        }
    };

    // -----------------------------------------------------------------------
    // 4. Lifecycle service
    // -----------------------------------------------------------------------
    let sealer = Sealer::new(cfg.master_key.clone(), cfg.kdf_version()?);
    let service = SecretService::new(store, sealer, cfg.store_timeout());

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(service, cfg.max_secret_bytes);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("server shutdown complete");
    telemetry::shutdown_telemetry();
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
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
    info!("received shutdown signal");
}
