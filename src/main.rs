//! Launch waitlist server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / CLI
//!        │
//!        ▼
//!   ┌───────────────────────── HTTP server (axum) ──────────────────────────┐
//!   │  request-id → trace → CORS → timeout → body limit                     │
//!   │                                                                        │
//!   │  GET  /               landing page                                     │
//!   │  POST /signup         rate limiter → email validator → insert-if-absent│
//!   │  GET  /stats          count                                            │
//!   │  GET  /admin-signups  bearer auth → list newest first                  │
//!   │  GET  /health         store probe                                      │
//!   └───────────────────────────────┬────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//!                      SignupStore (memory | PostgREST)
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use launch_waitlist::config::{load_config, watcher::ConfigWatcher};
use launch_waitlist::lifecycle::{signals, Shutdown};
use launch_waitlist::net::tls::load_tls_config;
use launch_waitlist::observability::{logging, metrics};
use launch_waitlist::{store, HttpServer};

#[derive(Parser)]
#[command(name = "launch-waitlist", version, about = "Coming-soon signup service")]
struct Args {
    /// TOML config file. Falls back to $WAITLIST_CONFIG, then built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watch the config file and apply admin and rate-limit changes live.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var_os("WAITLIST_CONFIG").map(PathBuf::from));

    let config = load_config(config_path.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "launch-waitlist starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        store = ?config.store.backend,
        rate_limit_enabled = config.rate_limit.enabled,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        admin_enabled = config.admin.password().is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = store::from_config(
        &config.store,
        Duration::from_secs(config.timeouts.store_secs),
    )?;
    if let Err(e) = store.health_check().await {
        tracing::warn!(error = %e, "Signup store not reachable at startup, continuing");
    }

    // Keep the watcher alive for the life of the process.
    let (_watcher, config_updates) = match (&config_path, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            signals::wait_for_termination().await;
            shutdown.trigger();
        });
    }

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, store);

    match tls {
        Some(tls_config) => {
            let addr: SocketAddr = bind_address.parse()?;
            let rustls = load_tls_config(&tls_config).await?;
            server
                .run_tls(addr, rustls, config_updates, server_shutdown)
                .await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, config_updates, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
