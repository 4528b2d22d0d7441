//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Serve over plain TCP or TLS with graceful shutdown
//! - Apply hot-reloaded configuration
//! - Periodically sweep expired rate-limit windows

use arc_swap::ArcSwap;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::AppConfig;
use crate::health;
use crate::http::landing;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::security::{RateLimiter, SlidingWindowLimiter};
use crate::signups::handlers::{signup, stats};
use crate::store::SignupStore;

/// How long TLS connections get to drain after shutdown is signalled.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live configuration, swapped on reload.
    pub config: Arc<ArcSwap<AppConfig>>,
    pub store: Arc<dyn SignupStore>,
    pub limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn SignupStore>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            store,
            limiter,
        }
    }

    /// Swap in a reloaded configuration.
    ///
    /// Admin and rate-limit settings apply immediately. Listener, timeout and
    /// store settings were consumed at startup and need a restart.
    pub fn apply_config(&self, new_config: AppConfig) {
        let current = self.config.load_full();
        if current.listener != new_config.listener
            || current.store != new_config.store
            || current.timeouts != new_config.timeouts
        {
            tracing::warn!("Listener, timeout or store changes take effect after a restart");
        }

        self.limiter.reconfigure(&new_config.rate_limit);
        self.config.store(Arc::new(new_config));
        tracing::info!("Configuration reloaded");
    }
}

/// HTTP server for the waitlist.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server with the default sliding-window limiter.
    pub fn new(config: AppConfig, store: Arc<dyn SignupStore>) -> Self {
        let limiter = Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit));
        Self::with_limiter(config, store, limiter)
    }

    /// Create a server with a caller-supplied rate limiter.
    pub fn with_limiter(
        config: AppConfig,
        store: Arc<dyn SignupStore>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        let state = AppState::new(config.clone(), store, limiter);
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(landing::index))
            .route("/signup", post(signup))
            .route("/stats", get(stats).post(stats))
            .route("/health", get(health::check))
            .merge(setup_admin_router(state.clone()))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer())
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        self.spawn_background_tasks(config_updates, &shutdown);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        self.spawn_background_tasks(config_updates, &shutdown);

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTPS server draining connections");
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    fn spawn_background_tasks(
        &self,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        shutdown: &broadcast::Receiver<()>,
    ) {
        let state = self.state.clone();
        let mut stop = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(new_config) => state.apply_config(new_config),
                        None => break,
                    },
                    _ = stop.recv() => break,
                }
            }
            tracing::debug!("Config update loop exiting");
        });

        let limiter = self.state.limiter.clone();
        let interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
        let mut stop = shutdown.resubscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep(Instant::now());
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired rate-limit windows");
                        }
                    }
                    _ = stop.recv() => break,
                }
            }
            tracing::debug!("Rate-limit sweeper exiting");
        });
    }
}

/// Permissive CORS: any origin, the headers browser clients send.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
