//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;

use launch_waitlist::config::AppConfig;
use launch_waitlist::lifecycle::Shutdown;
use launch_waitlist::signups::{InsertOutcome, NewSignup, SignupRecord};
use launch_waitlist::store::{SignupStore, StoreError, StoreResult};
use launch_waitlist::HttpServer;

pub const ADMIN_PASSWORD: &str = "letmein";

/// Defaults with an admin password and no metrics exporter.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.admin.password = Some(ADMIN_PASSWORD.into());
    config.observability.metrics_enabled = false;
    config
}

/// Store whose every call fails, as an unreachable backend would.
#[derive(Default)]
pub struct FailingStore;

#[async_trait]
impl SignupStore for FailingStore {
    fn backend_tag(&self) -> &'static str {
        "failing"
    }

    async fn insert_if_absent(&self, _signup: NewSignup) -> StoreResult<InsertOutcome> {
        Err(StoreError::Unavailable("injected insert failure".into()))
    }

    async fn count(&self) -> StoreResult<u64> {
        Err(StoreError::Unavailable("injected count failure".into()))
    }

    async fn list_recent(&self) -> StoreResult<Vec<SignupRecord>> {
        Err(StoreError::Unavailable("injected list failure".into()))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Err(StoreError::Unavailable("injected health failure".into()))
    }
}

/// Build a `POST /signup` request from `client`.
pub fn signup_request(email: &str, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/signup")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(serde_json::json!({ "email": email }).to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn admin_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/admin-signups");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

/// Drive one request through the router in-process.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

/// A server running on an ephemeral local port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<AppConfig>,
}

impl RunningServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start `server` on 127.0.0.1 with a random port.
pub async fn spawn_server(server: HttpServer) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningServer {
        addr,
        shutdown,
        config_updates,
    }
}

/// Reqwest client that never reuses pooled connections or system proxies.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn memory_store() -> Arc<launch_waitlist::store::MemoryStore> {
    Arc::new(launch_waitlist::store::MemoryStore::new())
}
