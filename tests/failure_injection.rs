//! Failure injection tests: the store is down or slow.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use launch_waitlist::signups::{InsertOutcome, NewSignup, SignupRecord};
use launch_waitlist::store::{MemoryStore, SignupStore, StoreError, StoreResult};
use launch_waitlist::HttpServer;

mod common;
use common::{admin_request, get_request, send, signup_request, test_config, FailingStore};

#[tokio::test]
async fn test_signup_store_failure_returns_generic_error() {
    let server = HttpServer::new(test_config(), Arc::new(FailingStore));
    let (status, _, body) = send(&server.router(), signup_request("a@example.com", "10.0.0.1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": "An error occurred. Please try again."})
    );
    // Backend detail stays in the logs.
    assert!(!body.to_string().contains("injected"));
}

#[tokio::test]
async fn test_stats_store_failure() {
    let server = HttpServer::new(test_config(), Arc::new(FailingStore));
    let (status, _, body) = send(&server.router(), get_request("/stats")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch stats"}));
}

#[tokio::test]
async fn test_admin_store_failure_returns_empty_list() {
    let server = HttpServer::new(test_config(), Arc::new(FailingStore));
    let auth = format!("Bearer {}", common::ADMIN_PASSWORD);
    let (status, _, body) = send(&server.router(), admin_request(Some(&auth))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Failed to retrieve signups", "signups": []})
    );
}

#[tokio::test]
async fn test_admin_auth_checked_before_store() {
    let server = HttpServer::new(test_config(), Arc::new(FailingStore));
    let (status, _, body) = send(&server.router(), admin_request(None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn test_validation_runs_before_store() {
    let server = HttpServer::new(test_config(), Arc::new(FailingStore));
    let (status, _, body) = send(&server.router(), signup_request("bad", "10.0.0.1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid email address");
}

#[tokio::test]
async fn test_health_reports_degraded_store() {
    let server = HttpServer::new(test_config(), Arc::new(FailingStore));
    let (status, _, body) = send(&server.router(), get_request("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"], "failing");
}

/// Fails the first `failures` inserts, then delegates to a memory store.
struct FlakyStore {
    inner: MemoryStore,
    remaining_failures: AtomicU32,
}

#[async_trait]
impl SignupStore for FlakyStore {
    fn backend_tag(&self) -> &'static str {
        "flaky"
    }

    async fn insert_if_absent(&self, signup: NewSignup) -> StoreResult<InsertOutcome> {
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Status {
                status: 503,
                body: "upstream restarting".into(),
            });
        }
        self.inner.insert_if_absent(signup).await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.inner.count().await
    }

    async fn list_recent(&self) -> StoreResult<Vec<SignupRecord>> {
        self.inner.list_recent().await
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_insert_leaves_no_row_and_can_be_retried() {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        remaining_failures: AtomicU32::new(1),
    });
    let server = HttpServer::new(test_config(), store.clone());
    let router = server.router();

    let (status, _, _) = send(&router, signup_request("retry@example.com", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.count().await.unwrap(), 0);

    let (status, _, body) = send(&router, signup_request("retry@example.com", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(store.count().await.unwrap(), 1);
}

/// Never answers within any reasonable timeout.
struct StalledStore;

#[async_trait]
impl SignupStore for StalledStore {
    fn backend_tag(&self) -> &'static str {
        "stalled"
    }

    async fn insert_if_absent(&self, _signup: NewSignup) -> StoreResult<InsertOutcome> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(InsertOutcome::Inserted)
    }

    async fn count(&self) -> StoreResult<u64> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(0)
    }

    async fn list_recent(&self) -> StoreResult<Vec<SignupRecord>> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_request_timeout_bounds_slow_store() {
    let mut config = test_config();
    config.timeouts.request_secs = 1;
    let server = HttpServer::new(config, Arc::new(StalledStore));

    let started = std::time::Instant::now();
    let (status, _, _) = send(&server.router(), get_request("/stats")).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(5));
}
