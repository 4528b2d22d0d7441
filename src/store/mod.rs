//! Signup persistence.
//!
//! # Data Flow
//! ```text
//! handlers
//!     → SignupStore (trait object, shared via Arc)
//!         → memory.rs    (process-local, dev and tests)
//!         → postgrest.rs (Supabase / PostgREST over HTTPS)
//! ```
//!
//! # Design Decisions
//! - Duplicate detection is a single conditional insert; the backend decides
//!   atomically whether the email already exists
//! - Every failure surfaces as `StoreError`; no retries at this layer

pub mod memory;
pub mod postgrest;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::signups::types::{InsertOutcome, NewSignup, SignupRecord};

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

/// Errors that can occur while talking to the persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, TLS or timeout failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend answered with a body or header we could not interpret.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Store could not be constructed from configuration.
    #[error("Store misconfigured: {0}")]
    Config(String),

    /// Backend is deliberately unavailable (used by tests and maintenance).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Table-like store of signups keyed by normalized email.
#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Short name for logs and the health endpoint.
    fn backend_tag(&self) -> &'static str;

    /// Insert `signup` unless a row with the same email exists.
    async fn insert_if_absent(&self, signup: NewSignup) -> StoreResult<InsertOutcome>;

    /// Total number of rows.
    async fn count(&self) -> StoreResult<u64>;

    /// All rows, most recently created first.
    async fn list_recent(&self) -> StoreResult<Vec<SignupRecord>>;

    /// Cheap connectivity probe.
    async fn health_check(&self) -> StoreResult<()>;
}

/// Build the configured backend.
pub fn from_config(config: &StoreConfig, timeout: Duration) -> StoreResult<Arc<dyn SignupStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory signup store; signups are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgrest => {
            let store = PostgrestStore::from_config(config, timeout)?;
            Ok(Arc::new(store))
        }
    }
}
