//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + environment
//!     → loader.rs (parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated)
//!     → shared via Arc<ArcSwap<AppConfig>> to handlers
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the live config and reconfigures the rate limiter
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Listener, TLS and store settings are read once at startup; only admin
//!   and rate-limit settings follow a reload

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    AdminConfig, AppConfig, ListenerConfig, LogFormat, ObservabilityConfig, RateLimitConfig,
    StoreBackend, StoreConfig, TimeoutConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
