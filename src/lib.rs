//! Launch waitlist service library.
//!
//! A "coming soon" page backend: email signups with validation, per-client
//! sliding-window rate limiting and duplicate detection, a public signup
//! count, and a password-gated admin listing.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;
pub mod signups;
pub mod store;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
