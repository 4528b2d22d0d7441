//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign and propagate x-request-id)
//!     → handlers (signups, admin, health, landing)
//!     → response.rs (ApiError → status + JSON body)
//! ```

pub mod landing;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
