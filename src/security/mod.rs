//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Signup request:
//!     → headers.rs (derive client address)
//!     → rate_limit.rs (sliding-window admission per address)
//!     → signup handler
//!
//! Admin request:
//!     → admin::auth (bearer secret, constant-time compare)
//! ```

pub mod headers;
pub mod rate_limit;

pub use headers::client_address;
pub use rate_limit::{RateLimiter, SlidingWindowLimiter, WindowPolicy};
