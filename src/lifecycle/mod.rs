//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Logging → Metrics → Store → Bind listener → Serve
//!
//! Shutdown:
//!     signals.rs (SIGINT/SIGTERM) → shutdown.rs broadcast
//!         → HTTP server drains
//!         → config update loop and rate-limit sweeper exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
