//! Network layer.
//!
//! Plain TCP listeners are bound directly with tokio; this module only adds
//! what HTTPS needs.

pub mod tls;
