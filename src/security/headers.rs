//! Client address derivation from proxy headers.
//!
//! The service runs behind a managed edge, so the peer socket address is the
//! edge itself. The client is taken from the first `X-Forwarded-For` entry,
//! then `X-Real-IP`, then a fixed sentinel. These headers are client-reported;
//! the result is only good enough for abuse deterrence and record keeping.

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Address used when no proxy header identifies the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the client address used for rate limiting and stored with signups.
pub fn client_address(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
