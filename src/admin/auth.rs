//! Shared-secret bearer authentication for admin routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use subtle::ConstantTimeEq;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Credential from `Authorization: Bearer <token>`, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Compare without short-circuiting on the first differing byte.
pub fn credentials_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let start = Instant::now();
    // Read per request so a reloaded password applies immediately.
    let expected = state.config.load().admin.password().map(str::to_owned);

    let Some(expected) = expected else {
        tracing::error!("Admin password not configured");
        metrics::record_request("admin", "not_configured", start);
        return Err(ApiError::AdminNotConfigured);
    };

    match bearer_token(request.headers()) {
        Some(token) if credentials_match(token, &expected) => Ok(next.run(request).await),
        _ => {
            tracing::warn!("Unauthorized admin access attempt");
            metrics::record_request("admin", "unauthorized", start);
            Err(ApiError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(auth));
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer s3cret")), Some("s3cret"));
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Basic s3cret")), None);
        assert_eq!(bearer_token(&headers("s3cret")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_credentials_match() {
        assert!(credentials_match("s3cret", "s3cret"));
        assert!(!credentials_match("s3cret", "s3creT"));
        assert!(!credentials_match("s3c", "s3cret"));
        assert!(!credentials_match("", "s3cret"));
    }
}
