//! `/signup` and `/stats` handlers.
//!
//! Signup runs one request through:
//! ```text
//! CheckRateLimit → ParseBody → ValidateEmail → InsertIfAbsent → Respond
//! ```
//! Each stage can exit early with an [`ApiError`]. Nothing is retried.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::time::Instant;

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_address;
use crate::signups::email;
use crate::signups::types::{InsertOutcome, NewSignup, SignupResponse, StatsResponse};

/// `POST /signup` with `{"email": "..."}`.
pub async fn signup(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let start = Instant::now();
    let result = process_signup(&state, &headers, &body).await;

    let outcome = match &result {
        Ok(response) if response.duplicate => "duplicate",
        Ok(_) => "subscribed",
        Err(e) => e.outcome(),
    };
    metrics::record_request("signup", outcome, start);

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn process_signup(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SignupResponse, ApiError> {
    let client = client_address(headers);
    let request_id = request_id(headers);

    tracing::debug!(request_id = %request_id, client = %client, "Signup request received");

    if !state.limiter.admit(&client, Instant::now()) {
        tracing::warn!(request_id = %request_id, client = %client, "Signup rate limit exceeded");
        metrics::record_rate_limited();
        return Err(ApiError::RateLimited);
    }

    let Some(raw) = extract_email(body) else {
        tracing::info!(request_id = %request_id, client = %client, "Signup rejected: email missing");
        return Err(ApiError::EmailRequired);
    };

    let Some(email) = email::validate(&raw) else {
        tracing::info!(request_id = %request_id, client = %client, "Signup rejected: invalid email");
        return Err(ApiError::InvalidEmail);
    };

    let signup = NewSignup {
        email,
        ip_address: client.clone(),
    };

    match state.store.insert_if_absent(signup).await {
        Ok(InsertOutcome::Inserted) => {
            tracing::info!(request_id = %request_id, client = %client, "New signup stored");
            Ok(SignupResponse::subscribed())
        }
        Ok(InsertOutcome::Duplicate) => {
            tracing::info!(request_id = %request_id, client = %client, "Duplicate signup ignored");
            Ok(SignupResponse::duplicate())
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                client = %client,
                store = state.store.backend_tag(),
                error = %e,
                "Signup insert failed"
            );
            metrics::record_store_error("insert");
            Err(ApiError::SignupFailed(e))
        }
    }
}

/// Pull a non-empty string `email` out of a JSON object body.
///
/// Unparseable JSON, `null` and non-object bodies are all treated as a missing
/// email (400), never as a server error.
fn extract_email(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("email")? {
        Value::String(email) if !email.is_empty() => Some(email.clone()),
        _ => None,
    }
}

/// `GET /stats`: total stored signups.
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let start = Instant::now();
    match state.store.count().await {
        Ok(total_signups) => {
            metrics::record_request("stats", "ok", start);
            Ok(Json(StatsResponse { total_signups }))
        }
        Err(e) => {
            tracing::error!(store = state.store.backend_tag(), error = %e, "Stats query failed");
            metrics::record_store_error("count");
            metrics::record_request("stats", "store_error", start);
            Err(ApiError::StatsUnavailable(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_email() {
        assert_eq!(
            extract_email(br#"{"email": " A@B.co "}"#).as_deref(),
            Some(" A@B.co ")
        );
        assert_eq!(extract_email(br#"{"email": ""}"#), None);
        assert_eq!(extract_email(br#"{"email": 42}"#), None);
        assert_eq!(extract_email(br#"{"mail": "a@b.co"}"#), None);
        assert_eq!(extract_email(br#"["a@b.co"]"#), None);
        assert_eq!(extract_email(b"not json"), None);
        assert_eq!(extract_email(b"null"), None);
        assert_eq!(extract_email(b""), None);
    }
}
