//! Error taxonomy and its mapping to HTTP responses.
//!
//! Signup failures keep the `{success: false, error}` shape the form expects;
//! stats and admin failures carry a bare `error` field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Every failure a handler can report.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Admin access not configured")]
    AdminNotConfigured,

    #[error("signup failed: {0}")]
    SignupFailed(#[source] StoreError),

    #[error("stats unavailable: {0}")]
    StatsUnavailable(#[source] StoreError),

    #[error("admin listing failed: {0}")]
    AdminListFailed(#[source] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmailRequired | ApiError::InvalidEmail => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AdminNotConfigured
            | ApiError::SignupFailed(_)
            | ApiError::StatsUnavailable(_)
            | ApiError::AdminListFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::EmailRequired => "email_required",
            ApiError::InvalidEmail => "invalid_email",
            ApiError::RateLimited => "rate_limited",
            ApiError::Unauthorized => "unauthorized",
            ApiError::AdminNotConfigured => "not_configured",
            ApiError::SignupFailed(_) | ApiError::StatsUnavailable(_) | ApiError::AdminListFailed(_) => {
                "store_error"
            }
        }
    }

    /// JSON body shown to the client. Store details never leave the server.
    pub fn body(&self) -> serde_json::Value {
        match self {
            ApiError::EmailRequired | ApiError::InvalidEmail | ApiError::RateLimited => {
                json!({ "success": false, "error": self.to_string() })
            }
            ApiError::SignupFailed(_) => {
                json!({ "success": false, "error": "An error occurred. Please try again." })
            }
            ApiError::Unauthorized | ApiError::AdminNotConfigured => {
                json!({ "error": self.to_string() })
            }
            ApiError::StatsUnavailable(_) => json!({ "error": "Failed to fetch stats" }),
            ApiError::AdminListFailed(_) => {
                json!({ "error": "Failed to retrieve signups", "signups": [] })
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_error() -> StoreError {
        StoreError::Unavailable("test".into())
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::EmailRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::AdminNotConfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::SignupFailed(store_error()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_signup_errors_carry_success_flag() {
        assert_eq!(
            ApiError::RateLimited.body(),
            json!({"success": false, "error": "Too many requests. Please try again later."})
        );
        assert_eq!(
            ApiError::SignupFailed(store_error()).body(),
            json!({"success": false, "error": "An error occurred. Please try again."})
        );
    }

    #[test]
    fn test_store_details_are_hidden() {
        let body = ApiError::StatsUnavailable(StoreError::Status {
            status: 500,
            body: "relation \"signups\" does not exist".into(),
        })
        .body();
        assert_eq!(body, json!({"error": "Failed to fetch stats"}));
    }

    #[test]
    fn test_admin_failure_returns_empty_list() {
        let body = ApiError::AdminListFailed(store_error()).body();
        assert_eq!(body["signups"], json!([]));
    }
}
