use axum::{extract::State, Json};
use std::time::Instant;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::signups::AdminSignupsResponse;

/// Every signup, newest first, with the total.
pub async fn list_signups(
    State(state): State<AppState>,
) -> Result<Json<AdminSignupsResponse>, ApiError> {
    let start = Instant::now();
    match state.store.list_recent().await {
        Ok(signups) => {
            tracing::info!(count = signups.len(), "Retrieved signups for admin");
            metrics::record_request("admin", "ok", start);
            Ok(Json(AdminSignupsResponse::from(signups)))
        }
        Err(e) => {
            tracing::error!(store = state.store.backend_tag(), error = %e, "Admin listing failed");
            metrics::record_store_error("list");
            metrics::record_request("admin", "store_error", start);
            Err(ApiError::AdminListFailed(e))
        }
    }
}
