//! Admin listing of collected signups, gated by a shared secret.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::list_signups;
use crate::http::server::AppState;

/// Admin routes; auth runs only for matched routes.
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin-signups", get(list_signups).post(list_signups))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
