//! HTTP route handlers.
//!
//! `/` is the dashboard and is never cacheable; `/healthz` is the liveness
//! probe. Request tracing is enabled via middleware that generates a unique
//! request ID for each incoming request.

pub mod health;
pub mod home;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_DASHBOARD;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    let dashboard_routes = Router::new()
        .route("/", get(home::index))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_DASHBOARD),
        ));

    let health_routes = Router::new().route("/healthz", get(health::healthz));

    Router::new()
        .merge(dashboard_routes)
        .merge(health_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
