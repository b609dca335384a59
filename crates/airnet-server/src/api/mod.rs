//! API routes for the network planning server.

pub mod demand;
pub mod error;
pub mod fleet;
pub mod rate_limit;
pub mod request_id;
mod routes;

use crate::config::Config;
use crate::state::AppState;
use axum::{http::HeaderValue, middleware, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn routes(config: &Config) -> Router<Arc<AppState>> {
    routes::create_router(config)
}

/// Full application: routes, state, request ids, tracing and CORS.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config());
    routes(state.config())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::ensure_request_id))
        .layer(cors)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
