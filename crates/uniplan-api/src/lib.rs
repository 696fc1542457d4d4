pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod sessions;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers::stream;
use crate::middleware::logging;
use crate::routes::{health, plans, sessions as session_routes};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Plan runs are bounded by `pipeline.timeout_secs` only
    let plan_routes = Router::new()
        .route("/plans", post(plans::create_plan))
        .route("/plans/stream", post(stream::create_plan_stream));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let bounded_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Graph sessions
        .route("/sessions/:session_id/graph", get(session_routes::get_graph))
        .route("/sessions/:session_id/graph/actions", post(session_routes::apply_action))
        .route("/sessions/:session_id/graph/reset", post(session_routes::reset_graph))
        .layer(TimeoutLayer::new(timeout));

    plan_routes
        .merge(bounded_routes)
        .layer(axum_middleware::from_fn(logging::log_request))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
