//! KubeSLO Telemetry Library
//!
//! Serves application request rates and node-to-node latencies read from
//! Prometheus, reshaped into lookup maps keyed by app or node name.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod prometheus;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;
use crate::api::AppState;

/// Create the application router with the given state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Metrics
        .route("/metrics/apps/rps", get(api::apps::requests_per_second))
        .route("/metrics/nodes/latencies", get(api::nodes::latencies))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
