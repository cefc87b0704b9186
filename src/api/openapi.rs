//! OpenAPI documentation for the telemetry API

use utoipa::OpenApi;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "KubeSLO Telemetry API",
        version = "1.0.0",
        description = "Application request rates and node-to-node latencies read from Prometheus.\n\n## Endpoints\n- Request rates between applications, for one app or a whole app group\n- Mean latency between nodes, from one origin or for every pair",
        license(name = "MIT"),
        contact(name = "KubeSLO Team")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "metrics", description = "Request rates and latencies"),
        (name = "health", description = "Service liveness")
    ),
    paths(
        crate::api::apps::requests_per_second,
        crate::api::nodes::latencies,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::aggregate::Aggregation,
            crate::api::response::ErrorResponse,
            crate::api::health::HealthResponse,
        )
    )
)]
pub struct ApiDoc;
