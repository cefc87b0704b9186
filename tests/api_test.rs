//! Integration tests for the API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mockall::mock;
use serde_json::{json, Value};
use tower::ServiceExt;

use kubeslo_telemetry::{
    api::AppState,
    prometheus::{MetricsBackend, PromQuery, PrometheusError, Sample},
};

mock! {
    pub Backend {}

    #[async_trait]
    impl MetricsBackend for Backend {
        async fn instant_vector(&self, query: &PromQuery) -> Result<Vec<Sample>, PrometheusError>;
    }
}

fn setup_app(backend: MockBackend) -> axum::Router {
    let state = AppState::new(Arc::new(backend));
    kubeslo_telemetry::create_router(state)
}

fn returning(samples: Vec<Sample>) -> MockBackend {
    let mut backend = MockBackend::new();
    backend
        .expect_instant_vector()
        .times(1)
        .returning(move |_| Ok(samples.clone()));
    backend
}

fn call(source: &str, destination: &str, value: f64) -> Sample {
    Sample::new(
        [("source_app", source), ("destination_app", destination)],
        value,
    )
}

fn hop(origin: &str, destination: &str, value: f64) -> Sample {
    Sample::new(
        [("origin_node", origin), ("destination_node", destination)],
        value,
    )
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let (status, json) = get(setup_app(MockBackend::new()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_app_rates_for_focal_app() {
    let app = setup_app(returning(vec![call("A", "B", 2.0)]));

    let (status, json) = get(app, "/metrics/apps/rps?app-group=shop&app=A").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"B": 2.0}));
}

#[tokio::test]
async fn test_app_rates_for_all_pairs() {
    let app = setup_app(returning(vec![call("A", "B", 2.0), call("C", "A", 3.0)]));

    let (status, json) = get(app, "/metrics/apps/rps?app-group=shop").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "A": {"B": 2.0, "C": 3.0},
            "B": {"A": 2.0},
            "C": {"A": 3.0}
        })
    );
}

#[tokio::test]
async fn test_node_latencies_for_all_pairs() {
    let app = setup_app(returning(vec![hop("n1", "n2", 5.0)]));

    let (status, json) = get(app, "/metrics/nodes/latencies").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"n1": {"n2": 5.0}}));
}

#[tokio::test]
async fn test_node_latencies_for_focal_node() {
    let app = setup_app(returning(vec![hop("n1", "n2", 5.0), hop("n1", "n3", 0.5)]));

    let (status, json) = get(app, "/metrics/nodes/latencies?node=n1&range-width=1m").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"n2": 5.0, "n3": 0.5}));
}

#[tokio::test]
async fn test_default_range_width() {
    for uri in [
        "/metrics/apps/rps?app=A",
        "/metrics/apps/rps?app=A&range-width=",
        "/metrics/nodes/latencies?node=n1",
        "/metrics/nodes/latencies?node=n1&range-width=",
    ] {
        let mut backend = MockBackend::new();
        backend
            .expect_instant_vector()
            .withf(|q| q.as_str().contains("[5m])"))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let (status, json) = get(setup_app(backend), uri).await;

        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(json, json!({}), "{}", uri);
    }
}

#[tokio::test]
async fn test_repeated_parameter_uses_first_value() {
    let mut backend = MockBackend::new();
    backend
        .expect_instant_vector()
        .withf(|q| q.as_str().contains(r#"origin_node="n1""#) && q.as_str().contains("[1m]"))
        .times(1)
        .returning(|_| Ok(vec![hop("n1", "n2", 5.0)]));

    let (status, json) = get(
        setup_app(backend),
        "/metrics/nodes/latencies?node=n1&range-width=1m&node=n2&range-width=10m",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"n2": 5.0}));

    let app = setup_app(returning(vec![call("A", "B", 2.0)]));
    let (status, json) = get(app, "/metrics/apps/rps?app=A&app=B&app-group=shop").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"B": 2.0}));
}

#[tokio::test]
async fn test_backend_error_is_500() {
    let mut backend = MockBackend::new();
    backend.expect_instant_vector().times(1).returning(|_| {
        Err(PrometheusError::Api {
            error_type: "bad_data".to_string(),
            message: "parse error".to_string(),
        })
    });

    let (status, json) = get(setup_app(backend), "/metrics/apps/rps?app=A").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["error"],
        "query rejected by Prometheus (bad_data): parse error"
    );
}

#[tokio::test]
async fn test_backend_timeout_is_500() {
    let mut backend = MockBackend::new();
    backend
        .expect_instant_vector()
        .times(1)
        .returning(|_| Err(PrometheusError::Timeout(Duration::from_secs(10))));

    let (status, json) = get(setup_app(backend), "/metrics/nodes/latencies").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "query timed out after 10s");
}

#[tokio::test]
async fn test_injected_label_value_is_escaped() {
    let mut backend = MockBackend::new();
    backend
        .expect_instant_vector()
        .withf(|q| q.as_str().contains(r#"app="A\"} or vector(1) #""#))
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let (status, _) = get(
        setup_app(backend),
        "/metrics/apps/rps?app=A%22%7D%20or%20vector(1)%20%23",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_range_width_is_500() {
    let mut backend = MockBackend::new();
    backend.expect_instant_vector().never();

    let (status, json) = get(
        setup_app(backend),
        "/metrics/nodes/latencies?range-width=5m%5D)%20or%20vector(1)",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid range width"));
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, json) = get(setup_app(MockBackend::new()), "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/metrics/apps/rps"].is_object());
    assert!(json["paths"]["/metrics/nodes/latencies"].is_object());
}
