pub mod apps;
pub mod health;
pub mod nodes;
pub mod openapi;
pub mod response;

use std::sync::Arc;

use crate::prometheus::{MetricsBackend, PrometheusClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn MetricsBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    pub fn with_prometheus(client: PrometheusClient) -> Self {
        Self::new(Arc::new(client))
    }
}

/// First value of `key` in a raw query string; later repeats are ignored
fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.clone())
}

/// Query parameters are optional strings; an empty value counts as missing
fn non_empty(param: Option<&str>) -> Option<&str> {
    param.filter(|value| !value.is_empty())
}
