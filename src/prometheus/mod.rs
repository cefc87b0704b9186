//! Prometheus backend for the telemetry API
//!
//! - `query`: builds the fixed PromQL expressions served by the API
//! - `client`: evaluates them over the HTTP query API
//! - `types`: the response envelope and result variants

mod client;
pub mod query;
mod types;

use async_trait::async_trait;

pub use client::{PrometheusClient, PrometheusConfig, PrometheusError};
pub use query::{PromQuery, QueryError, RangeWidth};
pub use types::*;

/// Source of instant-vector samples.
///
/// Implemented by [`PrometheusClient`]; handlers only depend on this trait so
/// they can be exercised without a running server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn instant_vector(&self, query: &PromQuery) -> Result<Vec<Sample>, PrometheusError>;
}

#[async_trait]
impl MetricsBackend for PrometheusClient {
    async fn instant_vector(&self, query: &PromQuery) -> Result<Vec<Sample>, PrometheusError> {
        PrometheusClient::instant_vector(self, query).await
    }
}
