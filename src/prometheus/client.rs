//! HTTP client for the Prometheus query API

use chrono::Utc;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::query::PromQuery;
use super::types::{ApiResponse, QueryResult, Sample};

const QUERY_ENDPOINT: &str = "api/v1/query";

/// Errors raised while talking to Prometheus
#[derive(Debug, Error)]
pub enum PrometheusError {
    #[error("invalid Prometheus address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to create metrics client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("error during query execution: {0}")]
    Request(#[source] reqwest::Error),

    #[error("query rejected by Prometheus ({error_type}): {message}")]
    Api { error_type: String, message: String },

    #[error("failed to decode Prometheus response (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("query result is not a vector: got {0}")]
    UnexpectedResultType(&'static str),
}

/// Connection settings for [`PrometheusClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrometheusConfig {
    /// Base URL, e.g. `http://prometheus.monitoring:9090`
    pub address: String,
    /// Upper bound for a whole query round-trip
    pub timeout: Duration,
}

/// Issues instant queries against a Prometheus server.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: Client,
    query_url: Url,
    timeout: Duration,
}

impl PrometheusClient {
    pub fn new(config: &PrometheusConfig) -> Result<Self, PrometheusError> {
        let query_url = query_url(&config.address)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PrometheusError::ClientBuild)?;

        info!(url = %query_url, timeout = ?config.timeout, "Prometheus client created");

        Ok(Self {
            http,
            query_url,
            timeout: config.timeout,
        })
    }

    /// Evaluate `query` at the current instant.
    ///
    /// Backend-side failures come back as [`PrometheusError::Api`]; warnings
    /// attached to either outcome are logged and dropped.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn query(&self, query: &PromQuery) -> Result<QueryResult, PrometheusError> {
        let time = format!("{:.3}", Utc::now().timestamp_millis() as f64 / 1000.0);

        let response = self
            .http
            .get(self.query_url.clone())
            .query(&[("query", query.as_str()), ("time", time.as_str())])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        // Prometheus reports query errors with a 4xx/5xx status and a JSON
        // body, so the body is decoded regardless of status.
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        let envelope: ApiResponse =
            serde_json::from_slice(&body).map_err(|source| PrometheusError::Decode {
                status: status.as_u16(),
                source,
            })?;

        match envelope {
            ApiResponse::Success { data, warnings } => {
                log_warnings(&warnings);
                debug!(result_type = data.kind(), "Query succeeded");
                Ok(data)
            }
            ApiResponse::Error {
                error_type,
                error,
                warnings,
            } => {
                log_warnings(&warnings);
                Err(PrometheusError::Api {
                    error_type,
                    message: error,
                })
            }
        }
    }

    /// Evaluate `query` and require an instant vector back
    pub async fn instant_vector(&self, query: &PromQuery) -> Result<Vec<Sample>, PrometheusError> {
        match self.query(query).await? {
            QueryResult::Vector(samples) => Ok(samples),
            other @ (QueryResult::Matrix(_) | QueryResult::Scalar(_) | QueryResult::String(_)) => {
                Err(PrometheusError::UnexpectedResultType(other.kind()))
            }
        }
    }

    fn request_error(&self, err: reqwest::Error) -> PrometheusError {
        if err.is_timeout() {
            PrometheusError::Timeout(self.timeout)
        } else {
            PrometheusError::Request(err)
        }
    }
}

fn query_url(address: &str) -> Result<Url, PrometheusError> {
    let invalid = |reason: String| PrometheusError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let mut base = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
    }

    // Keep any path prefix (e.g. behind a reverse proxy) when joining
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(QUERY_ENDPOINT).map_err(|e| invalid(e.to_string()))
}

fn log_warnings(warnings: &[String]) {
    for warning in warnings {
        warn!(warning = %warning, "Prometheus returned a warning");
    }
}
