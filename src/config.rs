use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::prometheus::PrometheusConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Prometheus server (`PROMETHEUS_ADDRESS`)
    #[serde(default = "default_prometheus_address")]
    pub prometheus_address: String,

    /// Per-query timeout in seconds (`PROMETHEUS_TIMEOUT_SECS`)
    #[serde(default = "default_prometheus_timeout_secs")]
    pub prometheus_timeout_secs: u64,
}

fn default_prometheus_address() -> String {
    "http://localhost:9090".to_string()
}

fn default_prometheus_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Read settings from the environment once, at startup
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn prometheus(&self) -> PrometheusConfig {
        PrometheusConfig {
            address: self.prometheus_address.clone(),
            timeout: Duration::from_secs(self.prometheus_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prometheus_address: default_prometheus_address(),
            prometheus_timeout_secs: default_prometheus_timeout_secs(),
        }
    }
}
