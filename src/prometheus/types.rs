//! Prometheus HTTP API response models

use serde::Deserialize;
use std::collections::HashMap;
use std::num::ParseFloatError;

/// Body of every `/api/v1/query` response
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    Success {
        data: QueryResult,
        #[serde(default)]
        warnings: Vec<String>,
    },
    Error {
        #[serde(rename = "errorType")]
        error_type: String,
        error: String,
        #[serde(default)]
        warnings: Vec<String>,
    },
}

/// Result of an expression evaluation, tagged by `resultType`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum QueryResult {
    Vector(Vec<Sample>),
    Matrix(Vec<RangeSeries>),
    Scalar(SamplePoint),
    String(StringPoint),
}

impl QueryResult {
    /// The `resultType` name of this result
    pub fn kind(&self) -> &'static str {
        match self {
            QueryResult::Vector(_) => "vector",
            QueryResult::Matrix(_) => "matrix",
            QueryResult::Scalar(_) => "scalar",
            QueryResult::String(_) => "string",
        }
    }
}

/// A `[<unix seconds>, "<value>"]` pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "(f64, String)")]
pub struct SamplePoint {
    pub timestamp: f64,
    pub value: f64,
}

impl TryFrom<(f64, String)> for SamplePoint {
    type Error = ParseFloatError;

    fn try_from((timestamp, raw): (f64, String)) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp,
            value: parse_sample_value(&raw)?,
        })
    }
}

/// Sample values are sent as strings so that NaN and the infinities survive
/// JSON encoding.
fn parse_sample_value(raw: &str) -> Result<f64, ParseFloatError> {
    match raw {
        "NaN" => Ok(f64::NAN),
        "+Inf" | "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        other => other.parse(),
    }
}

/// One element of an instant vector
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    pub metric: HashMap<String, String>,
    #[serde(rename = "value")]
    pub point: SamplePoint,
}

impl Sample {
    /// Build a sample from a label set, stamped at the epoch
    pub fn new<I, K, V>(labels: I, value: f64) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            metric: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            point: SamplePoint {
                timestamp: 0.0,
                value,
            },
        }
    }

    /// Label value, or the empty string when the series lacks the label
    pub fn label(&self, name: &str) -> &str {
        self.metric.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn value(&self) -> f64 {
        self.point.value
    }
}

/// One element of a range vector
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RangeSeries {
    pub metric: HashMap<String, String>,
    pub values: Vec<SamplePoint>,
}

/// A `[<unix seconds>, "<string>"]` pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StringPoint(pub f64, pub String);
