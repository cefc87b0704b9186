//! Node-to-node latencies
//!
//! GET /metrics/nodes/latencies

use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::aggregate::{self, Aggregation};
use crate::api::response::{ErrorResponse, PrettyJson};
use crate::api::{first_value, non_empty, AppState};
use crate::error::AppResult;
use crate::prometheus::{query, RangeWidth};

/// Query parameters for `/metrics/nodes/latencies`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NodeLatenciesQuery {
    /// Origin node; without it every origin is returned
    pub node: Option<String>,
    /// Rate lookback window, defaults to `5m`
    #[serde(rename = "range-width")]
    pub range_width: Option<String>,
}

impl From<Vec<(String, String)>> for NodeLatenciesQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            node: first_value(&pairs, "node"),
            range_width: first_value(&pairs, "range-width"),
        }
    }
}

/// Mean latency in milliseconds between nodes
#[utoipa::path(
    get,
    path = "/metrics/nodes/latencies",
    tag = "metrics",
    params(NodeLatenciesQuery),
    responses(
        (status = 200, description = "`{destination: ms}` when `node` is set, `{origin: {destination: ms}}` otherwise", body = Aggregation),
        (status = 500, description = "Query could not be built or executed", body = ErrorResponse)
    )
)]
pub async fn latencies(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<PrettyJson<Aggregation>> {
    node_latencies(&state, NodeLatenciesQuery::from(pairs)).await
}

async fn node_latencies(
    state: &AppState,
    params: NodeLatenciesQuery,
) -> AppResult<PrettyJson<Aggregation>> {
    let range = RangeWidth::from_param(params.range_width.as_deref())?;

    let latencies = match non_empty(params.node.as_deref()) {
        Some(node) => {
            info!(node, range_width = %range, "Getting latencies from node");
            let samples = state
                .backend
                .instant_vector(&query::latency_from_node(node, &range))
                .await?;
            Aggregation::Peers(aggregate::node_latencies_from(&samples))
        }
        None => {
            info!(range_width = %range, "Getting latencies for all nodes");
            let samples = state
                .backend
                .instant_vector(&query::latency_all_nodes(&range))
                .await?;
            Aggregation::Pairs(aggregate::node_latencies_all(&samples))
        }
    };

    Ok(PrettyJson(latencies))
}
