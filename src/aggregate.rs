//! Folding instant-vector samples into lookup maps
//!
//! App request rates are reported per direction but served as an undirected
//! adjacency map: a sample for `A -> B` fills both `A.B` and `B.A`. Node
//! latencies stay directional and are keyed origin first.
//!
//! Repeated label pairs are not merged; the last sample wins.

use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::prometheus::Sample;

pub const SOURCE_APP: &str = "source_app";
pub const DESTINATION_APP: &str = "destination_app";
pub const ORIGIN_NODE: &str = "origin_node";
pub const DESTINATION_NODE: &str = "destination_node";

/// Neighbour name to value
pub type PeerMap = BTreeMap<String, f64>;
/// Name to neighbour name to value
pub type AdjacencyMap = BTreeMap<String, PeerMap>;

/// Response body of both metrics endpoints: flat when a focal app or node was
/// requested, nested otherwise
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Aggregation {
    Peers(BTreeMap<String, f64>),
    Pairs(BTreeMap<String, BTreeMap<String, f64>>),
}

/// Request rates between `app` and each app it talks to, in either
/// direction. Self-calls and series not involving `app` are skipped, so
/// `app` itself is never a key.
pub fn app_rates_for(samples: &[Sample], app: &str) -> PeerMap {
    let mut rates = PeerMap::new();

    for sample in samples {
        let source = sample.label(SOURCE_APP);
        let destination = sample.label(DESTINATION_APP);

        let peer = match (source == app, destination == app) {
            (true, false) => destination,
            (false, true) => source,
            _ => continue,
        };

        rates.insert(peer.to_string(), sample.value());
    }

    rates
}

/// Symmetric request-rate map over every app pair in the samples
pub fn app_rates_all(samples: &[Sample]) -> AdjacencyMap {
    let mut rates = AdjacencyMap::new();

    for sample in samples {
        let source = sample.label(SOURCE_APP);
        let destination = sample.label(DESTINATION_APP);
        let value = sample.value();

        rates
            .entry(source.to_string())
            .or_default()
            .insert(destination.to_string(), value);
        rates
            .entry(destination.to_string())
            .or_default()
            .insert(source.to_string(), value);
    }

    rates
}

/// Latency from a single origin node, keyed by destination node
pub fn node_latencies_from(samples: &[Sample]) -> PeerMap {
    samples
        .iter()
        .map(|sample| (sample.label(DESTINATION_NODE).to_string(), sample.value()))
        .collect()
}

/// Directional latency map, origin node first
pub fn node_latencies_all(samples: &[Sample]) -> AdjacencyMap {
    let mut latencies = AdjacencyMap::new();

    for sample in samples {
        latencies
            .entry(sample.label(ORIGIN_NODE).to_string())
            .or_default()
            .insert(sample.label(DESTINATION_NODE).to_string(), sample.value());
    }

    latencies
}
