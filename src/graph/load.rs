//! Loads a symbol graph from its JSON wire format (§6.1):
//!
//! ```json
//! {
//!   "nodes": { "<id>": { "name": "...", "kind": "...", "location": {"file": "...", "line": 1}, "...attrs": "..." } },
//!   "edges": [ { "source": "<id>", "target": "<id>", "type": "CONTAINS" } ]
//! }
//! ```
//!
//! Unknown top-level keys are ignored. Unknown node attributes are kept
//! and remain queryable by the condition evaluator. An edge whose
//! endpoint id doesn't name a node is a tolerated graph inconsistency
//! (§4.8): it's dropped with a warning, never a fatal error.

use std::collections::HashMap;
use std::io::Read;

use log::warn;
use serde::Deserialize;
use serde_json::Value as Json;

use super::{Location, SymbolGraph, SymbolNode};
use crate::error::{ErrorKind, ResultExt, Result};

#[derive(Debug, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: HashMap<String, RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    name: String,
    kind: String,
    #[serde(default)]
    location: Option<Location>,
    #[serde(flatten)]
    attrs: HashMap<String, Json>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    source: String,
    target: String,
    #[serde(rename = "type")]
    edge_type: String,
}

/// Parses a symbol graph from a reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SymbolGraph> {
    let raw: RawGraph =
        serde_json::from_reader(reader).context(ErrorKind::GraphMalformed)?;
    Ok(build(raw))
}

/// Parses a symbol graph from an already-loaded string.
pub fn from_str(data: &str) -> Result<SymbolGraph> {
    let raw: RawGraph = serde_json::from_str(data).context(ErrorKind::GraphMalformed)?;
    Ok(build(raw))
}

fn build(raw: RawGraph) -> SymbolGraph {
    let mut graph = SymbolGraph::with_capacity(raw.nodes.len(), raw.edges.len());

    // `HashMap` iteration order is unspecified; sort by id so that the
    // resulting node indices (and therefore anything keyed off ordinal
    // position, like tie-breaking in the report) are deterministic
    // across runs of the same input.
    let mut ids: Vec<&String> = raw.nodes.keys().collect();
    ids.sort();

    for id in ids {
        let raw_node = &raw.nodes[id];
        let mut attrs = raw_node.attrs.clone();
        attrs.remove("name");
        attrs.remove("kind");
        attrs.remove("location");

        graph.add_node(SymbolNode {
            id: id.clone(),
            name: raw_node.name.clone(),
            kind: raw_node.kind.clone(),
            location: raw_node.location.clone(),
            attrs,
        });
    }

    for edge in raw.edges {
        let source = graph.index_of(&edge.source);
        let target = graph.index_of(&edge.target);

        match (source, target) {
            (Some(s), Some(t)) => graph.add_edge(s, t, edge.edge_type),
            _ => warn!(
                "dropping edge {:?} -{}-> {:?}: endpoint not found in graph",
                edge.source, edge.edge_type, edge.target
            ),
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_graph() {
        let json = r#"{
            "nodes": {
                "A": {"name": "A", "kind": "class"},
                "B": {"name": "B", "kind": "protocol"}
            },
            "edges": [
                {"source": "A", "target": "B", "type": "CONFORMS_TO"}
            ]
        }"#;

        let graph = from_str(json).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_by_id("A").unwrap().kind, "class");
    }

    #[test]
    fn retains_unknown_attributes() {
        let json = r#"{
            "nodes": {
                "A": {"name": "A", "kind": "class", "is_public": true, "tags": ["x", "y"]}
            },
            "edges": []
        }"#;

        let graph = from_str(json).unwrap();
        let node = graph.node_by_id("A").unwrap();
        assert_eq!(node.attrs.get("is_public"), Some(&Json::Bool(true)));
        assert!(node.attrs.get("tags").unwrap().is_array());
    }

    #[test]
    fn dangling_edge_endpoint_is_dropped_not_fatal() {
        let json = r#"{
            "nodes": {"A": {"name": "A", "kind": "class"}},
            "edges": [{"source": "A", "target": "ghost", "type": "CONTAINS"}]
        }"#;

        let graph = from_str(json).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
