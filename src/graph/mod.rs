//! The symbol graph (C1): an arena-indexed, labelled multigraph over
//! symbol nodes, with O(1) id lookup and typed/directional neighbor
//! queries.
//!
//! Grounded in the arena + dense-index design of the teacher's
//! `holyhashmap`-based graph module: nodes live in a `HolyHashMap` keyed
//! by symbol id (giving O(1) `id -> NodeIndex` lookup), and traversal
//! uses the same `NodeIndex`/`IndexSet` machinery. Edges are a plain
//! arena (`Vec<Edge>`) rather than a `HolyHashMap<(NodeIndex, NodeIndex), E>`,
//! since the symbol graph is a true multigraph: several typed edges may
//! connect the same pair of nodes, which a map keyed by the node pair
//! alone cannot represent.

pub mod index;
pub mod load;

use std::collections::HashMap;

use holyhashmap::HolyHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub use self::index::{IndexSet, NodeIndex};

/// Which side of an edge to look from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Edges where this node is the source (`-->`).
    Outgoing,
    /// Edges where this node is the target (`<--`).
    Incoming,
}

/// Where in the original source a symbol was declared. Optional since
/// not every symbol (e.g. synthesized ones) carries a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u64,
}

/// A node in the symbol graph.
#[derive(Debug, Clone)]
pub struct SymbolNode {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub location: Option<Location>,
    /// Free-form attributes beyond `name`/`kind`/`location`, as retained
    /// from the input JSON. Attribute absence (no key) is distinguished
    /// from an explicit `null`, which matters for `!=` semantics.
    pub attrs: HashMap<String, Json>,
}

/// A directed, typed edge. Multiple edges of different types (and even
/// of the same type) may exist between the same ordered pair of nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub edge_type: String,
}

#[derive(Debug, Clone, Default)]
struct Adjacency {
    outgoing: Vec<usize>,
    incoming: Vec<usize>,
}

/// The symbol graph itself.
#[derive(Debug, Clone)]
pub struct SymbolGraph {
    nodes: HolyHashMap<String, (SymbolNode, Adjacency)>,
    edges: Vec<Edge>,
}

impl Default for SymbolGraph {
    fn default() -> Self {
        SymbolGraph {
            nodes: HolyHashMap::new(),
            edges: Vec::new(),
        }
    }
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        SymbolGraph {
            nodes: HolyHashMap::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Inserts a node, returning its dense index. Nodes are expected to
    /// be loaded before any edge referencing them, as in `load::from_json`.
    pub fn add_node(&mut self, node: SymbolNode) -> NodeIndex {
        let id = node.id.clone();
        let (index, _old) = self.nodes.insert_full(id, (node, Adjacency::default()));
        index.into()
    }

    /// Looks up a node by id in O(1).
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.nodes.to_index(&id.to_string()).map(NodeIndex::from)
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SymbolNode> {
        self.nodes.from_index(index.into()).map(|(_, (n, _))| n)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&SymbolNode> {
        self.index_of(id).and_then(|i| self.node(i))
    }

    /// Iterates all node indices, in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.indices().map(NodeIndex::from)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SymbolNode> {
        self.nodes
            .indices()
            .map(move |i| &self.nodes.from_index(i).unwrap().1 .0)
    }

    /// Adds an edge between two existing node indices. Silently does
    /// nothing useful with dangling endpoints beyond what the arena
    /// itself guards against -- the graph-inconsistency failure bucket
    /// is handled at load time (`load::from_json`), not here.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, edge_type: impl Into<String>) {
        let index = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            edge_type: edge_type.into(),
        });

        if let Some((_, adj)) = self.nodes.from_index_mut(source.into()) {
            adj.outgoing.push(index);
        }
        if let Some((_, adj)) = self.nodes.from_index_mut(target.into()) {
            adj.incoming.push(index);
        }
    }

    /// Returns the neighbor node indices of `node` in `direction`,
    /// optionally filtered to a single edge type. This is the primitive
    /// both `parent`/`child` (single hop, `CONTAINS`) and `superclass`
    /// (transitive, `INHERITS_FROM`/`CONFORMS_TO`) traversal build on.
    pub fn neighbors<'a>(
        &'a self,
        node: NodeIndex,
        edge_type: Option<&'a str>,
        direction: Direction,
    ) -> impl Iterator<Item = NodeIndex> + 'a {
        let adj = self.nodes.from_index(node.into()).map(|(_, a)| a);
        let edges = &self.edges;

        let indices: &[usize] = match (adj, direction) {
            (Some(a), Direction::Outgoing) => &a.outgoing,
            (Some(a), Direction::Incoming) => &a.incoming,
            (None, _) => &[],
        };

        indices.iter().filter_map(move |&i| {
            let edge = &edges[i];
            if let Some(ty) = edge_type {
                if edge.edge_type != ty {
                    return None;
                }
            }
            Some(match direction {
                Direction::Outgoing => edge.target,
                Direction::Incoming => edge.source,
            })
        })
    }

    /// `true` if any edge of type `edge_type` (or any type, if `None`)
    /// exists out of (or into) `node` in `direction`.
    pub fn has_edge(&self, node: NodeIndex, edge_type: Option<&str>, direction: Direction) -> bool {
        self.neighbors(node, edge_type, direction).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> SymbolNode {
        SymbolNode {
            id: id.to_string(),
            name: id.to_string(),
            kind: "class".to_string(),
            location: None,
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn lookup_is_dense_and_reversible() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("a"));
        let b = g.add_node(node("b"));

        assert_eq!(g.index_of("a"), Some(a));
        assert_eq!(g.index_of("b"), Some(b));
        assert_eq!(g.node(a).unwrap().id, "a");
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn multigraph_allows_parallel_typed_edges() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("a"));
        let b = g.add_node(node("b"));

        g.add_edge(a, b, "CONTAINS");
        g.add_edge(a, b, "INHERITS_FROM");

        assert_eq!(g.edge_count(), 2);

        let all: Vec<_> = g.neighbors(a, None, Direction::Outgoing).collect();
        assert_eq!(all, vec![b, b]);

        let contains: Vec<_> = g
            .neighbors(a, Some("CONTAINS"), Direction::Outgoing)
            .collect();
        assert_eq!(contains, vec![b]);
    }

    #[test]
    fn dangling_edge_endpoint_yields_empty_neighbors() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("a"));
        let ghost: NodeIndex = 999usize.into();

        g.add_edge(a, ghost, "CONTAINS");

        // `a`'s outgoing edge points at an index that was never inserted
        // into `nodes`, but iterating from `a` is still well-defined.
        let out: Vec<_> = g.neighbors(a, None, Direction::Outgoing).collect();
        assert_eq!(out, vec![ghost]);

        // Asking the dangling index itself for neighbors is empty, not a
        // panic -- this is the "tolerated silently" inconsistency bucket.
        let out: Vec<_> = g.neighbors(ghost, None, Direction::Outgoing).collect();
        assert!(out.is_empty());
    }
}
