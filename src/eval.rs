//! The condition evaluator (C4): applies one compiled condition to a set
//! of candidate nodes, returning the surviving subset.
//!
//! Grounded in `pattern_matcher.py`'s `_filter_by_property` /
//! `_filter_by_edge` / `_check_value`, generalized to the richer
//! multi-step path + transitive `superclass` semantics this engine
//! implements (see SPEC_FULL.md's Open Questions).

use crate::condition::{CompiledCondition, Op, Step};
use crate::graph::{Direction, IndexSet, NodeIndex, SymbolGraph};
use crate::rules::Condition;
use crate::value::Value;

const CONTAINS_EDGE: &str = "CONTAINS";
const INHERITS_FROM_EDGE: &str = "INHERITS_FROM";
const CONFORMS_TO_EDGE: &str = "CONFORMS_TO";

/// Follows a property path from `start`, returning every node the path
/// can reach. `parent`/`child` are single-hop over `CONTAINS` edges.
/// `superclass` is a transitive BFS over `INHERITS_FROM`/`CONFORMS_TO`
/// edges that includes the start node of that step.
fn follow_path(graph: &SymbolGraph, start: NodeIndex, path: &[Step]) -> Vec<NodeIndex> {
    let mut frontier = vec![start];

    for step in path {
        let mut next = Vec::new();
        for &node in &frontier {
            match step {
                Step::Parent => {
                    next.extend(graph.neighbors(node, Some(CONTAINS_EDGE), Direction::Incoming));
                }
                Step::Child => {
                    next.extend(graph.neighbors(node, Some(CONTAINS_EDGE), Direction::Outgoing));
                }
                Step::Superclass => {
                    next.extend(superclass_closure(graph, node));
                }
            }
        }
        frontier = next;
    }

    frontier
}

/// The transitive closure of `INHERITS_FROM`/`CONFORMS_TO` edges out of
/// `start`, including `start` itself. Implemented as an explicit
/// worklist over a bitset of visited indices rather than recursion, so
/// that a pathological inheritance chain can't blow the stack.
fn superclass_closure(graph: &SymbolGraph, start: NodeIndex) -> Vec<NodeIndex> {
    let mut visited: IndexSet<NodeIndex> = IndexSet::new();
    let mut worklist = vec![start];
    let mut result = Vec::new();

    visited.insert(start);
    result.push(start);

    while let Some(node) = worklist.pop() {
        for next in graph
            .neighbors(node, Some(INHERITS_FROM_EDGE), Direction::Outgoing)
            .chain(graph.neighbors(node, Some(CONFORMS_TO_EDGE), Direction::Outgoing))
        {
            if visited.insert(next) {
                result.push(next);
                worklist.push(next);
            }
        }
    }

    result
}

fn attr_value(graph: &SymbolGraph, node: NodeIndex, attr: &str) -> Option<Value> {
    let symbol = graph.node(node)?;
    match attr {
        "id" => Some(Value::String(symbol.id.clone())),
        "name" => Some(Value::String(symbol.name.clone())),
        "kind" => Some(Value::String(symbol.kind.clone())),
        _ => symbol.attrs.get(attr).map(Value::from_json),
    }
}

/// Operator semantics, including missing-attribute handling: `!=` is
/// `true` on a missing attribute, `==` is `false`.
fn check_operator(op: Op, actual: Option<&Value>, expected: &Value) -> bool {
    let actual = match actual {
        Some(v) => v,
        None => return op == Op::Ne,
    };

    match op {
        Op::Eq => actual == expected,
        Op::Ne => actual != expected,
        Op::In => match expected.as_list() {
            Some(items) => items.contains(actual),
            None => false,
        },
        Op::Contains => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(e)) => a.contains(e),
            _ => false,
        },
        Op::ContainsAny => match (actual.as_list(), expected.as_list()) {
            (Some(items), Some(candidates)) => candidates.iter().any(|c| items.contains(c)),
            _ => false,
        },
        Op::StartsWith => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(e)) => a.starts_with(e),
            _ => false,
        },
    }
}

/// Evaluates one compiled condition against `candidate`, returning
/// whether it survives.
pub fn eval_compiled(graph: &SymbolGraph, candidate: NodeIndex, cond: &CompiledCondition) -> bool {
    match cond {
        CompiledCondition::Unsatisfiable => false,
        CompiledCondition::Edge { direction, edge_type } => {
            graph.has_edge(candidate, edge_type.as_deref(), *direction)
        }
        CompiledCondition::Property { path, attr, op, value } => {
            let reached = follow_path(graph, candidate, path);
            reached
                .into_iter()
                .any(|node| check_operator(*op, attr_value(graph, node, attr).as_ref(), value))
        }
    }
}

/// Evaluates a (possibly `not_exists`-wrapped) condition against one
/// candidate.
pub fn eval_condition(graph: &SymbolGraph, candidate: NodeIndex, cond: &Condition) -> bool {
    match cond {
        Condition::Single(c) => eval_compiled(graph, candidate, c),
        Condition::NotExists(inner) => {
            !inner.iter().all(|c| eval_condition(graph, candidate, c))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::compile;
    use crate::graph::SymbolNode;
    use std::collections::HashMap;

    fn node(id: &str, kind: &str) -> SymbolNode {
        SymbolNode {
            id: id.to_string(),
            name: id.to_string(),
            kind: kind.to_string(),
            location: None,
            attrs: HashMap::new(),
        }
    }

    fn build_inheritance_chain() -> (SymbolGraph, NodeIndex, NodeIndex, NodeIndex) {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("A", "class"));
        let b = g.add_node(node("B", "class"));
        let c = g.add_node(node("C", "class"));
        g.add_edge(a, b, INHERITS_FROM_EDGE);
        g.add_edge(b, c, INHERITS_FROM_EDGE);
        (g, a, b, c)
    }

    #[test]
    fn superclass_closure_includes_start_and_is_transitive() {
        let (g, a, b, c) = build_inheritance_chain();
        let mut closure = superclass_closure(&g, a);
        closure.sort_by_key(|n| Into::<usize>::into(*n));
        let mut expected = vec![a, b, c];
        expected.sort_by_key(|n| Into::<usize>::into(*n));
        assert_eq!(closure, expected);
    }

    #[test]
    fn missing_attribute_operator_laws() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("A", "class"));

        let ne = compile("node.missing == 'x'");
        assert!(!eval_compiled(&g, a, &ne));

        let ne = compile("node.missing != 'x'");
        assert!(eval_compiled(&g, a, &ne));
    }

    #[test]
    fn bare_attr_path_checks_candidate_itself() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("A", "protocol"));

        let cond = compile("node.kind == 'protocol'");
        assert!(eval_compiled(&g, a, &cond));
    }

    #[test]
    fn transitive_superclass_condition() {
        let (g, a, _b, _c) = build_inheritance_chain();
        let cond = compile("node.superclass.id == 'C'");
        assert!(eval_compiled(&g, a, &cond));
    }

    #[test]
    fn edge_existence_condition() {
        let (g, a, _b, _c) = build_inheritance_chain();
        let out = compile("node-->other");
        assert!(eval_compiled(&g, a, &out));

        let typed_in = compile("node<--INHERITS_FROM--other");
        assert!(!eval_compiled(&g, a, &typed_in));
    }

    #[test]
    fn contains_is_substring_not_list_membership() {
        let mut g = SymbolGraph::new();
        let mut n = node("FooTestsHelper", "class");
        n.name = "FooTestsHelper".to_string();
        let a = g.add_node(n);

        let cond = compile("node.name contains 'Tests'");
        assert!(eval_compiled(&g, a, &cond));

        let cond = compile("node.name contains 'Nope'");
        assert!(!eval_compiled(&g, a, &cond));
    }
}
