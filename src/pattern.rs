//! The pattern matcher (C5): drives a rule's `find`/`where` pattern over
//! the symbol graph, short-circuiting as soon as the candidate set goes
//! empty.
//!
//! Grounded in `pattern_matcher.py`'s `PatternMatcher.match`: the `find`
//! clause names a variable only (`target_variable = find_clause.get
//! ('target')`) and is never used to filter -- the candidate set is
//! seeded from every node in the graph (`self.graph.find_all_nodes()`),
//! then narrowed by every `where` condition in order, ANDing them
//! together. Kind filtering, when a rule author wants it, is spelled out
//! as an ordinary `where` condition (`S.kind == 'class'`).

use std::collections::HashSet;

use crate::eval::eval_condition;
use crate::graph::{NodeIndex, SymbolGraph};
use crate::rules::Rule;

/// Runs a rule's pattern against the graph, returning the set of node
/// indices that satisfy every `where` condition. `rule.find_target` is
/// declarative only and plays no role in seeding or narrowing the
/// candidate set.
pub fn find_matches(graph: &SymbolGraph, rule: &Rule) -> HashSet<NodeIndex> {
    let mut candidates: HashSet<NodeIndex> = graph.node_indices().collect();

    for condition in &rule.conditions {
        if candidates.is_empty() {
            break;
        }
        candidates.retain(|&node| eval_condition(graph, node, condition));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SymbolNode;
    use crate::rules::Rules;
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

    #[test]
    fn find_is_declarative_only_and_seeds_every_node() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("A", "class"));
        let b = g.add_node(node("B", "protocol"));

        let yaml = r#"
rules:
  - id: r1
    description: d
    pattern:
      - find: { target: S }
"#;
        let (rules, _) = Rules::from_str(yaml, false).unwrap();
        let rule = rules.iter().next().unwrap();

        // No `where` clause at all, so every node matches regardless of
        // kind -- `find` names a variable, it doesn't filter.
        let matches = find_matches(&g, rule);
        assert_eq!(matches, vec![a, b].into_iter().collect());
    }

    #[test]
    fn where_narrows_by_kind_and_short_circuits() {
        let mut g = SymbolGraph::new();
        let _a = g.add_node(node("A", "class"));

        let yaml = r#"
rules:
  - id: r1
    description: d
    pattern:
      - find: { target: S }
      - where:
          - "S.kind == 'protocol'"
          - "S.missing == 'x'"
"#;
        let (rules, _) = Rules::from_str(yaml, false).unwrap();
        let rule = rules.iter().next().unwrap();

        // first condition already empties the set; the second condition
        // is never evaluated (it would panic-free regardless, but this
        // exercises the short-circuit path).
        let matches = find_matches(&g, rule);
        assert!(matches.is_empty());
    }

    #[test]
    fn not_exists_excludes_matching_candidates() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("A", "class"));
        let b = g.add_node(node("B", "class"));
        let b_idx = g.index_of("B").unwrap();
        g.add_edge(a, b_idx, "CONTAINS");

        let yaml = r#"
rules:
  - id: r1
    description: d
    pattern:
      - find: { target: S }
      - where:
          - "S.kind == 'class'"
          - not_exists:
              - "S-->other"
"#;
        let (rules, _) = Rules::from_str(yaml, false).unwrap();
        let rule = rules.iter().next().unwrap();

        let matches = find_matches(&g, rule);
        // `a` has an outgoing edge, so not_exists excludes it; `b` has
        // none, so it survives.
        assert_eq!(matches, vec![b].into_iter().collect());
    }
}
