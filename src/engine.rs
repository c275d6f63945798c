//! The analysis engine (C6): runs every rule over the symbol graph in
//! declaration order, accumulating an ordered reason list per matched
//! node.
//!
//! Grounded in the teacher's `Build` driver (`build.rs`): a thin public
//! `run()` that logs begin/end and delegates to a `run_impl()` holding
//! the actual numbered algorithm, the same split used there between
//! `Build::build` and `Build::build_impl`.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;

use crate::graph::{NodeIndex, SymbolGraph};
use crate::pattern::find_matches;
use crate::rules::Rules;

/// One rule's contribution to a matched node's exclusion reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reason {
    pub rule_id: String,
    pub description: String,
}

/// The accumulated result of running every rule: which nodes matched,
/// and why, in rule-firing order.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    reasons: HashMap<NodeIndex, Vec<Reason>>,
    /// Number of nodes each rule matched, in rule declaration order --
    /// feeds the report's "top 5 rules" summary without re-deriving it
    /// from `reasons`.
    pub rule_match_counts: Vec<(String, usize)>,
}

impl AnalysisResult {
    pub fn reasons_for(&self, node: NodeIndex) -> Option<&[Reason]> {
        self.reasons.get(&node).map(Vec::as_slice)
    }

    pub fn matched_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.reasons.keys().copied()
    }

    pub fn matched_count(&self) -> usize {
        self.reasons.len()
    }
}

/// Runs every rule against `graph`, in order, and returns the
/// accumulated per-node reasons.
pub fn run(graph: &SymbolGraph, rules: &Rules) -> AnalysisResult {
    info!(
        "running {} rule(s) over {} node(s)",
        rules.len(),
        graph.node_count()
    );

    let result = run_impl(graph, rules);

    info!(
        "{} of {} node(s) matched at least one rule",
        result.matched_count(),
        graph.node_count()
    );

    result
}

fn run_impl(graph: &SymbolGraph, rules: &Rules) -> AnalysisResult {
    let mut reasons: HashMap<NodeIndex, Vec<Reason>> = HashMap::new();
    let mut rule_match_counts = Vec::with_capacity(rules.len());

    // 1. Rules fire strictly in declaration order. Matching is entirely
    //    independent between rules -- there is no rule-to-rule
    //    dependency -- so the only ordering guarantee that matters is
    //    that a node's reason list reflects the order its rules were
    //    declared in, not the order nodes happen to be visited in.
    for rule in rules {
        debug!("running rule {:?}: {}", rule.id, rule.description);

        // 2. Find every node this rule's pattern matches.
        let matches = find_matches(graph, rule);

        // 3. Record a reason for each matched node, appending (not
        //    replacing) so a node matched by several rules accumulates
        //    one reason per rule, still in firing order.
        for node in &matches {
            reasons.entry(*node).or_insert_with(Vec::new).push(Reason {
                rule_id: rule.id.clone(),
                description: rule.description.clone(),
            });
        }

        rule_match_counts.push((rule.id.clone(), matches.len()));
    }

    AnalysisResult {
        reasons,
        rule_match_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SymbolNode;
    use crate::rules::Rules;
    use std::collections::HashMap as StdHashMap;

    fn node(id: &str, kind: &str) -> SymbolNode {
        SymbolNode {
            id: id.to_string(),
            name: id.to_string(),
            kind: kind.to_string(),
            location: None,
            attrs: StdHashMap::new(),
        }
    }

    #[test]
    fn reasons_accumulate_in_rule_order() {
        let mut g = SymbolGraph::new();
        let a = g.add_node(node("A", "class"));

        let yaml = r#"
rules:
  - id: first
    description: first reason
    pattern:
      - find: { target: S }
      - where:
          - "S.kind == 'class'"
  - id: second
    description: second reason
    pattern:
      - find: { target: S }
      - where:
          - "S.kind == 'class'"
"#;
        let (rules, _) = Rules::from_str(yaml, false).unwrap();
        let result = run(&g, &rules);

        let reasons = result.reasons_for(a).unwrap();
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[0].rule_id, "first");
        assert_eq!(reasons[1].rule_id, "second");
    }

    #[test]
    fn unmatched_nodes_have_no_reasons() {
        let mut g = SymbolGraph::new();
        let _a = g.add_node(node("A", "protocol"));

        let yaml = r#"
rules:
  - id: r1
    description: d
    pattern:
      - find: { target: S }
      - where:
          - "S.kind == 'class'"
"#;
        let (rules, _) = Rules::from_str(yaml, false).unwrap();
        let result = run(&g, &rules);
        assert_eq!(result.matched_count(), 0);
    }
}
