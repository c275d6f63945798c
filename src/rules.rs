//! The rule loader (C2): parses a YAML rule file into a validated,
//! ordered `Vec<Rule>`, compiling every condition string exactly once
//! (C8) so the pattern matcher never re-parses.
//!
//! Grounded in the teacher's `rules.rs` (a `Rules` wrapper around
//! `Vec<Rule>` with `from_path`/`from_reader`/`from_str` constructors and
//! an `IntoIterator` impl), generalized from that file's flat JSON rule
//! shape to this format's YAML pattern/clause grammar.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::vec;

use serde::Deserialize;

use crate::condition::{compile, CompiledCondition};
use crate::error::{Error, ErrorKind, ResultExt, Result};

/// A condition, compiled at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Single(CompiledCondition),
    NotExists(Vec<Condition>),
}

/// A single rule: an id, a human description, and a pattern (a `find`
/// target plus an optional `where` clause of conditions).
///
/// `find.target` is declarative only (a readable variable name like
/// `S`); it is not a node-kind filter. The candidate set for every rule
/// starts as every node in the graph and is narrowed exclusively by the
/// `where` conditions, matching `PatternMatcher.match`'s
/// `candidate_ids = set(self.graph.find_all_nodes())` seed.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub find_target: String,
    pub conditions: Vec<Condition>,
}

/// A recoverable problem encountered while loading rules: a malformed
/// rule or condition, logged and skipped rather than aborting the load.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub rule_id: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rule_id {
            Some(id) => write!(f, "rule {:?}: {}", id, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// An ordered, validated list of rules.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Loads and validates rules from a YAML file on disk. `strict`
    /// promotes every recoverable diagnostic to a fatal error instead of
    /// a warning (§4.8's `--strict`).
    pub fn from_path<P: AsRef<Path>>(path: P, strict: bool) -> Result<(Rules, Vec<Diagnostic>)> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .context(ErrorKind::RulesUnreadable(path.to_path_buf()))?;
        let mut data = String::new();
        file.read_to_string(&mut data)
            .context(ErrorKind::RulesUnreadable(path.to_path_buf()))?;
        Self::from_str(&data, strict)
    }

    pub fn from_reader<R: Read>(reader: R, strict: bool) -> Result<(Rules, Vec<Diagnostic>)> {
        let raw: RawRuleFile =
            serde_yaml::from_reader(reader).context(ErrorKind::RulesMalformed)?;
        Self::build(raw, strict)
    }

    pub fn from_str(data: &str, strict: bool) -> Result<(Rules, Vec<Diagnostic>)> {
        let raw: RawRuleFile =
            serde_yaml::from_str(data).context(ErrorKind::RulesMalformed)?;
        Self::build(raw, strict)
    }

    fn build(raw: RawRuleFile, strict: bool) -> Result<(Rules, Vec<Diagnostic>)> {
        let mut rules = Vec::with_capacity(raw.rules.len());
        let mut diagnostics = Vec::new();
        let mut seen_ids = HashSet::new();

        for raw_rule in raw.rules {
            if !seen_ids.insert(raw_rule.id.clone()) {
                diagnostics.push(Diagnostic {
                    rule_id: Some(raw_rule.id.clone()),
                    message: "duplicate rule id, skipping".to_string(),
                });
                continue;
            }

            match compile_rule(&raw_rule, &mut diagnostics) {
                Some(rule) => rules.push(rule),
                None => {}
            }
        }

        if strict && !diagnostics.is_empty() {
            return Err(Error::from(ErrorKind::RulesMalformed));
        }

        if rules.is_empty() {
            return Err(ErrorKind::NoRules.into());
        }

        Ok((Rules { rules }, diagnostics))
    }
}

impl IntoIterator for Rules {
    type Item = Rule;
    type IntoIter = vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rules {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

fn compile_rule(raw: &RawRule, diagnostics: &mut Vec<Diagnostic>) -> Option<Rule> {
    let mut clauses = raw.pattern.iter();

    let find_target = match clauses.next() {
        Some(RawClause::Find(find)) => find.target.clone(),
        Some(_) => {
            diagnostics.push(Diagnostic {
                rule_id: Some(raw.id.clone()),
                message: "pattern must begin with exactly one `find` clause".to_string(),
            });
            return None;
        }
        None => {
            diagnostics.push(Diagnostic {
                rule_id: Some(raw.id.clone()),
                message: "pattern is empty".to_string(),
            });
            return None;
        }
    };

    let mut conditions = Vec::new();

    if let Some(next) = clauses.next() {
        match next {
            RawClause::Where(raw_conditions) => {
                conditions = compile_conditions(raw_conditions, &raw.id, diagnostics);
            }
            RawClause::Find(_) => {
                diagnostics.push(Diagnostic {
                    rule_id: Some(raw.id.clone()),
                    message: "pattern has more than one `find` clause".to_string(),
                });
                return None;
            }
        }
    }

    if clauses.next().is_some() {
        diagnostics.push(Diagnostic {
            rule_id: Some(raw.id.clone()),
            message: "pattern has clauses after `find`/`where`".to_string(),
        });
        return None;
    }

    Some(Rule {
        id: raw.id.clone(),
        description: raw.description.clone(),
        find_target,
        conditions,
    })
}

fn compile_conditions(
    raw: &[RawCondition],
    rule_id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Condition> {
    raw.iter()
        .map(|c| match c {
            RawCondition::Condition(s) => {
                let compiled = compile(s);
                if compiled == CompiledCondition::Unsatisfiable {
                    diagnostics.push(Diagnostic {
                        rule_id: Some(rule_id.to_string()),
                        message: format!("could not parse condition {:?}", s),
                    });
                }
                Condition::Single(compiled)
            }
            RawCondition::NotExists { not_exists } => {
                Condition::NotExists(compile_conditions(not_exists, rule_id, diagnostics))
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawRuleFile {
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    id: String,
    #[serde(default)]
    description: String,
    pattern: Vec<RawClause>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawClause {
    Find(RawFind),
    Where(Vec<RawCondition>),
}

#[derive(Debug, Deserialize)]
struct RawFind {
    target: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCondition {
    NotExists { not_exists: Vec<RawCondition> },
    Condition(String),
}
