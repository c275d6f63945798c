//! Typed values (C3): what a condition's literal parses to, and what a
//! node attribute compares against.
//!
//! Grounded in `python-engine/rule_engine/rules/pattern_matcher.py`'s
//! `_parse_value`, which tries, in order: a quoted string, a bracketed
//! list, a case-insensitive boolean, an integer, a float, and finally a
//! bare string. That precedence is preserved exactly here.

use std::fmt;

use derive_more::From;
use serde_json::Value as Json;

/// A parsed literal or a node attribute's runtime value.
#[derive(Debug, Clone, PartialEq, From)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Value {
    /// Converts a `serde_json::Value` (a node attribute as loaded from
    /// the graph) into our `Value`. This is a structural conversion, not
    /// the literal-parsing grammar below -- JSON already distinguishes
    /// strings from numbers from booleans.
    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            Json::Object(_) => Value::String(json.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Parses a single literal per the grammar's value-precedence rule:
/// quoted string, bracketed list, boolean (case-insensitive), int,
/// float, bare string -- in that order, each tried only if the previous
/// one didn't match.
pub fn parse_literal(input: &str) -> Value {
    let s = input.trim();

    if let Some(inner) = strip_quotes(s) {
        return Value::String(inner.to_string());
    }

    if s.starts_with('[') && s.ends_with(']') {
        let inner = &s[1..s.len() - 1];
        let items = split_list_items(inner)
            .into_iter()
            .map(|item| parse_literal(item.trim()))
            .collect();
        return Value::List(items);
    }

    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }

    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }

    Value::String(s.to_string())
}

fn strip_quotes(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}

/// Splits a comma-separated list's inner text into items, respecting
/// quoted strings and nested brackets so that `"a, b", [1, 2]` splits
/// into two items, not four.
fn split_list_items(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut in_quote: Option<u8> = None;
    let mut start = 0usize;
    let bytes = inner.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        match in_quote {
            Some(q) if b == q => in_quote = None,
            Some(_) => continue,
            None => match b {
                b'"' | b'\'' => in_quote = Some(b),
                b'[' => depth += 1,
                b']' => depth -= 1,
                b',' if depth == 0 => {
                    items.push(&inner[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    items.push(&inner[start..]);
    items
}
