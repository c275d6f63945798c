//! The condition compiler (C8): parses a condition string once, at rule
//! load time, into a `CompiledCondition` that the evaluator (`eval.rs`)
//! can apply to many candidates without re-parsing.
//!
//! Grounded in the teacher crate's use of `nom` for small DSLs, and in
//! the grammar given for property/edge condition strings. A condition
//! that fails to parse becomes `CompiledCondition::Unsatisfiable`
//! (logged as a warning by the caller) rather than being dropped, so
//! that rule and condition indices stay stable for diagnostics.

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{alpha1, alphanumeric1, char, multispace0};
use nom::combinator::{map, opt, recognize};
use nom::multi::{many0, separated_list};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;

use crate::graph::Direction;
use crate::value::{parse_literal, Value};

/// A single step in a property path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Parent,
    Child,
    Superclass,
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    In,
    Contains,
    ContainsAny,
    StartsWith,
}

/// A condition string, compiled once at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledCondition {
    /// `VAR(.step)*.attr OP value`
    Property {
        path: Vec<Step>,
        attr: String,
        op: Op,
        value: Value,
    },
    /// `VAR --> VAR`, optionally typed: `VAR--TYPE-->VAR`.
    Edge {
        direction: Direction,
        edge_type: Option<String>,
    },
    /// A condition that failed to parse. Never matches.
    Unsatisfiable,
}

/// Parses and compiles a condition string. Returns `Unsatisfiable`
/// (never an error) so load-time diagnostics can log the string and
/// keep going -- compiling, unlike evaluating, never aborts a rule.
pub fn compile(input: &str) -> CompiledCondition {
    match condition(input.trim()) {
        Ok((rest, cond)) if rest.trim().is_empty() => cond,
        _ => CompiledCondition::Unsatisfiable,
    }
}

fn condition(input: &str) -> IResult<&str, CompiledCondition> {
    alt((edge_condition, property_condition))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    alt((
        map(tag("parent"), |_| Step::Parent),
        map(tag("child"), |_| Step::Child),
        map(tag("superclass"), |_| Step::Superclass),
    ))(input)
}

fn property_condition(input: &str) -> IResult<&str, CompiledCondition> {
    let (input, _var) = identifier(input)?;
    let (input, segments) = many0(preceded(char('.'), identifier))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, op) = operator(input)?;
    let (input, _) = multispace0(input)?;
    let (input, value) = value_literal(input)?;

    // The last dotted segment is always the attribute name; any
    // preceding ones must be traversal keys (`parent`/`child`/
    // `superclass`). A bare `VAR.attr` (no traversal step) is valid and
    // checks the candidate itself.
    let mut segments = segments;
    let attr = match segments.pop() {
        Some(last) => last.to_string(),
        None => return Err(nom::Err::Error((input, nom::error::ErrorKind::Tag))),
    };

    let mut path = Vec::with_capacity(segments.len());
    for seg in segments {
        match step(seg) {
            Ok(("", s)) => path.push(s),
            _ => return Err(nom::Err::Error((input, nom::error::ErrorKind::Tag))),
        }
    }

    Ok((
        input,
        CompiledCondition::Property {
            path,
            attr,
            op,
            value,
        },
    ))
}

fn operator(input: &str) -> IResult<&str, Op> {
    alt((
        map(tag("=="), |_| Op::Eq),
        map(tag("!="), |_| Op::Ne),
        map(tag("contains_any"), |_| Op::ContainsAny),
        map(tag("contains"), |_| Op::Contains),
        map(tag("starts_with"), |_| Op::StartsWith),
        map(tag("in"), |_| Op::In),
    ))(input)
}

fn value_literal(input: &str) -> IResult<&str, Value> {
    alt((quoted_string, bracketed_list, bare_literal))(input)
}

fn quoted_string(input: &str) -> IResult<&str, Value> {
    let double = delimited(char('"'), opt(is_not("\"")), char('"'));
    let single = delimited(char('\''), opt(is_not("'")), char('\''));

    map(alt((double, single)), |inner: Option<&str>| {
        Value::String(inner.unwrap_or("").to_string())
    })(input)
}

fn bracketed_list(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            pair(char('['), multispace0),
            separated_list(
                tuple((multispace0, char(','), multispace0)),
                value_literal,
            ),
            pair(multispace0, char(']')),
        ),
        Value::List,
    )(input)
}

fn bare_literal(input: &str) -> IResult<&str, Value> {
    map(
        recognize(pair(
            alt((alphanumeric1, tag("_"), tag("-"), tag("."))),
            many0(alt((alphanumeric1, tag("_"), tag("-"), tag(".")))),
        )),
        parse_literal,
    )(input)
}

fn edge_type(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn edge_condition(input: &str) -> IResult<&str, CompiledCondition> {
    alt((outgoing_edge, incoming_edge))(input)
}

fn outgoing_edge(input: &str) -> IResult<&str, CompiledCondition> {
    let (input, _) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, edge_type) = opt(preceded(tag("--"), edge_type))(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = identifier(input)?;

    Ok((
        input,
        CompiledCondition::Edge {
            direction: Direction::Outgoing,
            edge_type: edge_type.map(str::to_string),
        },
    ))
}

fn incoming_edge(input: &str) -> IResult<&str, CompiledCondition> {
    let (input, _) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("<--")(input)?;
    let (input, edge_type) = opt(terminated(edge_type, tag("--")))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = identifier(input)?;

    Ok((
        input,
        CompiledCondition::Edge {
            direction: Direction::Incoming,
            edge_type: edge_type.map(str::to_string),
        },
    ))
}
