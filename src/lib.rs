//! `obfguard`: decides which Swift/Objective-C symbols must survive
//! identifier obfuscation.
//!
//! The crate is a declarative graph pattern-matching engine. It is
//! handed a pre-built symbol graph (every declaration in a project and
//! its relationships) and a YAML rule database, and produces a
//! de-duplicated exclusion list: symbol names an obfuscator must leave
//! untouched because they are reachable from outside the Swift code
//! itself (Interface Builder, resource bundles, public headers, runtime
//! reflection, framework inheritance, ...).
//!
//! Parsing headers, resources, or Swift source into a symbol graph is
//! out of scope -- this crate consumes that graph as a boundary input
//! (`graph::load`) and otherwise only matches.

pub mod condition;
pub mod engine;
pub mod error;
pub mod eval;
pub mod graph;
pub mod pattern;
pub mod report;
pub mod rules;
pub mod value;

pub use crate::engine::{run, AnalysisResult, Reason};
pub use crate::error::{Error, ErrorKind, ResultExt};
pub use crate::graph::SymbolGraph;
pub use crate::report::Report;
pub use crate::rules::{Diagnostic, Rules};
