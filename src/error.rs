//! Crate-wide error type.
//!
//! Every fallible boundary in this crate returns `Result<T, Error>`. The
//! variants line up with the three failure buckets from the rule-engine
//! design: a missing input file is fatal, a malformed rule or condition is
//! recoverable (and never reaches this type — see `Diagnostic` in
//! `crate::rules`), and anything else is an I/O or (de)serialization
//! failure bubbled up from `serde_json`/`serde_yaml`.

use std::io;
use std::path::PathBuf;

use failure::{Context, Fail};

/// The crate's error type.
///
/// `Error` wraps an `ErrorKind` in a `failure::Context` so that every
/// error carries a chain of causes back to the original I/O or parse
/// failure, in the same style used throughout this codebase's CLI error
/// reporting (`--color` cause chains).
#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

/// The kind of error that occurred.
#[derive(Debug, Fail)]
pub enum ErrorKind {
    /// The symbol graph file could not be found or read.
    #[fail(display = "failed to read symbol graph from {:?}", _0)]
    GraphUnreadable(PathBuf),

    /// The symbol graph file was not valid JSON, or was JSON but didn't
    /// match the expected shape.
    #[fail(display = "failed to parse symbol graph")]
    GraphMalformed,

    /// The rule file could not be found or read.
    #[fail(display = "failed to read rules from {:?}", _0)]
    RulesUnreadable(PathBuf),

    /// The rule file was not valid YAML.
    #[fail(display = "failed to parse rules")]
    RulesMalformed,

    /// No rules were loaded at all. This is almost certainly a
    /// misconfiguration (an empty file, or every rule was rejected),
    /// so it is treated as fatal rather than "0 matches everywhere".
    #[fail(display = "no rules were loaded")]
    NoRules,

    /// Writing one of the output artifacts failed.
    #[fail(display = "failed to write {:?}", _0)]
    OutputUnwritable(PathBuf),

    /// A bare I/O error with no more specific context.
    #[fail(display = "I/O error")]
    Io,
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&failure::Backtrace> {
        self.inner.backtrace()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Error {
        Error { inner }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        err.context(ErrorKind::Io).into()
    }
}

/// Extension trait mirroring `failure::ResultExt`, renamed locally so call
/// sites read `.context(ErrorKind::...)` without importing `failure`
/// directly everywhere.
pub trait ResultExt<T> {
    fn context(self, kind: ErrorKind) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Fail,
{
    fn context(self, kind: ErrorKind) -> Result<T, Error> {
        self.map_err(|err| err.context(kind).into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
