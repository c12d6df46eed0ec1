//! KodiScript: an embeddable scripting language.
//!
//! A host application injects variables, registers functions, runs a short
//! script, and gets back a value plus any captured output and errors. This
//! crate is the language runtime: lexer, parser, AST, and a tree-walking
//! evaluator with closures, a standard library, and bounded execution.
//!
//! The end-user façade (assembling a builder, reading a result record) lives
//! in [`host`]; [`host::KodiScript`] is the main entry point hosts use.

pub mod ast;
pub mod builtins;
pub mod evaluator;
pub mod host;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod value;

pub use evaluator::{EvalError, RunResult};
pub use host::{HostFunction, KodiScript, KodiScriptBuilder};
pub use lexer::LexError;
pub use limits::Limits;
pub use parser::ParseError;
pub use value::Value;

use std::error::Error as StdError;
use std::fmt;

/// Any error from one of the three compilation stages.
///
/// The eval-only host entry point ([`host::eval`]) re-raises this directly;
/// the record-producing entry points instead fold it into
/// [`RunResult::errors`] as a single human-readable string.
#[derive(Debug)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    Eval(EvalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "{e}"),
            Error::Parse(e) => write!(f, "{e}"),
            Error::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Lex(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Eval(e) => Some(e),
        }
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}
