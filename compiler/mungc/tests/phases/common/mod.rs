//! Shared helpers for phase tests.

use mungc::{Ast, EvalErrorKind, Error, ParseOptions, Value};

/// Parse with default options, panicking with the rendered error.
pub fn parse(source: &str) -> Ast {
    mungc::parse(source, &ParseOptions::default()).unwrap_or_else(|e| panic!("{e}"))
}

/// Evaluate `name` in `source`, panicking on failure.
pub fn eval(source: &str, name: &str, args: &[&str]) -> Value {
    mungc::evaluate_namespace(&parse(source), name, args).unwrap_or_else(|e| panic!("{e}"))
}

/// The evaluation error kind of a failing evaluation.
pub fn eval_error(source: &str, name: &str, args: &[&str]) -> EvalErrorKind {
    match mungc::evaluate_namespace(&parse(source), name, args) {
        Err(Error::Eval(err)) => err.kind,
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}
