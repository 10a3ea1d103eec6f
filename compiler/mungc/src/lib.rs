//! mung: configuration documents built from namespaces, blocks and
//! expressions.
//!
//! This crate ties the pipeline together:
//!
//! - [`parse`] and [`parse_reader`] build an [`Ast`] from source text.
//! - [`parse_cached`] and [`load`] go through the process-wide
//!   [`SourceCache`], so each distinct source is parsed once.
//! - [`evaluate_namespace`], [`evaluate_expr`] and [`evaluate_all`] run the
//!   process-wide [`Evaluator`].
//!
//! Components are also usable on their own: create a [`SourceCache`] or an
//! [`Evaluator`] to keep state out of the process-wide instances.

mod error;
mod tracing_setup;

use std::io::Read;
use std::path::Path;

pub use error::Error;
pub use tracing_setup::{init_tracing, LOG_ENV};

pub use mung_cache::{cache_key, SourceCache};
pub use mung_eval::{
    Builtins, EvalError, EvalErrorKind, EvalOptions, EvalResult, Evaluator, DEFAULT_MAX_CALL_DEPTH,
};
pub use mung_expr::{Arity, Map, Value};
pub use mung_ir::{
    define_namespace, Ast, EnvSnapshot, Namespace, Param, ParseOptions, Position, Tuple,
    Value as AstValue, ValueKind, DEFAULT_MAX_RECURSION_DEPTH,
};
pub use mung_parse::{ParseError, ParseErrorKind};

/// Parse a document without caching.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Ast, Error> {
    Ok(mung_parse::parse(source, options)?)
}

/// Read a document to the end and parse it without caching.
pub fn parse_reader(reader: impl Read, options: &ParseOptions) -> Result<Ast, Error> {
    Ok(mung_parse::parse_reader(reader, options)?)
}

/// Parse through the process-wide cache.
pub fn parse_cached(source: &str, options: &ParseOptions) -> Result<Ast, Error> {
    Ok(mung_cache::parse_cached(source, options)?)
}

/// Drop every entry of the process-wide cache.
pub fn clear_cache() {
    mung_cache::clear_cache();
}

/// Read the file at `path` and parse it through the process-wide cache.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Ast, Error> {
    load_with(SourceCache::global(), path.as_ref(), options)
}

/// Read the file at `path` and parse it through `cache`.
pub fn load_with(cache: &SourceCache, path: &Path, options: &ParseOptions) -> Result<Ast, Error> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::ReadInput {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    Ok(cache.get_or_parse(&source, options)?)
}

/// Evaluate the top-level namespace `name`, calling it with `args` when it
/// has parameters.
pub fn evaluate_namespace(ast: &Ast, name: &str, args: &[&str]) -> Result<Value, Error> {
    Ok(Evaluator::global().evaluate_namespace(ast, name, args)?)
}

/// Evaluate expression text against the top-level namespaces of `ast`.
pub fn evaluate_expr(ast: &Ast, source: &str) -> Result<Value, Error> {
    Ok(Evaluator::global().evaluate_expr(ast, source)?)
}

/// Evaluate every non-parameterized top-level namespace.
pub fn evaluate_all(ast: &Ast) -> Result<Map, Error> {
    Ok(Evaluator::global().evaluate_all(ast)?)
}

/// Parse `source` through the process-wide cache and evaluate `name`.
pub fn evaluate_source(source: &str, name: &str, args: &[&str]) -> Result<Value, Error> {
    let ast = parse_cached(source, &ParseOptions::default())?;
    evaluate_namespace(&ast, name, args)
}
