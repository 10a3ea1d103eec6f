//! Recursive descent parser for mung documents.
//!
//! Produces an [`Ast`] from native source text. Parsing stops at the first
//! error; every error carries a position and a rendered source snippet.

mod cursor;
mod error;
mod grammar;

pub use error::{ParseError, ParseErrorKind};

use std::io::Read;

use mung_ir::{Ast, ParseOptions};
use tracing::debug;

/// Parse a document.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str, options: &ParseOptions) -> Result<Ast, ParseError> {
    let ast = grammar::Parser::new(source, options).manifest()?;
    debug!(namespaces = ast.len(), "parsed document");
    Ok(ast)
}

/// Read a document to the end and parse it.
pub fn parse_reader(mut reader: impl Read, options: &ParseOptions) -> Result<Ast, ParseError> {
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|e| ParseError::read_input(&e))?;
    parse(&source, options)
}

#[cfg(test)]
mod tests;
