//! Data model for mung documents.
//!
//! A document (`Ast`) is an ordered list of namespaces. Each namespace binds
//! an identifier, plus optional parameters, to exactly one [`Value`]. Values
//! are literals, references, free-form expressions, tuples (blocks and
//! aggregates) or nested namespace definitions.
//!
//! Everything here is immutable once built. Nodes are shared through `Arc`
//! so the source cache and concurrent evaluations can hand out the same
//! namespaces without copying them.

mod ast;
mod build;
mod format;
pub mod literal;
mod options;
mod span;
mod token;

#[cfg(feature = "serde")]
mod native;

pub use ast::{Ast, AstError, ExprLiteral, Namespace, Param, Params, Tuple, Value, ValueKind};
pub use build::define_namespace;
pub use options::{EnvSnapshot, ParseOptions, DEFAULT_MAX_RECURSION_DEPTH};
pub use span::{Position, Span};
pub use token::{Token, TokenKind};
