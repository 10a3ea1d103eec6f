//! Expression engine for `{{ ... }}` and bare expressions in mung documents.
//!
//! The engine is used in three steps:
//!
//! 1. [`compile`] parses source text into a [`Program`]. Programs depend
//!    only on the text, so callers may cache them by source.
//! 2. [`check`] validates a program against a [`TypeEnv`] of exemplar
//!    values before anything runs. Embedders may first rewrite the program
//!    with [`Program::patch`].
//! 3. [`run`] executes the program against an [`Env`] of concrete values.
//!    Calls of [`Callable::Host`] functions are routed back to the embedder
//!    through [`Host`].

mod check;
mod error;
mod interp;
mod lexer;
mod parser;
pub mod stdlib;
mod syntax;
mod value;

pub use check::{check, TypeEnv};
pub use error::{CompileError, CompileErrorKind, RuntimeError, RuntimeErrorKind};
pub use interp::{call, run, Env, Host, NoHost};
pub use syntax::{BinaryOp, Expr, ExprId, Patch, Program, UnaryOp};
pub use value::{Arity, Callable, Func, Map, NativeFn, Value};

/// Is `word` an operator spelled as a word (`and`, `in`, `not`, ...)?
pub fn is_operator_word(word: &str) -> bool {
    word == "not" || BinaryOp::from_word(word).is_some()
}

/// Parse an expression.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let program = parser::parse(source)?;
    tracing::trace!(source, nodes = program.len(), "compiled expression");
    Ok(program)
}
