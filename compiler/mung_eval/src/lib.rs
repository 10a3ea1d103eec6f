//! Evaluation of mung documents.
//!
//! Values resolve against a scope chain, innermost first: call parameters,
//! enclosing block siblings, top-level namespaces, then builtins.
//! Expressions are compiled once per source text, repaired for hyphenated
//! names, checked against exemplar values and run against the concrete
//! values of the names they reference.
//!
//! ```text
//! let ast = mung_parse::parse("add x y : {{ x + y }}", &ParseOptions::default())?;
//! let sum = Evaluator::global().evaluate_namespace(&ast, "add", &["10", "32"])?;
//! ```

mod builtins;
mod cook;
pub mod errors;
mod evaluator;
mod options;
mod patch;
mod pool;
mod programs;
mod scope;
mod session;
mod shape;

pub use builtins::Builtins;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use evaluator::Evaluator;
pub use options::{EvalOptions, DEFAULT_MAX_CALL_DEPTH};
pub use patch::{HyphenPatcher, NameResolver};
pub use pool::{EnvPool, PooledEnv};
pub use programs::ProgramCache;
