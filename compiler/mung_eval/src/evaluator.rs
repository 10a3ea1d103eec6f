//! Public evaluation entry points.

use std::sync::{Arc, OnceLock};

use mung_expr::{Arity, Map, Value};
use mung_ir::{self as ir, Ast, ExprLiteral, Token, TokenKind};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::builtins::Builtins;
use crate::cook;
use crate::errors::{definition_not_found, parameter_count_mismatch, EvalResult};
use crate::options::EvalOptions;
use crate::pool::EnvPool;
use crate::programs::ProgramCache;
use crate::scope::Scope;
use crate::session::{Closure, Session};

static GLOBAL: OnceLock<Evaluator> = OnceLock::new();

/// Evaluates documents.
///
/// Holds what outlives a single request: compiled programs and pooled
/// environment maps. Safe to share between threads; every call runs in its
/// own session.
#[derive(Debug, Default)]
pub struct Evaluator {
    options: EvalOptions,
    programs: ProgramCache,
    envs: EnvPool,
}

impl Evaluator {
    pub fn new(options: EvalOptions) -> Self {
        Evaluator {
            options,
            programs: ProgramCache::new(),
            envs: EnvPool::new(),
        }
    }

    /// Process-wide evaluator with default options.
    pub fn global() -> &'static Evaluator {
        GLOBAL.get_or_init(Evaluator::default)
    }

    #[inline]
    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    #[inline]
    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }

    #[inline]
    pub(crate) fn envs(&self) -> &EnvPool {
        &self.envs
    }

    fn session(&self, ast: &Ast) -> (Session<'_>, Scope) {
        let builtins = match &ast.options().env {
            Some(env) => Arc::new(Builtins::new(env)),
            None => Builtins::global(),
        };
        (
            Session::new(self, builtins),
            Scope::top(ast.shared_namespaces()),
        )
    }

    /// Evaluate the top-level namespace `name`.
    ///
    /// A parameterized namespace is called with `args`, each cooked as a
    /// number, boolean or string literal when it is exactly one, and passed
    /// as plain text otherwise.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name, args = args.len()))]
    pub fn evaluate_namespace(&self, ast: &Ast, name: &str, args: &[&str]) -> EvalResult {
        let ns = ast.namespace(name).ok_or_else(|| definition_not_found(name))?;
        let (mut session, top) = self.session(ast);
        if ns.is_parameterized() {
            let args = args.iter().map(|arg| cook::argument(arg)).collect();
            let closure = Closure {
                ns: Arc::clone(ns),
                scope: top,
            };
            return session
                .call_closure(&closure, args)
                .map_err(|e| e.at(ns.pos()));
        }
        if !args.is_empty() {
            return Err(
                parameter_count_mismatch(name, Some(ns.signature()), Arity::Exact(0), args.len())
                    .at(ns.pos()),
            );
        }
        let value = session.resolve_namespace(ns, &top)?;
        debug!(kind = value.type_name(), "evaluated namespace");
        Ok(value)
    }

    /// Evaluate expression text against the top-level scope.
    ///
    /// The text has no place in the document: errors it raises itself carry
    /// [`Position::DUMMY`](mung_ir::Position::DUMMY) and render without a
    /// position. Errors from namespaces it reads keep their own positions.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %source))]
    pub fn evaluate_expr(&self, ast: &Ast, source: &str) -> EvalResult {
        let value = ir::Value::Expr(ExprLiteral::new(Token::synthetic(TokenKind::Expr, source)));
        self.evaluate(ast, &value)
    }

    /// Evaluate every non-parameterized top-level namespace, in document
    /// order.
    #[tracing::instrument(level = "debug", skip_all, fields(namespaces = ast.len()))]
    pub fn evaluate_all(&self, ast: &Ast) -> EvalResult<Map> {
        let (mut session, top) = self.session(ast);
        let mut seen = FxHashSet::default();
        let mut out = Map::with_capacity(ast.len());
        for ns in ast.namespaces() {
            if !seen.insert(ns.name()) || ns.is_parameterized() {
                continue;
            }
            let value = session.resolve_namespace(ns, &top)?;
            out.insert(ns.name().to_string(), value);
        }
        Ok(out)
    }

    /// Evaluate a document value in the top-level scope of `ast`.
    pub fn evaluate(&self, ast: &Ast, value: &ir::Value) -> EvalResult<Value> {
        let (mut session, top) = self.session(ast);
        session.evaluate(value, &top)
    }
}
