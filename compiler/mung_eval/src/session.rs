//! One evaluation request.
//!
//! A session owns the per-request state: the cycle guard, memoized
//! namespace values, the call depth and the error stashed while a closure
//! call unwinds through the expression engine. Shared state (compiled
//! programs, pooled environments, builtins) lives on the [`Evaluator`].

use std::any::Any;
use std::sync::Arc;

use mung_expr::{
    CompileError, CompileErrorKind, Func, Host, Map, Program, RuntimeError, RuntimeErrorKind, Value,
};
use mung_ir::{self as ir, Namespace, Tuple};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::builtins::Builtins;
use crate::cook;
use crate::errors::{
    expr_compile, expr_evaluate, not_defined, parameter_count_mismatch, recursion_limit,
    EvalError, EvalErrorKind, EvalResult,
};
use crate::evaluator::Evaluator;
use crate::patch::HyphenPatcher;
use crate::scope::{Binding, Level, Scope};
use crate::shape::{self, StaticResolver};

/// A parameterized namespace with the scope it was defined in. Carried as
/// the handle of a host function value.
pub(crate) struct Closure {
    pub(crate) ns: Arc<Namespace>,
    pub(crate) scope: Scope,
}

impl Closure {
    pub(crate) fn into_value(self) -> Value {
        let name = self.ns.name().to_string();
        // Arity is checked in `call_closure`, where the signature is known.
        Value::Func(Func::host(name, mung_expr::Arity::AtLeast(0), Arc::new(self)))
    }
}

/// Text that an identifier may only contain when it is really an
/// expression the lexer kept in one piece (`a-b`, `x+1`).
const OPERATOR_CHARS: [char; 4] = ['-', '+', '/', '@'];

pub(crate) struct Session<'e> {
    evaluator: &'e Evaluator,
    builtins: Arc<Builtins>,
    /// Namespaces currently being resolved, by node address.
    resolving: FxHashSet<usize>,
    /// Values of namespaces resolved in scopes without parameters.
    memo: FxHashMap<usize, Value>,
    /// Cycle cuts so far. A value resolved while a cut happened may depend
    /// on the placeholder and is not memoized.
    cuts: usize,
    depth: usize,
    /// Error of a closure call, held while the engine unwinds.
    pending: Option<EvalError>,
}

fn node_key(ns: &Arc<Namespace>) -> usize {
    Arc::as_ptr(ns) as usize
}

impl<'e> Session<'e> {
    pub(crate) fn new(evaluator: &'e Evaluator, builtins: Arc<Builtins>) -> Self {
        Session {
            evaluator,
            builtins,
            resolving: FxHashSet::default(),
            memo: FxHashMap::default(),
            cuts: 0,
            depth: 0,
            pending: None,
        }
    }

    pub(crate) fn evaluate(&mut self, value: &ir::Value, scope: &Scope) -> EvalResult {
        mung_stack::with_stack(|| self.evaluate_value(value, scope)).map_err(|e| e.at(value.pos()))
    }

    fn evaluate_value(&mut self, value: &ir::Value, scope: &Scope) -> EvalResult {
        match value {
            ir::Value::Boolean(token) => cook::boolean(token),
            ir::Value::Number(token) => cook::number(token),
            ir::Value::String(token) => cook::string(token),
            ir::Value::Identifier(token) => self.identifier(&token.text, scope),
            ir::Value::Expr(expr) => self.expression(expr.source(), expr.program(), scope),
            ir::Value::Tuple(tuple) if tuple.is_block() => self.block(tuple, scope),
            ir::Value::Tuple(tuple) => {
                let items = tuple
                    .values()
                    .iter()
                    .map(|item| self.evaluate(item, scope))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::list(items))
            }
            ir::Value::Namespace(inner) => self.resolve_namespace(inner, scope),
        }
    }

    /// The value a namespace contributes to its scope: a closure when it
    /// has parameters, otherwise its evaluated value.
    ///
    /// A namespace met again while it is still being resolved resolves to
    /// nil instead of recursing.
    pub(crate) fn resolve_namespace(&mut self, ns: &Arc<Namespace>, scope: &Scope) -> EvalResult {
        if ns.is_parameterized() {
            return Ok(Closure {
                ns: Arc::clone(ns),
                scope: scope.clone(),
            }
            .into_value());
        }
        let key = node_key(ns);
        if let Some(value) = self.memo.get(&key) {
            return Ok(value.clone());
        }
        if !self.resolving.insert(key) {
            trace!(name = ns.name(), "cyclic reference resolved to nil");
            self.cuts += 1;
            return Ok(Value::Nil);
        }
        let cuts = self.cuts;
        let result = self.evaluate(ns.value(), scope);
        self.resolving.remove(&key);
        let value = result?;
        if scope.is_pure() && self.cuts == cuts {
            self.memo.insert(key, value.clone());
        }
        Ok(value)
    }

    /// Resolve `name` in the scope chain, then the builtins. `None` leaves
    /// the name to the expression engine's standard functions.
    fn resolve_name(&mut self, name: &str, scope: &Scope) -> EvalResult<Option<Value>> {
        match scope.lookup(name) {
            Some(Binding::Value(value)) => Ok(Some(value)),
            Some(Binding::Namespace { ns, scope }) => self.resolve_namespace(&ns, &scope).map(Some),
            None => Ok(self.builtins.get(name).cloned()),
        }
    }

    fn identifier(&mut self, text: &str, scope: &Scope) -> EvalResult {
        if let Some(value) = self.resolve_name(text, scope)? {
            return Ok(value);
        }
        if let Some((head, rest)) = text.split_once('.') {
            if let Some(mut value) = self.resolve_name(head, scope)? {
                for segment in rest.split('.') {
                    value = shape::strict_member(&value, segment).ok_or_else(|| not_defined(text))?;
                }
                return Ok(value);
            }
        }
        if text.contains(OPERATOR_CHARS) {
            return self.expression(text, None, scope).map_err(|err| match err.kind {
                EvalErrorKind::ExprCompile { .. } => not_defined(text),
                _ => err,
            });
        }
        Err(not_defined(text))
    }

    /// Evaluate a block: literal siblings first, so expressions can read
    /// them, then every entry in order. The first definition of a repeated
    /// name wins.
    fn block(&mut self, tuple: &Arc<Tuple>, scope: &Scope) -> EvalResult {
        let siblings = scope.child(Level::Block {
            tuple: Arc::clone(tuple),
            values: FxHashMap::default(),
        });
        let mut seen = FxHashSet::default();
        let mut values = FxHashMap::default();
        for ns in tuple.namespaces() {
            if !seen.insert(ns.name()) || ns.is_parameterized() || ns.value().is_expr() {
                continue;
            }
            let value = self.resolve_namespace(ns, &siblings)?;
            values.insert(ns.name().to_string(), value);
        }

        let siblings = scope.child(Level::Block {
            tuple: Arc::clone(tuple),
            values,
        });
        let mut map = Map::with_capacity(tuple.len());
        for ns in tuple.namespaces() {
            if map.contains_key(ns.name()) {
                continue;
            }
            let value = match siblings.lookup(ns.name()) {
                Some(Binding::Value(value)) => value,
                _ => self.resolve_namespace(ns, &siblings)?,
            };
            map.insert(ns.name().to_string(), value);
        }
        Ok(Value::map(map))
    }

    fn expression(
        &mut self,
        source: &str,
        compiled: Option<&Arc<Program>>,
        scope: &Scope,
    ) -> EvalResult {
        let evaluator = self.evaluator;
        let base = match compiled {
            Some(program) => Arc::clone(program),
            None => evaluator
                .programs()
                .get_or_compile(source)
                .map_err(|e| expr_compile(source, e))?,
        };

        let patched;
        let program: &Program = if source.contains('-') {
            let mut copy = Program::clone(&base);
            let resolver = StaticResolver {
                scope,
                builtins: &self.builtins,
            };
            let mut patcher = HyphenPatcher::new(&resolver);
            copy.patch(&mut patcher);
            if patcher.fused() > 0 {
                patched = copy;
                &patched
            } else {
                &base
            }
        } else {
            &base
        };

        let names = program.free_names();
        {
            let mut types = evaluator.envs().acquire();
            for &name in &names {
                if let Some(exemplar) = shape::exemplar(name, scope, &self.builtins) {
                    types.insert(name.to_string(), exemplar);
                }
            }
            mung_expr::check(program, &types).map_err(|e| self.compile_error(source, &e, scope))?;
        }

        let mut env = evaluator.envs().acquire();
        for &name in &names {
            if let Some(value) = self.resolve_name(name, scope)? {
                env.insert(name.to_string(), value);
            }
        }
        match mung_expr::run(program, &env, self) {
            Ok(value) => Ok(value),
            Err(err) => Err(self.runtime_error(source, err, scope)),
        }
    }

    /// Declared signature of the namespace `name` refers to, if it is one.
    fn signature(&self, name: &str, scope: &Scope) -> Option<String> {
        match scope.lookup(name)? {
            Binding::Namespace { ns, .. } => Some(ns.signature()),
            Binding::Value(Value::Func(func)) => match func.callable() {
                mung_expr::Callable::Host(handle) => handle
                    .downcast_ref::<Closure>()
                    .map(|closure| closure.ns.signature()),
                mung_expr::Callable::Native(_) => None,
            },
            Binding::Value(_) => None,
        }
    }

    fn compile_error(&self, source: &str, err: &CompileError, scope: &Scope) -> EvalError {
        match &err.kind {
            CompileErrorKind::UnknownName { name } => not_defined(name),
            CompileErrorKind::ArgumentCount {
                name,
                expected,
                got,
            } => parameter_count_mismatch(name, self.signature(name, scope), *expected, *got),
            _ => expr_compile(source, err),
        }
    }

    fn runtime_error(&mut self, source: &str, err: RuntimeError, scope: &Scope) -> EvalError {
        if let (RuntimeErrorKind::Host { .. }, Some(inner)) = (&err.kind, self.pending.take()) {
            return inner;
        }
        match &err.kind {
            RuntimeErrorKind::UnknownName { name } => not_defined(name),
            RuntimeErrorKind::ArgumentCount {
                name,
                expected,
                got,
            } => parameter_count_mismatch(name, self.signature(name, scope), *expected, *got),
            _ => expr_evaluate(source, &err),
        }
    }

    /// Call a parameterized namespace with evaluated arguments.
    pub(crate) fn call_closure(&mut self, closure: &Closure, args: Vec<Value>) -> EvalResult {
        let ns = &closure.ns;
        if !ns.accepts(args.len()) {
            return Err(parameter_count_mismatch(
                ns.name(),
                Some(ns.signature()),
                shape::arity(ns),
                args.len(),
            ));
        }
        let limit = self.evaluator.options().max_call_depth;
        if self.depth >= limit {
            return Err(recursion_limit(ns.name(), limit));
        }

        let mut params = FxHashMap::default();
        let mut args = args.into_iter();
        for param in ns.params() {
            let value = if param.variadic {
                Value::list(args.by_ref().collect())
            } else {
                args.next().unwrap_or_default()
            };
            params.insert(param.name.clone(), value);
        }
        let scope = closure.scope.child(Level::Params(params));

        self.depth += 1;
        let result = self.evaluate(ns.value(), &scope);
        self.depth -= 1;
        result
    }
}

impl Host for Session<'_> {
    fn call(
        &mut self,
        func: &Func,
        handle: &(dyn Any + Send + Sync),
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let Some(closure) = handle.downcast_ref::<Closure>() else {
            return Err(RuntimeError::host(format!(
                "`{}` is not a namespace of this document",
                func.name()
            )));
        };
        self.call_closure(closure, args).map_err(|err| {
            let message = err.to_string();
            self.pending = Some(err);
            RuntimeError::host(message)
        })
    }
}
