//! Static view of a scope.
//!
//! Before an expression runs, the checker needs the shape of every name it
//! reads and the hyphen patcher needs to know which names exist. Both are
//! answered here from the document alone, without evaluating anything.

use mung_expr::{Arity, Func, Map, Value};
use mung_ir::literal::{self, Number};
use mung_ir::{self as ir, Namespace};

use crate::builtins::Builtins;
use crate::patch::NameResolver;
use crate::scope::{Binding, Scope};

/// Bound on reference chains (`a : b`, `b : c`) followed statically.
const MAX_HOPS: usize = 16;

/// Runtime arity of a parameterized namespace.
pub(crate) fn arity(ns: &Namespace) -> Arity {
    if ns.variadic().is_some() {
        Arity::AtLeast(ns.fixed_arity())
    } else {
        Arity::Exact(ns.params().len())
    }
}

/// Exemplar for `name`: a value of the same type as its eventual value.
/// `None` when the name is not visible.
pub(crate) fn exemplar(name: &str, scope: &Scope, builtins: &Builtins) -> Option<Value> {
    match scope.lookup(name) {
        Some(Binding::Value(value)) => Some(value),
        Some(Binding::Namespace { ns, scope }) => {
            Some(namespace_exemplar(&ns, &scope, builtins, MAX_HOPS))
        }
        None => builtins.get(name).cloned(),
    }
}

fn namespace_exemplar(ns: &Namespace, scope: &Scope, builtins: &Builtins, hops: usize) -> Value {
    if ns.is_parameterized() {
        return Value::Func(Func::placeholder(ns.name(), arity(ns)));
    }
    value_exemplar(ns.value(), scope, builtins, hops)
}

fn value_exemplar(value: &ir::Value, scope: &Scope, builtins: &Builtins, hops: usize) -> Value {
    match value {
        ir::Value::Boolean(_) => Value::Bool(false),
        ir::Value::Number(token) => match literal::parse_number(&token.text) {
            Some(Number::Float(_)) => Value::Float(0.0),
            _ => Value::Int(0),
        },
        ir::Value::String(_) => Value::from(""),
        ir::Value::Expr(_) => Value::Nil,
        ir::Value::Tuple(tuple) if tuple.is_block() => Value::map(Map::new()),
        ir::Value::Tuple(_) => Value::list(Vec::new()),
        ir::Value::Namespace(inner) => namespace_exemplar(inner, scope, builtins, hops),
        ir::Value::Identifier(token) => {
            let Some(hops) = hops.checked_sub(1) else {
                return Value::Nil;
            };
            match scope.lookup(&token.text) {
                Some(Binding::Value(value)) => value,
                Some(Binding::Namespace { ns, scope }) => {
                    namespace_exemplar(&ns, &scope, builtins, hops)
                }
                None => builtins.get(&token.text).cloned().unwrap_or_default(),
            }
        }
    }
}

/// A statically known node: a document value in its scope, or a value
/// that is already concrete.
enum Node {
    Document(ir::Value, Scope),
    Concrete(Value),
}

impl Node {
    /// Follow references and nested definitions to the value that carries
    /// children.
    fn settle(self, hops: usize) -> Option<Node> {
        let Node::Document(value, scope) = self else {
            return Some(self);
        };
        let hops = hops.checked_sub(1)?;
        match value {
            ir::Value::Namespace(inner) if !inner.is_parameterized() => {
                Node::Document(inner.value().clone(), scope).settle(hops)
            }
            ir::Value::Identifier(token) => match scope.lookup(&token.text)? {
                Binding::Value(value) => Some(Node::Concrete(value)),
                Binding::Namespace { ns, scope } => {
                    Node::Document(ns.value().clone(), scope).settle(hops)
                }
            },
            value => Some(Node::Document(value, scope)),
        }
    }

    fn child(self, name: &str) -> Option<Node> {
        match self.settle(MAX_HOPS)? {
            Node::Concrete(value) => strict_member(&value, name).map(Node::Concrete),
            Node::Document(ir::Value::Tuple(tuple), scope) => tuple
                .find(name)
                .map(|ns| Node::Document(ns.value().clone(), scope)),
            Node::Document(..) => None,
        }
    }
}

/// Member `name` of a map or of a function with members. Unlike
/// [`Value::member`], a missing key is `None`.
pub(crate) fn strict_member(value: &Value, name: &str) -> Option<Value> {
    match value {
        Value::Map(map) => map.get(name).cloned(),
        Value::Func(func) => func.members()?.get(name).cloned(),
        _ => None,
    }
}

/// Answers name existence for the hyphen patcher.
pub(crate) struct StaticResolver<'a> {
    pub(crate) scope: &'a Scope,
    pub(crate) builtins: &'a Builtins,
}

impl StaticResolver<'_> {
    fn root(&self, name: &str) -> Option<Node> {
        match self.scope.lookup(name) {
            Some(Binding::Value(value)) => Some(Node::Concrete(value)),
            Some(Binding::Namespace { ns, scope }) => {
                Some(Node::Document(ns.value().clone(), scope))
            }
            None => self.builtins.get(name).cloned().map(Node::Concrete),
        }
    }
}

impl NameResolver for StaticResolver<'_> {
    fn has_name(&self, name: &str) -> bool {
        self.scope.contains(name) || self.builtins.contains(name)
    }

    fn has_member(&self, path: &[&str], member: &str) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return false;
        };
        let mut node = self.root(first);
        for segment in rest.iter().chain(std::iter::once(&member)) {
            node = node.and_then(|n| n.child(segment));
        }
        node.is_some()
    }
}
