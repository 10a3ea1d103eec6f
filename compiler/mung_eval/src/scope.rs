//! Lexical scope chain.
//!
//! Levels, innermost first: call parameters, enclosing block siblings,
//! top-level namespaces. Builtins sit outside the chain and are consulted
//! by the caller after a miss. Frames are immutable and shared with `Arc`,
//! so closures can capture the scope they were defined in.

use std::sync::Arc;

use mung_expr::Value;
use mung_ir::{Namespace, Tuple};
use rustc_hash::FxHashMap;

/// Bindings introduced by one level.
pub(crate) enum Level {
    Top(Arc<Vec<Arc<Namespace>>>),
    /// Block siblings. `values` holds siblings already evaluated; the rest
    /// resolve lazily from `tuple`.
    Block {
        tuple: Arc<Tuple>,
        values: FxHashMap<String, Value>,
    },
    Params(FxHashMap<String, Value>),
}

struct Frame {
    level: Level,
    parent: Option<Scope>,
    /// No `Params` level anywhere in the chain: a namespace resolved here
    /// always evaluates to the same value.
    pure: bool,
}

/// What a name resolves to.
#[derive(Clone)]
pub(crate) enum Binding {
    /// A namespace, with the scope it was defined in.
    Namespace { ns: Arc<Namespace>, scope: Scope },
    Value(Value),
}

#[derive(Clone)]
pub(crate) struct Scope(Arc<Frame>);

impl Scope {
    pub(crate) fn top(namespaces: Arc<Vec<Arc<Namespace>>>) -> Self {
        Scope(Arc::new(Frame {
            level: Level::Top(namespaces),
            parent: None,
            pure: true,
        }))
    }

    #[must_use]
    pub(crate) fn child(&self, level: Level) -> Self {
        let pure = self.0.pure && !matches!(level, Level::Params(_));
        Scope(Arc::new(Frame {
            level,
            parent: Some(self.clone()),
            pure,
        }))
    }

    #[inline]
    pub(crate) fn is_pure(&self) -> bool {
        self.0.pure
    }

    /// Resolve `name`, innermost level first. The first definition of a
    /// repeated name within one level wins.
    pub(crate) fn lookup(&self, name: &str) -> Option<Binding> {
        let mut frame = self;
        loop {
            let found = match &frame.0.level {
                Level::Params(params) => params.get(name).cloned().map(Binding::Value),
                Level::Block { tuple, values } => match values.get(name) {
                    Some(value) => Some(Binding::Value(value.clone())),
                    None => tuple.find(name).map(|ns| Binding::Namespace {
                        ns: Arc::clone(ns),
                        scope: frame.clone(),
                    }),
                },
                Level::Top(namespaces) => namespaces
                    .iter()
                    .find(|ns| ns.name() == name)
                    .map(|ns| Binding::Namespace {
                        ns: Arc::clone(ns),
                        scope: frame.clone(),
                    }),
            };
            if found.is_some() {
                return found;
            }
            frame = frame.0.parent.as_ref()?;
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}
