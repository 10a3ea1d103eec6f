//! Parse options.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Default limit on nested namespace definitions.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 100;

/// A process-environment snapshot used by the `env` builtin.
///
/// Stored in key order, so two snapshots with the same pairs compare and
/// hash equal regardless of how they were collected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment. Variables whose name or
    /// value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EnvSnapshot {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Options that change what a parse produces or how it evaluates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of namespace definitions.
    pub max_recursion_depth: usize,
    /// Compile expression syntax while parsing instead of on first use.
    pub compile_expressions: bool,
    /// Environment override for the `env` builtin. `None` uses the process
    /// environment.
    pub env: Option<EnvSnapshot>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            compile_expressions: false,
            env: None,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    #[must_use]
    pub fn with_compile_expressions(mut self, eager: bool) -> Self {
        self.compile_expressions = eager;
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = Some(env);
        self
    }

    /// Whether results for these options may be shared through a cache.
    ///
    /// A caller-supplied environment makes the output depend on state that
    /// is not part of the cache key.
    #[inline]
    pub fn is_cacheable(&self) -> bool {
        self.env.is_none()
    }

    /// Hash of every option that participates in cache keys.
    ///
    /// Fields are listed explicitly. A new option that changes parse output
    /// must be added here or make [`is_cacheable`](Self::is_cacheable)
    /// return `false`.
    pub fn cache_fingerprint(&self) -> u64 {
        let ParseOptions {
            max_recursion_depth,
            compile_expressions,
            env: _,
        } = self;
        let mut hasher = FxHasher::default();
        max_recursion_depth.hash(&mut hasher);
        compile_expressions.hash(&mut hasher);
        hasher.finish()
    }
}
