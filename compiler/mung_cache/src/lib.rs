//! Content-addressed parse cache.
//!
//! A document is parsed at most once per `(source, options)` pair for the
//! lifetime of a [`SourceCache`]. Concurrent first requests for the same
//! pair collapse into a single parse; every caller blocks until it finishes
//! and then shares its result, including a failure.
//!
//! Top-level namespaces are stored individually under `(key, identifier)`,
//! so a caller that needs one namespace can fetch it without rebuilding the
//! document, and the rebuilt [`Ast`] is just those shared entries in order.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use mung_ir::{Ast, Namespace, ParseOptions};
use mung_parse::ParseError;
use rustc_hash::{FxBuildHasher, FxHasher};
use tracing::{debug, warn};

/// Outcome of the one parse of a cache entry: the top-level identifiers in
/// document order, or the parse error.
type Outcome = Result<Vec<String>, ParseError>;

struct Entry {
    /// Kept to tell a hash collision from a hit.
    source: Box<str>,
    outcome: OnceLock<Outcome>,
}

/// A process-wide or test-local parse cache.
pub struct SourceCache {
    entries: DashMap<u64, Arc<Entry>, FxBuildHasher>,
    namespaces: DashMap<(u64, String), Arc<Namespace>, FxBuildHasher>,
    parses: AtomicUsize,
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCache")
            .field("entries", &self.entries.len())
            .field("namespaces", &self.namespaces.len())
            .field("parses", &self.parse_count())
            .finish()
    }
}

/// Cache key for a source under the given options.
pub fn cache_key(source: &str, options: &ParseOptions) -> u64 {
    let mut hasher = FxHasher::default();
    source.hash(&mut hasher);
    hasher.finish() ^ options.cache_fingerprint()
}

impl SourceCache {
    pub fn new() -> Self {
        SourceCache {
            entries: DashMap::with_hasher(FxBuildHasher),
            namespaces: DashMap::with_hasher(FxBuildHasher),
            parses: AtomicUsize::new(0),
        }
    }

    /// The process-wide cache.
    pub fn global() -> &'static SourceCache {
        static GLOBAL: OnceLock<SourceCache> = OnceLock::new();
        GLOBAL.get_or_init(SourceCache::new)
    }

    /// Parse `source`, or return the result of an earlier parse of the same
    /// source under equivalent options.
    ///
    /// Options the cache key does not cover (a caller-supplied environment)
    /// skip the cache entirely.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn get_or_parse(&self, source: &str, options: &ParseOptions) -> Result<Ast, ParseError> {
        if !options.is_cacheable() {
            debug!("cache bypass");
            return mung_parse::parse(source, options);
        }
        let key = cache_key(source, options);
        let Some(idents) = self.outcome(key, source, options) else {
            return mung_parse::parse(source, options);
        };
        let idents = idents?;
        match self.collect(key, &idents) {
            Some(namespaces) => Ok(Ast::from_namespaces(namespaces, options.clone())),
            None => {
                // Cleared between publishing and reading; parse without caching.
                debug!(key, "cache entry vanished");
                mung_parse::parse(source, options)
            }
        }
    }

    /// One top-level namespace of `source`, parsing it first if needed.
    /// `Ok(None)` when the document has no namespace named `ident`.
    pub fn get_namespace(
        &self,
        source: &str,
        options: &ParseOptions,
        ident: &str,
    ) -> Result<Option<Arc<Namespace>>, ParseError> {
        if options.is_cacheable() {
            let key = cache_key(source, options);
            if let Some(outcome) = self.outcome(key, source, options) {
                outcome?;
                if let Some(ns) = self.namespaces.get(&(key, ident.to_string())) {
                    return Ok(Some(Arc::clone(ns.value())));
                }
            }
        }
        let ast = self.get_or_parse(source, options)?;
        Ok(ast.namespace(ident).cloned())
    }

    /// Number of parses performed on behalf of this cache.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    /// Number of cached documents, failed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Parses already in flight still complete for the
    /// callers waiting on them.
    pub fn clear(&self) {
        debug!(entries = self.entries.len(), "clearing parse cache");
        self.entries.clear();
        self.namespaces.clear();
    }

    /// Run or wait for the single parse of `key`. `None` on a hash collision
    /// with a different source.
    fn outcome(&self, key: u64, source: &str, options: &ParseOptions) -> Option<Outcome> {
        let entry = Arc::clone(
            self.entries
                .entry(key)
                .or_insert_with(|| {
                    Arc::new(Entry {
                        source: source.into(),
                        outcome: OnceLock::new(),
                    })
                })
                .value(),
        );
        if &*entry.source != source {
            warn!(key, "cache key collision, parsing uncached");
            return None;
        }
        if let Some(outcome) = entry.outcome.get() {
            debug!(key, "cache hit");
            return Some(outcome.clone());
        }
        let outcome = entry.outcome.get_or_init(|| {
            debug!(key, "cache miss, parsing");
            self.parses.fetch_add(1, Ordering::Relaxed);
            self.publish(key, mung_parse::parse(source, options))
        });
        Some(outcome.clone())
    }

    /// Store each top-level namespace under `(key, identifier)`. The first
    /// definition of a repeated identifier wins.
    fn publish(&self, key: u64, parsed: Result<Ast, ParseError>) -> Outcome {
        let ast = parsed?;
        let mut idents = Vec::with_capacity(ast.len());
        for ns in ast.namespaces() {
            let name = ns.name().to_string();
            if idents.contains(&name) {
                continue;
            }
            self.namespaces
                .insert((key, name.clone()), Arc::clone(ns));
            idents.push(name);
        }
        Ok(idents)
    }

    fn collect(&self, key: u64, idents: &[String]) -> Option<Vec<Arc<Namespace>>> {
        idents
            .iter()
            .map(|ident| {
                self.namespaces
                    .get(&(key, ident.clone()))
                    .map(|ns| Arc::clone(ns.value()))
            })
            .collect()
    }
}

/// [`SourceCache::get_or_parse`] on the process-wide cache.
pub fn parse_cached(source: &str, options: &ParseOptions) -> Result<Ast, ParseError> {
    SourceCache::global().get_or_parse(source, options)
}

/// Clear the process-wide cache.
pub fn clear_cache() {
    SourceCache::global().clear();
}
