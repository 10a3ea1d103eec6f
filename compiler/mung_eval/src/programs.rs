//! Compiled-program memoization.
//!
//! Programs depend only on their source text, so one compiled program is
//! shared by every expression with the same text. Reads take a shared lock;
//! a miss compiles outside any lock and publishes under the write lock,
//! rechecking first so racing compilers agree on one program.

use std::sync::Arc;

use mung_expr::{CompileError, Program};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

#[derive(Default)]
pub struct ProgramCache {
    programs: RwLock<FxHashMap<String, Arc<Program>>>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled program for `source`. Compile errors are not cached.
    pub fn get_or_compile(&self, source: &str) -> Result<Arc<Program>, CompileError> {
        if let Some(program) = self.programs.read().get(source) {
            return Ok(Arc::clone(program));
        }
        let compiled = Arc::new(mung_expr::compile(source)?);
        let mut programs = self.programs.write();
        if let Some(program) = programs.get(source) {
            return Ok(Arc::clone(program));
        }
        trace!(source, "caching compiled program");
        programs.insert(source.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.programs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.read().is_empty()
    }

    pub fn clear(&self) {
        self.programs.write().clear();
    }
}

impl std::fmt::Debug for ProgramCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramCache")
            .field("programs", &self.len())
            .finish()
    }
}
