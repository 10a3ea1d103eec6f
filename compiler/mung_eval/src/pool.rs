//! Pooled environment maps.
//!
//! Building the runtime environment is the hot path of expression
//! evaluation. Maps are taken from a pool, filled, used and handed back
//! cleared, keeping their capacity. The guard returns the map on drop, so
//! error paths return it too.

use std::ops::{Deref, DerefMut};

use mung_expr::Env;
use parking_lot::Mutex;

/// Maps kept beyond this are dropped on release.
const MAX_POOLED: usize = 32;

#[derive(Default)]
pub struct EnvPool {
    free: Mutex<Vec<Env>>,
}

impl EnvPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty map, reused when one is available.
    pub fn acquire(&self) -> PooledEnv<'_> {
        let env = self.free.lock().pop().unwrap_or_default();
        debug_assert!(env.is_empty());
        PooledEnv {
            pool: self,
            env: Some(env),
        }
    }

    /// Maps currently waiting for reuse.
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut env: Env) {
        env.clear();
        let mut free = self.free.lock();
        if free.len() < MAX_POOLED {
            free.push(env);
        }
    }
}

impl std::fmt::Debug for EnvPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvPool")
            .field("available", &self.available())
            .finish()
    }
}

/// A borrowed environment map, returned to its pool on drop.
pub struct PooledEnv<'p> {
    pool: &'p EnvPool,
    env: Option<Env>,
}

impl Deref for PooledEnv<'_> {
    type Target = Env;

    fn deref(&self) -> &Env {
        self.env.as_ref().unwrap_or_else(|| unreachable!("env taken before drop"))
    }
}

impl DerefMut for PooledEnv<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env.as_mut().unwrap_or_else(|| unreachable!("env taken before drop"))
    }
}

impl Drop for PooledEnv<'_> {
    fn drop(&mut self) {
        if let Some(env) = self.env.take() {
            self.pool.release(env);
        }
    }
}

#[cfg(test)]
mod tests;
