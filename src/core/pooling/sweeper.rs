//=========================================================================
// Lifetime Sweeper
//=========================================================================
//
// System that returns expired instances to their pools once per tick.
//
// Pools of different value types are stored behind the type-erased
// ExpiringPool trait. A pool nobody but the sweeper still holds has been
// destroyed by its pooler and is dropped on the next sweep.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::{debug, trace};
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use super::object_pool::{ObjectPool, SharedPool};
use super::poolable::Poolable;
use super::pooler::ObjectPooler;
use crate::core::globals::{GlobalContext, System};

//=== ExpiringPool ========================================================

/// Type-erased view of a pool whose instances may expire.
pub trait ExpiringPool: Send + Sync {
    fn reclaim_expired(&self, now: f64) -> usize;

    fn pool_name(&self) -> String;
}

impl<T: Poolable> ExpiringPool for Mutex<ObjectPool<T>> {
    fn reclaim_expired(&self, now: f64) -> usize {
        self.lock().reclaim_expired(now)
    }

    fn pool_name(&self) -> String {
        self.lock().name().to_owned()
    }
}

//=== LifetimeSweeper =====================================================

pub struct LifetimeSweeper {
    pools: Vec<Arc<dyn ExpiringPool>>,
    reclaimed: u64,
}

impl LifetimeSweeper {
    pub fn new() -> Self {
        Self {
            pools: Vec::new(),
            reclaimed: 0,
        }
    }

    /// Adds a pool to sweep. The same pool is only tracked once.
    ///
    /// The sweeper keeps this exact pool. A pooler refilled after
    /// `destroy_pool` owns new pools, which must be watched again, e.g.
    /// through [`Self::watch_pooler`].
    pub fn watch<T: Poolable>(&mut self, pool: &SharedPool<T>) {
        let address = Arc::as_ptr(pool) as *const ();
        if self.pools.iter().any(|p| Arc::as_ptr(p) as *const () == address) {
            return;
        }
        self.pools.push(pool.clone());
    }

    /// Adds every pool in `pools`.
    pub fn watch_all<T: Poolable>(mut self, pools: &[SharedPool<T>]) -> Self {
        for pool in pools {
            self.watch(pool);
        }
        self
    }

    /// Watches every pool `pooler` currently owns.
    pub fn watch_pooler<T, P>(&mut self, pooler: &P)
    where
        T: Poolable,
        P: ObjectPooler<T> + ?Sized,
    {
        for pool in pooler.pools() {
            self.watch(&pool);
        }
    }

    /// Reclaims expired instances in every watched pool.
    pub fn sweep(&mut self, now: f64) -> usize {
        self.prune_orphans();

        let reclaimed: usize = self.pools.iter().map(|p| p.reclaim_expired(now)).sum();
        if reclaimed > 0 {
            trace!("Sweeper reclaimed {} instances at t={:.3}", reclaimed, now);
        }
        self.reclaimed += reclaimed as u64;
        reclaimed
    }

    fn prune_orphans(&mut self) {
        let before = self.pools.len();
        self.pools.retain(|p| Arc::strong_count(p) > 1);
        if self.pools.len() != before {
            debug!("Sweeper dropped {} destroyed pools", before - self.pools.len());
        }
    }

    pub fn watched(&self) -> Vec<String> {
        self.pools.iter().map(|p| p.pool_name()).collect()
    }

    /// Total instances reclaimed since creation.
    pub fn total_reclaimed(&self) -> u64 {
        self.reclaimed
    }
}

impl Default for LifetimeSweeper {
    fn default() -> Self {
        Self::new()
    }
}

impl System for LifetimeSweeper {
    fn name(&self) -> &str {
        "lifetime_sweeper"
    }

    fn update(&mut self, context: &mut GlobalContext) {
        self.sweep(context.time.elapsed);
    }
}

//=========================================================================
// Tests
//=========================================================================
