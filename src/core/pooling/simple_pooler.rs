//=========================================================================
// Simple Object Pooler
//=========================================================================
//
// Pools instances of a single prototype.
//
// Flow:
//   fill_pool() → pool of `pool_size` inactive instances "{proto}-{i}"
//   acquire()   → first inactive in scan order
//               → else one new instance (if expandable)
//               → else None + warning
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::config::SimplePoolConfig;
use super::object_pool::{ObjectPool, PoolHandle, SharedPool};
use super::poolable::{Poolable, PooledObject};
use super::pooler::{ObjectPooler, Prototype};
use super::waiting_pools::WaitingPools;

//=== SimpleObjectPooler ==================================================

pub struct SimpleObjectPooler<T: Poolable> {
    owner: String,
    prototype: Box<dyn Prototype<T>>,
    config: SimplePoolConfig,
    waiting_pools: Option<WaitingPools<T>>,
    pool: Option<SharedPool<T>>,
}

impl<T: Poolable> SimpleObjectPooler<T> {
    //--- Construction -----------------------------------------------------

    pub fn new<P>(owner: impl Into<String>, prototype: P, config: SimplePoolConfig) -> Self
    where
        P: Prototype<T> + 'static,
    {
        Self {
            owner: owner.into(),
            prototype: Box::new(prototype),
            config,
            waiting_pools: None,
            pool: None,
        }
    }

    /// Attaches the registry consulted when mutualizing waiting pools.
    pub fn with_waiting_pools(mut self, registry: WaitingPools<T>) -> Self {
        self.waiting_pools = Some(registry);
        self
    }

    /// Name of the waiting pool this pooler creates or joins.
    pub fn pool_name(&self) -> String {
        format!("[SimpleObjectPooler]_{}", self.owner)
    }

    //--- Internals --------------------------------------------------------

    fn create_waiting_pool(&self) -> SharedPool<T> {
        let name = self.pool_name();

        match (&self.waiting_pools, self.config.mutualize_waiting_pools) {
            (Some(registry), true) => registry.get_or_create(&name).0,
            (None, true) => {
                warn!(
                    "Pooler '{}' mutualizes waiting pools but has no registry; using a private pool",
                    self.owner
                );
                ObjectPool::shared(name)
            }
            _ => ObjectPool::shared(name),
        }
    }

    fn add_object(&self, pool: &mut ObjectPool<T>) -> usize {
        let name = format!("{}-{}", self.prototype.name(), pool.len());
        pool.push(PooledObject::new(name, self.prototype.name(), self.prototype.instantiate()))
    }

    //--- Accessors --------------------------------------------------------

    pub fn config(&self) -> &SimplePoolConfig {
        &self.config
    }

    pub fn pool(&self) -> Option<&SharedPool<T>> {
        self.pool.as_ref()
    }

    pub fn prototype_name(&self) -> &str {
        self.prototype.name()
    }
}

impl<T: Poolable> ObjectPooler<T> for SimpleObjectPooler<T> {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn fill_pool(&mut self) {
        if self.pool.is_some() {
            return;
        }

        let shared = self.create_waiting_pool();
        {
            let mut pool = shared.lock();

            // A mutualized pool may already hold instances
            let missing = self.config.pool_size.saturating_sub(pool.len());
            for _ in 0..missing {
                self.add_object(&mut pool);
            }

            debug!(
                "Filled '{}' with {} new instances ({} total)",
                pool.name(),
                missing,
                pool.len()
            );
        }
        self.pool = Some(shared);
    }

    fn is_filled(&self) -> bool {
        self.pool.is_some()
    }

    fn acquire(&mut self, now: f64) -> Option<PoolHandle> {
        let Some(shared) = self.pool.as_ref() else {
            error!("Pooler '{}' was asked for an instance before fill_pool", self.owner);
            return None;
        };
        let mut pool = shared.lock();

        if let Some(index) = pool.first_inactive() {
            return pool.activate(index, now);
        }

        if self.config.can_expand {
            let index = self.add_object(&mut pool);
            debug!("Expanded '{}' to {} instances", pool.name(), pool.len());
            return pool.activate(index, now);
        }

        warn!(
            "Pooler '{}' has no available instances and cannot expand",
            self.owner
        );
        None
    }

    fn pools(&self) -> Vec<SharedPool<T>> {
        self.pool.iter().cloned().collect()
    }

    fn destroy_pool(&mut self) {
        let Some(shared) = self.pool.take() else {
            return;
        };

        let name = {
            let mut pool = shared.lock();
            pool.clear();
            pool.name().to_owned()
        };

        if self.config.mutualize_waiting_pools {
            if let Some(registry) = &self.waiting_pools {
                registry.remove(&name);
            }
        }
        debug!("Destroyed pool '{}'", name);
    }
}

//=========================================================================
// Tests
//=========================================================================
