//=========================================================================
// Waiting Pools
//=========================================================================
//
// Name-keyed registry of shared pools. Poolers that mutualize their
// waiting pools look their pool name up here and join an existing pool
// instead of creating a private one.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use super::object_pool::{ObjectPool, SharedPool};
use super::poolable::Poolable;

//=== WaitingPools ========================================================

/// Cloneable handle to a registry of shared pools for one value type.
pub struct WaitingPools<T: Poolable> {
    pools: Arc<Mutex<HashMap<String, SharedPool<T>>>>,
}

impl<T: Poolable> WaitingPools<T> {
    pub fn new() -> Self {
        Self {
            pools: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the pool registered under `name`, creating it if absent.
    ///
    /// The flag is `true` when the pool was created by this call.
    pub fn get_or_create(&self, name: &str) -> (SharedPool<T>, bool) {
        let mut pools = self.pools.lock();

        if let Some(pool) = pools.get(name) {
            debug!("Joining existing waiting pool '{}'", name);
            return (Arc::clone(pool), false);
        }

        let pool = ObjectPool::shared(name);
        pools.insert(name.to_owned(), Arc::clone(&pool));
        (pool, true)
    }

    pub fn get(&self, name: &str) -> Option<SharedPool<T>> {
        self.pools.lock().get(name).cloned()
    }

    /// Unregisters a pool. Poolers still holding it keep it alive.
    pub fn remove(&self, name: &str) -> Option<SharedPool<T>> {
        self.pools.lock().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pools.lock().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.pools.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.lock().is_empty()
    }
}

impl<T: Poolable> Clone for WaitingPools<T> {
    fn clone(&self) -> Self {
        Self {
            pools: Arc::clone(&self.pools),
        }
    }
}

impl<T: Poolable> Default for WaitingPools<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Coin;
    impl Poolable for Coin {}

    #[test]
    fn same_name_yields_same_pool() {
        let registry: WaitingPools<Coin> = WaitingPools::new();
        let (a, created_a) = registry.get_or_create("[SimpleObjectPooler]_chest");
        let (b, created_b) = registry.clone().get_or_create("[SimpleObjectPooler]_chest");

        assert!(created_a);
        assert!(!created_b);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_unregisters() {
        let registry: WaitingPools<Coin> = WaitingPools::new();
        registry.get_or_create("a");
        registry.get_or_create("b");

        assert!(registry.remove("a").is_some());
        assert!(!registry.contains("a"));
        assert_eq!(registry.names(), vec!["b".to_owned()]);
    }
}
