//=========================================================================
// Spawn Manager
//=========================================================================
//
// Front door for gameplay code that needs pooled instances placed in the
// world.
//
// Flow:
//   spawn(now, configure) → pooler.acquire(now)
//                         → configure(&mut value)   (position, stats, ...)
//                         → trigger_spawn_complete  (once per activation)
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::object_pool::PoolHandle;
use super::poolable::Poolable;
use super::pooler::ObjectPooler;

//=== SpawnManager ========================================================

pub struct SpawnManager<T: Poolable> {
    pooler: Box<dyn ObjectPooler<T>>,
    can_spawn: bool,
}

impl<T: Poolable> SpawnManager<T> {
    /// Wraps `pooler`, filling it if it is not filled yet.
    pub fn new<P>(pooler: P) -> Self
    where
        P: ObjectPooler<T> + 'static,
    {
        Self::from_boxed(Box::new(pooler))
    }

    pub fn from_boxed(mut pooler: Box<dyn ObjectPooler<T>>) -> Self {
        if !pooler.is_filled() {
            pooler.fill_pool();
        }
        Self {
            pooler,
            can_spawn: true,
        }
    }

    //--- Spawning ---------------------------------------------------------

    /// Spawns the next instance the pooler hands out.
    pub fn spawn<F>(&mut self, now: f64, configure: F) -> Option<PoolHandle>
    where
        F: FnOnce(&mut T),
    {
        if !self.can_spawn {
            debug!("Spawning is disabled for '{}'", self.pooler.owner());
            return None;
        }

        let handle = self.pooler.acquire(now)?;
        self.finish_spawn(handle, configure);
        Some(handle)
    }

    /// Spawns an instance of a named prototype.
    ///
    /// Unknown prototypes are logged and yield `None`. Poolers that manage
    /// a single prototype ignore the name.
    pub fn spawn_of_type<F>(&mut self, prototype: &str, now: f64, configure: F) -> Option<PoolHandle>
    where
        F: FnOnce(&mut T),
    {
        if !self.can_spawn {
            debug!("Spawning is disabled for '{}'", self.pooler.owner());
            return None;
        }

        let handle = match self.pooler.acquire_of_type(prototype, now) {
            Ok(handle) => handle?,
            Err(err) => {
                error!("Spawn of '{}' failed: {}", prototype, err);
                return None;
            }
        };
        self.finish_spawn(handle, configure);
        Some(handle)
    }

    fn finish_spawn<F>(&self, handle: PoolHandle, configure: F)
    where
        F: FnOnce(&mut T),
    {
        let Some(pool) = self.pooler.pool_for(handle) else {
            return;
        };
        let mut pool = pool.lock();

        if let Some(object) = pool.get_mut(handle) {
            configure(object.value_mut());
            object.trigger_spawn_complete();
        }
    }

    //--- Control ----------------------------------------------------------

    /// Returns a spawned instance to its pool.
    pub fn despawn(&self, handle: PoolHandle) -> bool {
        self.pooler.release(handle)
    }

    pub fn set_can_spawn(&mut self, can_spawn: bool) {
        self.can_spawn = can_spawn;
    }

    pub fn can_spawn(&self) -> bool {
        self.can_spawn
    }

    //--- Accessors --------------------------------------------------------

    pub fn pooler(&self) -> &dyn ObjectPooler<T> {
        self.pooler.as_ref()
    }

    pub fn pooler_mut(&mut self) -> &mut dyn ObjectPooler<T> {
        self.pooler.as_mut()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pooling::{FnPrototype, MultipleObjectPooler, SimpleObjectPooler, SimplePoolConfig};

    #[derive(Debug, Default)]
    struct Minion {
        position: (f32, f32),
        health: u32,
        revived: u32,
    }

    impl Poolable for Minion {
        fn on_spawn_complete(&mut self) {
            self.health = 10;
            self.revived += 1;
        }
    }

    fn simple_manager(pool_size: usize) -> SpawnManager<Minion> {
        let config = SimplePoolConfig {
            pool_size,
            can_expand: false,
            ..Default::default()
        };
        SpawnManager::new(SimpleObjectPooler::new(
            "camp",
            FnPrototype::new("minion", Minion::default),
            config,
        ))
    }

    fn inspect<R>(manager: &SpawnManager<Minion>, handle: PoolHandle, f: impl FnOnce(&Minion) -> R) -> R {
        let pool = manager.pooler().pool_for(handle).unwrap();
        let guard = pool.lock();
        f(guard.get(handle).unwrap().value())
    }

    #[test]
    fn spawn_configures_then_completes() {
        let mut manager = simple_manager(2);
        let handle = manager.spawn(0.0, |m| m.position = (3.0, 4.0)).unwrap();

        inspect(&manager, handle, |m| {
            assert_eq!(m.position, (3.0, 4.0));
            assert_eq!(m.health, 10);
            assert_eq!(m.revived, 1);
        });
    }

    #[test]
    fn respawn_revives_again() {
        let mut manager = simple_manager(1);
        let first = manager.spawn(0.0, |_| {}).unwrap();
        assert!(manager.despawn(first));

        let second = manager.spawn(1.0, |_| {}).unwrap();
        inspect(&manager, second, |m| assert_eq!(m.revived, 2));
    }

    #[test]
    fn disabled_manager_spawns_nothing() {
        let mut manager = simple_manager(2);
        manager.set_can_spawn(false);
        assert!(manager.spawn(0.0, |_| {}).is_none());
        assert_eq!(manager.pooler().active_count(), 0);
    }

    #[test]
    fn exhausted_pool_yields_none() {
        let mut manager = simple_manager(1);
        assert!(manager.spawn(0.0, |_| {}).is_some());
        assert!(manager.spawn(0.0, |_| {}).is_none());
    }

    #[test]
    fn typed_spawn_through_multiple_pooler() {
        let mut pooler = MultipleObjectPooler::new("wave").with_seed(1);
        pooler
            .add_entry(FnPrototype::new("grunt", Minion::default), 1, false, true)
            .unwrap();
        let mut manager = SpawnManager::new(pooler);

        assert!(manager.spawn_of_type("grunt", 0.0, |_| {}).is_some());
        assert!(manager.spawn_of_type("grunt", 0.0, |_| {}).is_none());
        assert!(manager.spawn_of_type("boss", 0.0, |_| {}).is_none());
    }
}
