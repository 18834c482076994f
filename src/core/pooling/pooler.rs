//=========================================================================
// Object Pooler
//=========================================================================
//
// Common surface of every pooler plus the prototype abstraction poolers
// instantiate from.
//
// Flow:
//   fill_pool() → acquire(now) → [configure] → trigger_spawn_complete()
//                                     ↓
//              release(handle) / reclaim_expired(now) → back to the pool
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::object_pool::{PoolHandle, SharedPool};
use super::poolable::Poolable;

//=== PoolError ===========================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("pooler '{pooler}' has no prototype named '{prototype}'")]
    UnknownPrototype { pooler: String, prototype: String },

    #[error("prototype '{0}' is listed more than once")]
    DuplicatePrototype(String),

    #[error("pooler '{0}' was used before its pool was filled")]
    NotFilled(String),
}

//=== Prototype ===========================================================

/// Template a pooler instantiates pooled values from.
pub trait Prototype<T>: Send {
    /// Key identifying the kind of instance produced.
    fn name(&self) -> &str;

    fn instantiate(&self) -> T;
}

/// [`Prototype`] backed by a closure.
pub struct FnPrototype<F> {
    name: String,
    factory: F,
}

impl<F> FnPrototype<F> {
    pub fn new(name: impl Into<String>, factory: F) -> Self {
        Self {
            name: name.into(),
            factory,
        }
    }
}

impl<T, F> Prototype<T> for FnPrototype<F>
where
    F: Fn() -> T + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self) -> T {
        (self.factory)()
    }
}

//=== ObjectPooler Trait ==================================================

/// Behavior shared by the simple and multiple poolers.
///
/// `acquire` both picks and activates an instance while holding the pool
/// lock, so the returned handle is already claimed.
pub trait ObjectPooler<T: Poolable>: Send {
    /// Owner label used in pool names and log output.
    fn owner(&self) -> &str;

    /// Creates the configured instances. Filling twice does nothing.
    fn fill_pool(&mut self);

    fn is_filled(&self) -> bool;

    /// Claims and activates an instance, or `None` when the pool is
    /// exhausted and cannot expand.
    fn acquire(&mut self, now: f64) -> Option<PoolHandle>;

    /// Claims an instance of a given prototype.
    ///
    /// Poolers that manage a single prototype ignore the name.
    fn acquire_of_type(&mut self, prototype: &str, now: f64) -> Result<Option<PoolHandle>, PoolError> {
        warn!(
            "Pooler '{}' does not pool by type; ignoring requested prototype '{}'",
            self.owner(),
            prototype
        );
        Ok(self.acquire(now))
    }

    /// Every pool this pooler draws from.
    fn pools(&self) -> Vec<SharedPool<T>>;

    /// Drops every instance and detaches from the pools.
    fn destroy_pool(&mut self);

    //--- Provided ---------------------------------------------------------

    /// Pool that issued `handle`.
    fn pool_for(&self, handle: PoolHandle) -> Option<SharedPool<T>> {
        self.pools()
            .into_iter()
            .find(|pool| pool.lock().id() == handle.pool())
    }

    /// Returns an instance to its pool. Stale handles are ignored.
    fn release(&self, handle: PoolHandle) -> bool {
        self.pool_for(handle)
            .is_some_and(|pool| pool.lock().release(handle))
    }

    /// Fires spawn completion once for the current activation.
    fn trigger_spawn_complete(&self, handle: PoolHandle) -> bool {
        self.pool_for(handle)
            .is_some_and(|pool| pool.lock().trigger_spawn_complete(handle))
    }

    /// Deactivates instances whose lifetime ran out. Returns how many.
    fn reclaim_expired(&self, now: f64) -> usize {
        self.pools()
            .iter()
            .map(|pool| pool.lock().reclaim_expired(now))
            .sum()
    }

    /// Whether `handle` still refers to a live activation.
    fn is_live(&self, handle: PoolHandle) -> bool {
        self.pool_for(handle)
            .is_some_and(|pool| pool.lock().get(handle).is_some())
    }

    fn active_count(&self) -> usize {
        self.pools().iter().map(|pool| pool.lock().active_count()).sum()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_prototype_instantiates_fresh_values() {
        let prototype = FnPrototype::new("orb", || vec![1, 2]);
        let a: Vec<i32> = prototype.instantiate();
        let b: Vec<i32> = prototype.instantiate();

        assert_eq!(Prototype::<Vec<i32>>::name(&prototype), "orb");
        assert_eq!(a, b);
    }

    #[test]
    fn errors_render_context() {
        let error = PoolError::UnknownPrototype {
            pooler: "turret".into(),
            prototype: "laser".into(),
        };
        assert_eq!(error.to_string(), "pooler 'turret' has no prototype named 'laser'");
    }
}
