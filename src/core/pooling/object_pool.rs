//=========================================================================
// Object Pool
//=========================================================================
//
// Data holder for one named group of pooled instances.
//
// Instances are appended on fill/expansion and never removed one by one;
// they are deactivated and reused. Handles carry the activation
// generation so a handle from an earlier cycle resolves to nothing.
//
// Architecture:
//   ObjectPool<T>
//     ├─ id:      PoolId (process-unique)
//     ├─ name:    "[SimpleObjectPooler]_owner" / "...: prototype"
//     └─ objects: Vec<PooledObject<T>> (scan order = insertion order)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use super::poolable::{Poolable, PooledObject};

//=== Public API ==========================================================

/// Pool shared between poolers and sweepers.
///
/// Acquisition locks the pool for the whole scan-and-activate step, so
/// two acquirers never receive the same instance.
pub type SharedPool<T> = Arc<Mutex<ObjectPool<T>>>;

//=== PoolId ==============================================================

/// Process-unique identifier of an [`ObjectPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u64);

impl PoolId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        PoolId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

//=== PoolHandle ==========================================================

/// Reference to one activation of one pooled instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    pool: PoolId,
    index: usize,
    generation: u32,
}

impl PoolHandle {
    pub fn pool(&self) -> PoolId {
        self.pool
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

//=== ObjectPool ==========================================================

#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    id: PoolId,
    name: String,
    objects: Vec<PooledObject<T>>,
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PoolId::next(),
            name: name.into(),
            objects: Vec::new(),
        }
    }

    /// Wraps a new pool for sharing.
    pub fn shared(name: impl Into<String>) -> SharedPool<T> {
        Arc::new(Mutex::new(Self::new(name)))
    }

    //--- Population -------------------------------------------------------

    /// Appends an instance. It must be inactive. Returns its index.
    pub fn push(&mut self, object: PooledObject<T>) -> usize {
        debug_assert!(!object.is_active(), "pooled objects enter the pool inactive");
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Deactivates and drops every instance.
    pub fn clear(&mut self) {
        for object in &mut self.objects {
            object.deactivate();
        }
        debug!("Cleared pool '{}' ({} instances)", self.name, self.objects.len());
        self.objects.clear();
    }

    //--- Scanning ---------------------------------------------------------

    pub fn first_inactive(&self) -> Option<usize> {
        self.objects.iter().position(|o| !o.is_active())
    }

    pub fn first_inactive_of(&self, prototype: &str) -> Option<usize> {
        self.objects
            .iter()
            .position(|o| !o.is_active() && o.prototype() == prototype)
    }

    //--- Activation -------------------------------------------------------

    /// Activates the instance at `index`. Returns `None` if the index is
    /// out of range or the instance is already active.
    pub fn activate(&mut self, index: usize, now: f64) -> Option<PoolHandle> {
        let object = self.objects.get_mut(index)?;
        if object.is_active() {
            return None;
        }
        object.activate(now);

        Some(PoolHandle {
            pool: self.id,
            index,
            generation: object.lifecycle().generation(),
        })
    }

    /// Returns the instance behind `handle` to the pool.
    ///
    /// Stale handles (released, expired, or reused since) are ignored.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        self.get_mut(handle).is_some_and(|object| object.deactivate())
    }

    /// Deactivates every instance whose lifetime deadline has passed.
    /// Returns the number reclaimed.
    pub fn reclaim_expired(&mut self, now: f64) -> usize {
        let mut reclaimed = 0;
        for object in &mut self.objects {
            if object.lifecycle().is_expired(now) && object.deactivate() {
                reclaimed += 1;
            }
        }

        if reclaimed > 0 {
            debug!("Pool '{}' reclaimed {} expired instances", self.name, reclaimed);
        }
        reclaimed
    }

    /// Fires spawn completion on the instance behind `handle`. Returns
    /// `false` for stale handles or when it already fired this cycle.
    pub fn trigger_spawn_complete(&mut self, handle: PoolHandle) -> bool {
        self.get_mut(handle)
            .is_some_and(|object| object.trigger_spawn_complete())
    }

    //--- Access -----------------------------------------------------------

    /// Resolves a handle while its activation cycle is still current.
    pub fn get(&self, handle: PoolHandle) -> Option<&PooledObject<T>> {
        if handle.pool != self.id {
            return None;
        }
        self.objects
            .get(handle.index)
            .filter(|o| o.is_active() && o.lifecycle().generation() == handle.generation)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut PooledObject<T>> {
        if handle.pool != self.id {
            return None;
        }
        self.objects
            .get_mut(handle.index)
            .filter(|o| o.is_active() && o.lifecycle().generation() == handle.generation)
    }

    /// Instance at `index`, active or not.
    pub fn object(&self, index: usize) -> Option<&PooledObject<T>> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PooledObject<T>> {
        self.objects.iter()
    }

    /// Runs `f` on every active instance.
    pub fn with_active<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut PooledObject<T>),
    {
        self.objects.iter_mut().filter(|o| o.is_active()).for_each(|o| f(o));
    }

    //--- Queries ----------------------------------------------------------

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_active()).count()
    }

    pub fn inactive_count(&self) -> usize {
        self.len() - self.active_count()
    }

    pub fn count_of(&self, prototype: &str) -> usize {
        self.objects.iter().filter(|o| o.prototype() == prototype).count()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Bolt {
        life: f32,
    }

    impl Poolable for Bolt {
        fn life_time(&self) -> f32 {
            self.life
        }
    }

    fn pool_of(count: usize, life: f32) -> ObjectPool<Bolt> {
        let mut pool = ObjectPool::new("bolts");
        for i in 0..count {
            pool.push(PooledObject::new(format!("bolt-{i}"), "bolt", Bolt { life }));
        }
        pool
    }

    #[test]
    fn scans_in_insertion_order() {
        let mut pool = pool_of(3, 0.0);
        pool.activate(0, 0.0);

        assert_eq!(pool.first_inactive(), Some(1));
        assert_eq!(pool.first_inactive_of("bolt"), Some(1));
        assert_eq!(pool.first_inactive_of("arrow"), None);
    }

    #[test]
    fn activating_active_instance_fails() {
        let mut pool = pool_of(1, 0.0);
        assert!(pool.activate(0, 0.0).is_some());
        assert!(pool.activate(0, 0.0).is_none());
        assert!(pool.activate(7, 0.0).is_none());
    }

    #[test]
    fn stale_handle_does_not_touch_reused_instance() {
        let mut pool = pool_of(1, 0.0);
        let first = pool.activate(0, 0.0).unwrap();
        assert!(pool.release(first));

        let second = pool.activate(0, 1.0).unwrap();
        assert!(pool.get(first).is_none());
        assert!(!pool.release(first));
        assert!(pool.get(second).is_some());
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn handle_from_other_pool_is_rejected() {
        let mut a = pool_of(1, 0.0);
        let b = pool_of(1, 0.0);
        let handle = a.activate(0, 0.0).unwrap();
        assert!(b.get(handle).is_none());
    }

    #[test]
    fn expiry_reclaims_exactly_once() {
        let mut pool = pool_of(2, 1.0);
        pool.activate(0, 0.0);
        pool.activate(1, 0.5);

        assert_eq!(pool.reclaim_expired(0.9), 0);
        assert_eq!(pool.reclaim_expired(1.0), 1);
        assert_eq!(pool.reclaim_expired(1.2), 0);
        assert_eq!(pool.reclaim_expired(1.5), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn early_release_cancels_expiry() {
        let mut pool = pool_of(1, 1.0);
        let handle = pool.activate(0, 0.0).unwrap();
        pool.release(handle);

        // Reused before the old deadline; the old deadline must not fire
        pool.activate(0, 0.8);
        assert_eq!(pool.reclaim_expired(1.0), 0);
        assert_eq!(pool.reclaim_expired(2.0), 1);
    }

    #[test]
    fn spawn_complete_through_handle() {
        let mut pool = pool_of(1, 0.0);
        let handle = pool.activate(0, 0.0).unwrap();
        assert!(pool.trigger_spawn_complete(handle));
        assert!(!pool.trigger_spawn_complete(handle));

        pool.release(handle);
        assert!(!pool.trigger_spawn_complete(handle));
    }

    #[test]
    fn with_active_visits_only_active() {
        let mut pool = pool_of(3, 0.0);
        pool.activate(2, 0.0);

        let mut visited = Vec::new();
        pool.with_active(|o| visited.push(o.name().to_owned()));
        assert_eq!(visited, vec!["bolt-2"]);
    }

    #[test]
    fn clear_empties_pool() {
        let mut pool = pool_of(2, 0.0);
        pool.activate(0, 0.0);
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.inactive_count(), 0);
    }
}
