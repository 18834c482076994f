//=========================================================================
// Poolable Lifecycle
//=========================================================================
//
// Contract every pooled value satisfies, and the per-instance lifecycle
// record the pool keeps next to it.
//
// Lifecycle:
//   inactive ──activate(now)──> active ──deactivate() / expiry──> inactive
//                                 │
//                                 └─ trigger_spawn_complete() (once per cycle)
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Poolable Trait ======================================================

/// Capability required from every value managed by a pooler.
///
/// All hooks have empty default implementations; a plain data type only
/// needs `impl Poolable for MyType {}`.
pub trait Poolable: Send + 'static {
    /// Lifetime in seconds after activation; 0 means unlimited.
    fn life_time(&self) -> f32 {
        0.0
    }

    /// Called when the instance is handed out by the pool.
    fn on_activate(&mut self) {}

    /// Called when the instance returns to the pool, by release or expiry.
    fn on_deactivate(&mut self) {}

    /// Called once per activation, after the spawner finished placing the
    /// instance. Typical use: revive a companion health component.
    fn on_spawn_complete(&mut self) {}
}

//=== PoolableObject ======================================================

/// Activation state of one pooled instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoolableObject {
    active: bool,
    generation: u32,
    expires_at: Option<f64>,
    spawn_completed: bool,
}

impl PoolableObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the instance active and arms its lifetime deadline.
    ///
    /// Every activation starts a new generation so handles from earlier
    /// cycles no longer resolve.
    pub fn activate(&mut self, now: f64, life_time: f32) {
        self.active = true;
        self.generation = self.generation.wrapping_add(1);
        self.spawn_completed = false;
        self.expires_at = (life_time > 0.0).then(|| now + f64::from(life_time));
    }

    /// Marks the instance inactive and cancels any pending deadline.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.expires_at = None;
    }

    /// Records spawn completion. Returns `true` the first time per
    /// activation cycle.
    ///
    /// # Panics
    ///
    /// Panics if the instance is inactive: gameplay must never run on an
    /// instance the pool still considers free.
    pub fn trigger_spawn_complete(&mut self) -> bool {
        assert!(
            self.active,
            "Spawn completion requested on an inactive pooled object"
        );

        if self.spawn_completed {
            return false;
        }
        self.spawn_completed = true;
        true
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.active && self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn expires_at(&self) -> Option<f64> {
        self.expires_at
    }

    pub fn spawn_completed(&self) -> bool {
        self.spawn_completed
    }
}

//=== PooledObject ========================================================

/// A pooled value together with its name, prototype key and lifecycle.
#[derive(Debug)]
pub struct PooledObject<T: Poolable> {
    name: String,
    prototype: String,
    lifecycle: PoolableObject,
    value: T,
}

impl<T: Poolable> PooledObject<T> {
    pub fn new(name: impl Into<String>, prototype: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            prototype: prototype.into(),
            lifecycle: PoolableObject::new(),
            value,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    pub(crate) fn activate(&mut self, now: f64) {
        let life_time = self.value.life_time();
        self.lifecycle.activate(now, life_time);
        trace!("Activated '{}' (generation {})", self.name, self.lifecycle.generation());
        self.value.on_activate();
    }

    /// Returns the instance to the pool. Returns `false` if it was
    /// already inactive.
    pub fn deactivate(&mut self) -> bool {
        if !self.lifecycle.is_active() {
            return false;
        }
        self.lifecycle.deactivate();
        trace!("Deactivated '{}'", self.name);
        self.value.on_deactivate();
        true
    }

    /// Fires the spawn-complete notification at most once per activation.
    ///
    /// # Panics
    ///
    /// Panics if the instance is inactive.
    pub fn trigger_spawn_complete(&mut self) -> bool {
        if !self.lifecycle.trigger_spawn_complete() {
            return false;
        }
        self.value.on_spawn_complete();
        true
    }

    //--- Accessors --------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    pub fn lifecycle(&self) -> &PoolableObject {
        &self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

//=========================================================================
// Tests
//=========================================================================
