//=========================================================================
// Multiple Object Pooler
//=========================================================================
//
// Pools several prototypes, each with its own quota and sub-pool.
//
// Fill:
//   shuffle prototype order once → breadth-first rounds, one instance per
//   type per round → flattened `order` of (entry, index) slots
//
// Acquire (cursor):
//   wrap → read slot → advance → disabled type?   → None
//                                 slot inactive?   → slot
//                                 inactive of type → it
//                                 expandable?      → new (appended to order)
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

//=== Internal Dependencies ===============================================

use super::config::MultiplePoolConfig;
use super::object_pool::{ObjectPool, PoolHandle, SharedPool};
use super::poolable::{Poolable, PooledObject};
use super::pooler::{ObjectPooler, PoolError, Prototype};
use super::waiting_pools::WaitingPools;

//=== PoolEntry ===========================================================

struct PoolEntry<T: Poolable> {
    name: String,
    prototype: Box<dyn Prototype<T>>,
    pool_size: usize,
    can_expand: bool,
    enabled: bool,
    pool: Option<SharedPool<T>>,
}

impl<T: Poolable> PoolEntry<T> {
    fn add_object(&self, pool: &mut ObjectPool<T>) -> usize {
        let name = format!("{}-{}", self.name, pool.len());
        pool.push(PooledObject::new(name, self.name.as_str(), self.prototype.instantiate()))
    }
}

/// Slot of the flattened fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    entry: usize,
    index: usize,
}

//=== MultipleObjectPooler ================================================

pub struct MultipleObjectPooler<T: Poolable> {
    owner: String,
    entries: Vec<PoolEntry<T>>,
    mutualize_waiting_pools: bool,
    waiting_pools: Option<WaitingPools<T>>,
    rng: ChaCha8Rng,
    order: Vec<Slot>,
    cursor: usize,
    filled: bool,
}

impl<T: Poolable> MultipleObjectPooler<T> {
    //--- Construction -----------------------------------------------------

    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: Vec::new(),
            mutualize_waiting_pools: false,
            waiting_pools: None,
            rng: ChaCha8Rng::seed_from_u64(rand::random()),
            order: Vec::new(),
            cursor: 0,
            filled: false,
        }
    }

    /// Builds a pooler from configuration, resolving each entry's prototype
    /// through `lookup`.
    pub fn from_config<F>(
        owner: impl Into<String>,
        config: &MultiplePoolConfig,
        mut lookup: F,
    ) -> Result<Self, PoolError>
    where
        F: FnMut(&str) -> Option<Box<dyn Prototype<T>>>,
    {
        let mut pooler = Self::new(owner);
        pooler.mutualize_waiting_pools = config.mutualize_waiting_pools;
        if let Some(seed) = config.seed {
            pooler.rng = ChaCha8Rng::seed_from_u64(seed);
        }

        for entry in &config.entries {
            let prototype = lookup(&entry.prototype).ok_or_else(|| PoolError::UnknownPrototype {
                pooler: pooler.owner.clone(),
                prototype: entry.prototype.clone(),
            })?;
            pooler.push_entry(
                entry.prototype.clone(),
                prototype,
                entry.pool_size,
                entry.can_expand,
                entry.enabled,
            )?;
        }

        Ok(pooler)
    }

    /// Registers a prototype with its quota.
    pub fn add_entry<P>(
        &mut self,
        prototype: P,
        pool_size: usize,
        can_expand: bool,
        enabled: bool,
    ) -> Result<(), PoolError>
    where
        P: Prototype<T> + 'static,
    {
        let name = prototype.name().to_owned();
        self.push_entry(name, Box::new(prototype), pool_size, can_expand, enabled)
    }

    fn push_entry(
        &mut self,
        name: String,
        prototype: Box<dyn Prototype<T>>,
        pool_size: usize,
        can_expand: bool,
        enabled: bool,
    ) -> Result<(), PoolError> {
        if self.entries.iter().any(|e| e.name == name) {
            return Err(PoolError::DuplicatePrototype(name));
        }

        // Entries added after fill get their sub-pool and quota right away
        let pool = self.filled.then(|| self.create_waiting_pool(&name));

        self.entries.push(PoolEntry {
            name,
            prototype,
            pool_size,
            can_expand,
            enabled,
            pool,
        });
        if self.filled {
            self.fill_entry(self.entries.len() - 1);
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn with_waiting_pools(mut self, registry: WaitingPools<T>, mutualize: bool) -> Self {
        self.waiting_pools = Some(registry);
        self.mutualize_waiting_pools = mutualize;
        self
    }

    /// Name of the waiting pool for one prototype.
    pub fn pool_name(&self, prototype: &str) -> String {
        format!("[MultipleObjectPooler]_{}: {}", self.owner, prototype)
    }

    //--- Control ----------------------------------------------------------

    /// Enables or disables a prototype. Disabled prototypes stay filled
    /// but are never handed out.
    pub fn set_enabled(&mut self, prototype: &str, enabled: bool) -> Result<(), PoolError> {
        let index = self.entry_index(prototype)?;
        self.entries[index].enabled = enabled;
        Ok(())
    }

    /// Restarts the acquisition cursor at the first slot.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_enabled(&self, prototype: &str) -> Option<bool> {
        self.entries.iter().find(|e| e.name == prototype).map(|e| e.enabled)
    }

    /// Instances of `prototype` across its sub-pool, active or not.
    pub fn instance_count_of(&self, prototype: &str) -> usize {
        self.entries
            .iter()
            .find(|e| e.name == prototype)
            .and_then(|e| e.pool.as_ref())
            .map_or(0, |pool| pool.lock().count_of(prototype))
    }

    /// Prototype names in the recorded acquisition order.
    pub fn fill_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|slot| self.entries[slot.entry].name.as_str())
            .collect()
    }

    pub fn prototypes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    //--- Internals --------------------------------------------------------

    fn entry_index(&self, prototype: &str) -> Result<usize, PoolError> {
        self.entries
            .iter()
            .position(|e| e.name == prototype)
            .ok_or_else(|| PoolError::UnknownPrototype {
                pooler: self.owner.clone(),
                prototype: prototype.to_owned(),
            })
    }

    fn create_waiting_pool(&self, prototype: &str) -> SharedPool<T> {
        let name = self.pool_name(prototype);

        match (&self.waiting_pools, self.mutualize_waiting_pools) {
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

    /// Appends one entry's instances to the order of an already filled
    /// pooler, creating whatever its quota still lacks.
    fn fill_entry(&mut self, entry_index: usize) {
        let entry = &self.entries[entry_index];
        let Some(shared) = entry.pool.clone() else {
            return;
        };
        let mut pool = shared.lock();

        let existing = pool.len();
        self.order.extend((0..existing).map(|index| Slot { entry: entry_index, index }));
        for _ in existing..entry.pool_size {
            let index = entry.add_object(&mut pool);
            self.order.push(Slot { entry: entry_index, index });
        }

        debug!(
            "Pooler '{}' added '{}' after fill: {} instances, {} slots",
            self.owner,
            entry.name,
            pool.len(),
            self.order.len()
        );
    }

    /// Creates one instance of `entry`, records it in the order and
    /// activates it.
    fn expand(&mut self, entry: usize, now: f64) -> Option<PoolHandle> {
        let shared = self.entries[entry].pool.clone()?;
        let mut pool = shared.lock();

        let index = self.entries[entry].add_object(&mut pool);
        self.order.push(Slot { entry, index });
        debug!("Expanded '{}' to {} instances", pool.name(), pool.len());

        pool.activate(index, now)
    }
}

impl<T: Poolable> ObjectPooler<T> for MultipleObjectPooler<T> {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn fill_pool(&mut self) {
        if self.filled {
            return;
        }

        for i in 0..self.entries.len() {
            let pool = self.create_waiting_pool(&self.entries[i].name);
            self.entries[i].pool = Some(pool);
        }

        self.order.clear();
        self.cursor = 0;

        // Instances already present in mutualized pools keep their slots
        let mut remaining = Vec::with_capacity(self.entries.len());
        for (entry_index, entry) in self.entries.iter().enumerate() {
            let existing = entry.pool.as_ref().map_or(0, |pool| pool.lock().len());
            self.order.extend((0..existing).map(|index| Slot { entry: entry_index, index }));
            remaining.push(entry.pool_size.saturating_sub(existing));
        }

        let mut type_order: Vec<usize> = (0..self.entries.len()).collect();
        type_order.shuffle(&mut self.rng);

        let mut objects_remaining = true;
        while objects_remaining {
            objects_remaining = false;
            for &entry_index in &type_order {
                if remaining[entry_index] == 0 {
                    continue;
                }

                let entry = &self.entries[entry_index];
                if let Some(shared) = &entry.pool {
                    let index = entry.add_object(&mut shared.lock());
                    self.order.push(Slot { entry: entry_index, index });
                }
                remaining[entry_index] -= 1;
                objects_remaining = true;
            }
        }

        self.filled = true;
        debug!(
            "Filled multiple pooler '{}': {} prototypes, {} slots",
            self.owner,
            self.entries.len(),
            self.order.len()
        );
    }

    fn is_filled(&self) -> bool {
        self.filled
    }

    fn acquire(&mut self, now: f64) -> Option<PoolHandle> {
        if !self.filled {
            error!("Pooler '{}' was asked for an instance before fill_pool", self.owner);
            return None;
        }
        if self.order.is_empty() {
            return None;
        }

        // Cursor bookkeeping happens before any early return
        if self.cursor >= self.order.len() {
            self.cursor = 0;
        }
        let slot = self.order[self.cursor];
        self.cursor += 1;

        let entry = &self.entries[slot.entry];
        if !entry.enabled {
            return None;
        }
        let can_expand = entry.can_expand;
        let shared = entry.pool.clone()?;

        {
            let mut pool = shared.lock();
            if let Some(handle) = pool.activate(slot.index, now) {
                return Some(handle);
            }
            if let Some(index) = pool.first_inactive_of(&entry.name) {
                return pool.activate(index, now);
            }
        }

        if can_expand {
            return self.expand(slot.entry, now);
        }
        None
    }

    fn acquire_of_type(&mut self, prototype: &str, now: f64) -> Result<Option<PoolHandle>, PoolError> {
        if !self.filled {
            error!("Pooler '{}' was asked for '{}' before fill_pool", self.owner, prototype);
            return Err(PoolError::NotFilled(self.owner.clone()));
        }

        let entry_index = match self.entry_index(prototype) {
            Ok(index) => index,
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };

        let entry = &self.entries[entry_index];
        if !entry.enabled {
            warn!("Pooler '{}': prototype '{}' is disabled", self.owner, prototype);
            return Ok(None);
        }
        let can_expand = entry.can_expand;
        let Some(shared) = entry.pool.clone() else {
            return Ok(None);
        };

        {
            let mut pool = shared.lock();
            if let Some(index) = pool.first_inactive_of(prototype) {
                return Ok(pool.activate(index, now));
            }
        }

        if can_expand {
            return Ok(self.expand(entry_index, now));
        }

        debug!("Pooler '{}': no '{}' available", self.owner, prototype);
        Ok(None)
    }

    fn pools(&self) -> Vec<SharedPool<T>> {
        self.entries.iter().filter_map(|e| e.pool.clone()).collect()
    }

    fn destroy_pool(&mut self) {
        for entry in &mut self.entries {
            let Some(shared) = entry.pool.take() else {
                continue;
            };

            let name = {
                let mut pool = shared.lock();
                pool.clear();
                pool.name().to_owned()
            };

            if self.mutualize_waiting_pools {
                if let Some(registry) = &self.waiting_pools {
                    registry.remove(&name);
                }
            }
        }

        self.order.clear();
        self.cursor = 0;
        self.filled = false;
        debug!("Destroyed pools of '{}'", self.owner);
    }
}

//=========================================================================
// Tests
//=========================================================================
