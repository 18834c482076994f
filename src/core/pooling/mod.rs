//=========================================================================
// Object Pooling
//=========================================================================
//
// Reuse of pre-created instances instead of per-spawn allocation.
//
// Architecture:
//   SpawnManager
//     └─ Box<dyn ObjectPooler<T>>
//          ├─ SimpleObjectPooler:   one prototype, one SharedPool
//          └─ MultipleObjectPooler: N prototypes, one SharedPool each
//                                    + flattened fill order + cursor
//   WaitingPools:    name → SharedPool registry (mutualization)
//   LifetimeSweeper: System reclaiming expired instances every tick
//
//=========================================================================

//=== Module Declarations =================================================

mod config;
mod multiple_pooler;
mod object_pool;
mod poolable;
mod pooler;
mod simple_pooler;
mod spawner;
mod sweeper;
mod waiting_pools;

//=== Public API ==========================================================

pub use config::{MultiplePoolConfig, PoolEntryConfig, SimplePoolConfig};
pub use multiple_pooler::MultipleObjectPooler;
pub use object_pool::{ObjectPool, PoolHandle, PoolId, SharedPool};
pub use poolable::{Poolable, PoolableObject, PooledObject};
pub use pooler::{FnPrototype, ObjectPooler, PoolError, Prototype};
pub use simple_pooler::SimpleObjectPooler;
pub use spawner::SpawnManager;
pub use sweeper::{ExpiringPool, LifetimeSweeper};
pub use waiting_pools::WaitingPools;
