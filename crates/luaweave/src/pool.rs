//! Pooling of interpreter states.
//!
//! Lua states are single-threaded and comparatively expensive to bootstrap, so
//! [`InstancePool`] keeps a small buffer of idle ones. Both directions are
//! non-blocking: [`acquire`](InstancePool::acquire) falls back to opening a
//! new state and [`release`](InstancePool::release) falls back to closing the
//! state whenever the buffer is empty, full, or momentarily locked by another
//! thread. No render ever waits on another render.
//!
//! Reuse is opt-in. With reuse disabled (the default) every released state is
//! closed, which keeps renders fully isolated from each other at the cost of a
//! bootstrap per call.
//!
//! ```rust
//! use luaweave::{Bootstrap, InstanceFactory, InstancePool};
//! use std::path::Path;
//!
//! let factory = InstanceFactory::new(Path::new("lua"), "endpoints", Bootstrap::Builtin);
//! let pool = InstancePool::new(factory, 2, true);
//!
//! let first_id = {
//!     let instance = pool.checkout();
//!     instance.id()
//! }; // returned to the pool here
//!
//! assert_eq!(pool.idle_len(), 1);
//! assert_eq!(pool.checkout().id(), first_id);
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use mlua::Lua;
use parking_lot::Mutex;

use crate::runtime::InstanceFactory;

/// Default number of idle states kept by a pool.
pub const DEFAULT_CAPACITY: usize = 4;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// One bootstrapped interpreter state.
///
/// An instance is used by at most one render at a time; the pool guarantees
/// this by handing out owned values.
pub struct Instance {
    id: u64,
    lua: Lua,
}

impl Instance {
    fn open(factory: &InstanceFactory) -> Self {
        let instance = Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            lua: factory.open(),
        };
        tracing::debug!(instance = instance.id, "opened interpreter state");
        instance
    }

    /// Process-unique identifier, stable for the lifetime of the state.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Closes the state and frees its heap.
    pub fn close(self) {
        tracing::debug!(instance = self.id, "closing interpreter state");
        drop(self.lua);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("id", &self.id).finish()
    }
}

/// Counters describing a pool's lifetime activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// States opened because no idle one was available.
    pub created: usize,
    /// States closed on release or drain.
    pub destroyed: usize,
    /// Acquisitions served from the idle buffer.
    pub reused: usize,
}

/// Bounded, non-blocking cache of idle interpreter states.
pub struct InstancePool {
    factory: InstanceFactory,
    idle: Mutex<Vec<Instance>>,
    capacity: usize,
    reuse: bool,
    created: AtomicUsize,
    destroyed: AtomicUsize,
    reused: AtomicUsize,
}

impl InstancePool {
    /// Creates an empty pool.
    ///
    /// `capacity` bounds the idle buffer; `reuse` decides whether released
    /// states are kept at all.
    pub fn new(factory: InstanceFactory, capacity: usize, reuse: bool) -> Self {
        Self {
            factory,
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            reuse,
            created: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        }
    }

    /// Takes an idle state, or opens a new one.
    pub fn acquire(&self) -> Instance {
        if let Some(mut idle) = self.idle.try_lock() {
            if let Some(instance) = idle.pop() {
                self.reused.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(instance = instance.id, "reusing idle interpreter state");
                return instance;
            }
        }

        self.created.fetch_add(1, Ordering::Relaxed);
        Instance::open(&self.factory)
    }

    /// Returns a state to the pool, or closes it.
    ///
    /// The state is closed when reuse is disabled, the buffer is full, or the
    /// buffer is locked by another thread.
    pub fn release(&self, instance: Instance) {
        if self.reuse {
            if let Some(mut idle) = self.idle.try_lock() {
                if idle.len() < self.capacity {
                    tracing::trace!(instance = instance.id, "parking interpreter state");
                    idle.push(instance);
                    return;
                }
            }
        }

        self.destroy(instance);
    }

    /// Acquires a state wrapped in a guard that releases it on drop.
    pub fn checkout(&self) -> PooledInstance<'_> {
        PooledInstance {
            pool: self,
            instance: Some(self.acquire()),
        }
    }

    /// Closes every idle state. Returns how many were closed.
    pub fn drain(&self) -> usize {
        let drained: Vec<Instance> = std::mem::take(&mut *self.idle.lock());
        let count = drained.len();
        for instance in drained {
            self.destroy(instance);
        }
        count
    }

    /// Number of idle states currently buffered.
    pub fn idle_len(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether released states are kept for later renders.
    pub fn reuses(&self) -> bool {
        self.reuse
    }

    pub fn factory(&self) -> &InstanceFactory {
        &self.factory
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            destroyed: self.destroyed.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
        }
    }

    fn destroy(&self, instance: Instance) {
        self.destroyed.fetch_add(1, Ordering::Relaxed);
        instance.close();
    }
}

impl fmt::Debug for InstancePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstancePool")
            .field("capacity", &self.capacity)
            .field("reuse", &self.reuse)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// An [`Instance`] checked out of a pool; released when dropped.
pub struct PooledInstance<'a> {
    pool: &'a InstancePool,
    instance: Option<Instance>,
}

impl Deref for PooledInstance<'_> {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        // Only `drop` takes the instance out.
        self.instance
            .as_ref()
            .unwrap_or_else(|| unreachable!("pooled instance used after release"))
    }
}

impl Drop for PooledInstance<'_> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.pool.release(instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Bootstrap;
    use std::path::Path;

    fn pool(capacity: usize, reuse: bool) -> InstancePool {
        let factory = InstanceFactory::new(Path::new("unused"), "endpoints", Bootstrap::None);
        InstancePool::new(factory, capacity, reuse)
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = pool(DEFAULT_CAPACITY, true);
        assert_eq!(pool.idle_len(), 0);
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[test]
    fn test_acquire_opens_when_empty() {
        let pool = pool(2, true);
        let a = pool.acquire();
        let b = pool.acquire();
        assert_ne!(a.id(), b.id());
        assert_eq!(pool.stats().created, 2);
    }

    #[test]
    fn test_without_reuse_release_always_closes() {
        let pool = pool(DEFAULT_CAPACITY, false);
        for _ in 0..5 {
            let instance = pool.acquire();
            pool.release(instance);
            assert_eq!(pool.idle_len(), 0);
        }
        let stats = pool.stats();
        assert_eq!(stats.created, 5);
        assert_eq!(stats.destroyed, 5);
        assert_eq!(stats.reused, 0);
    }

    #[test]
    fn test_reuse_returns_same_state() {
        let pool = pool(1, true);
        let instance = pool.acquire();
        let id = instance.id();
        instance.lua().globals().set("marker", 7).unwrap();
        pool.release(instance);

        let again = pool.acquire();
        assert_eq!(again.id(), id);
        let marker: i64 = again.lua().globals().get("marker").unwrap();
        assert_eq!(marker, 7);
        assert_eq!(pool.stats().reused, 1);
    }

    #[test]
    fn test_release_beyond_capacity_closes_surplus() {
        let pool = pool(2, true);
        let held: Vec<Instance> = (0..3).map(|_| pool.acquire()).collect();
        for instance in held {
            pool.release(instance);
        }
        assert_eq!(pool.idle_len(), 2);
        assert_eq!(pool.stats().destroyed, 1);
    }

    #[test]
    fn test_zero_capacity_never_buffers() {
        let pool = pool(0, true);
        let instance = pool.acquire();
        pool.release(instance);
        assert_eq!(pool.idle_len(), 0);
        assert_eq!(pool.stats().destroyed, 1);
    }

    #[test]
    fn test_checkout_guard_releases_on_drop() {
        let pool = pool(1, true);
        {
            let guard = pool.checkout();
            assert!(guard.id() > 0);
            assert_eq!(pool.idle_len(), 0);
        }
        assert_eq!(pool.idle_len(), 1);
    }

    #[test]
    fn test_checkout_guard_releases_on_panic() {
        let pool = pool(1, true);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = pool.checkout();
            panic!("render blew up");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle_len(), 1);
    }

    #[test]
    fn test_drain_closes_idle_states() {
        let pool = pool(3, true);
        let held: Vec<Instance> = (0..3).map(|_| pool.acquire()).collect();
        held.into_iter().for_each(|i| pool.release(i));
        assert_eq!(pool.drain(), 3);
        assert_eq!(pool.idle_len(), 0);
        assert_eq!(pool.stats().destroyed, 3);
    }

    #[test]
    fn test_pool_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InstancePool>();
        fn assert_send<T: Send>() {}
        assert_send::<Instance>();
    }
}
