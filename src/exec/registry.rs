// src/exec/registry.rs

//! Mutation-guarded map of live processes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::handle::{HandleId, ProcessHandle};

/// Single source of truth for "is this process still alive, and how do I
/// reach it".
///
/// A handle is present from successful spawn until its finalization. The
/// lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    handles: Mutex<HashMap<HandleId, Arc<ProcessHandle>>>,
    next_id: AtomicU64,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id. Ids start at 1 and are never handed out twice.
    pub(crate) fn allocate_id(&self) -> HandleId {
        HandleId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub(crate) fn insert(&self, handle: Arc<ProcessHandle>) {
        self.lock().insert(handle.id(), handle);
    }

    pub fn get(&self, id: HandleId) -> Option<Arc<ProcessHandle>> {
        self.lock().get(&id).cloned()
    }

    pub fn contains(&self, id: HandleId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Look up a handle by its raw OS pid.
    pub fn find_by_pid(&self, pid: u32) -> Option<Arc<ProcessHandle>> {
        self.lock().values().find(|h| h.pid() == pid).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<HandleId> {
        let mut ids: Vec<_> = self.lock().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Run `f` against a registered handle while holding the lock.
    ///
    /// Finalization of the same handle cannot interleave with `f`.
    pub(crate) fn with_handle<T>(
        &self,
        id: HandleId,
        f: impl FnOnce(&ProcessHandle) -> T,
    ) -> Option<T> {
        let guard = self.lock();
        guard.get(&id).map(|handle| f(handle))
    }

    /// Run the finalization steps in `f`, then deregister `id`, all under
    /// one lock acquisition.
    pub(crate) fn finalize(&self, id: HandleId, f: impl FnOnce()) {
        let mut guard = self.lock();
        f();
        guard.remove(&id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HandleId, Arc<ProcessHandle>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
