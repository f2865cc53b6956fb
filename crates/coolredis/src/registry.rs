//! Process-wide home of the shared connection.
//!
//! Every handler built with the same registry shares one connection. The
//! mutex doubles as the single-flight guard for initialization and as the
//! lock around connection state transitions.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::{Mutex, MutexGuard};

use coolredis_core::connection::{LinkEvent, LinkState, Transition};

/// Shared slot holding at most one connection.
pub struct ConnectionRegistry<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    slot: Mutex<Slot<S>>,
    /// Mirrors `slot.link.is_degraded()` so successful commands can skip
    /// the lock on the hot path.
    degraded: AtomicBool,
}

/// Connection handle plus its lifecycle state.
pub(crate) struct Slot<S> {
    pub(crate) store: Option<Arc<S>>,
    pub(crate) link: LinkState,
}

impl<S> Slot<S> {
    /// Applies an event and drops the handle if the transition says so.
    pub(crate) fn apply(&mut self, event: LinkEvent) -> Transition {
        let transition = self.link.apply(event);
        if transition.release_handle {
            self.store = None;
        }
        transition
    }

    /// Applies an event reported by a command that ran on `used`.
    ///
    /// Returns `None` when `used` is no longer the registered handle, so a
    /// late failure on an old connection cannot tear down its replacement.
    pub(crate) fn apply_for(&mut self, used: &Arc<S>, event: LinkEvent) -> Option<Transition> {
        match &self.store {
            Some(current) if Arc::ptr_eq(current, used) => Some(self.apply(event)),
            _ => None,
        }
    }
}

/// Lock guard that keeps the degraded flag in sync on release.
pub(crate) struct SlotGuard<'a, S> {
    guard: MutexGuard<'a, Slot<S>>,
    degraded: &'a AtomicBool,
}

impl<S> std::ops::Deref for SlotGuard<'_, S> {
    type Target = Slot<S>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<S> std::ops::DerefMut for SlotGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl<S> Drop for SlotGuard<'_, S> {
    fn drop(&mut self) {
        self.degraded
            .store(self.guard.link.is_degraded(), Ordering::Release);
    }
}

impl<S> ConnectionRegistry<S> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    store: None,
                    link: LinkState::new(),
                }),
                degraded: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the registered connection, if any.
    pub async fn current(&self) -> Option<Arc<S>> {
        self.inner.slot.lock().await.store.clone()
    }

    /// Snapshot of the connection lifecycle state.
    pub async fn link(&self) -> LinkState {
        self.inner.slot.lock().await.link
    }

    pub(crate) fn is_degraded(&self) -> bool {
        self.inner.degraded.load(Ordering::Acquire)
    }

    pub(crate) async fn lock(&self) -> SlotGuard<'_, S> {
        SlotGuard {
            guard: self.inner.slot.lock().await,
            degraded: &self.inner.degraded,
        }
    }
}

impl<S> Default for ConnectionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for ConnectionRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
