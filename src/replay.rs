//! Latest-value broadcast channel.
//!
//! DESIGN
//! ======
//! A `ReplayChannel` stores the most recently published value plus an ordered
//! list of listener callbacks. `publish` stores the value and then fans it out
//! to every listener in registration order. `subscribe` registers a listener
//! and immediately replays the stored value, so a late subscriber never starts
//! from stale state. Nothing is replayed before the first publish.
//!
//! TRADE-OFFS
//! ==========
//! Listeners run outside the lock on a snapshot of the listener list. A
//! listener may publish or subscribe re-entrantly without deadlocking, but
//! publish order is only guaranteed for publishes issued from one task.

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    latest: Option<T>,
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
}

fn lock_inner<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    // Listeners never run under the lock, so a poisoned guard still holds
    // consistent data.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Publish point that retains its last value and replays it to new subscribers.
///
/// Cloning yields another handle to the same channel.
pub struct ReplayChannel<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for ReplayChannel<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Clone + Send + 'static> Default for ReplayChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> ReplayChannel<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner { latest: None, listeners: Vec::new(), next_id: 0 })) }
    }

    /// Store `value` and deliver it to every listener in registration order.
    ///
    /// Values are not deduplicated: publishing the same value twice delivers
    /// it twice.
    pub fn publish(&self, value: T) {
        let listeners: Vec<Listener<T>> = {
            let mut inner = lock_inner(&self.inner);
            inner.latest = Some(value.clone());
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(&value);
        }
    }

    /// Register `listener` and replay the stored value to it, if any.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener: Listener<T> = Arc::new(listener);
        let (id, replay) = {
            let mut inner = lock_inner(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.latest.clone())
        };
        if let Some(value) = replay {
            listener(&value);
        }

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock_inner(&inner).listeners.retain(|(i, _)| *i != id);
            }
        })
    }

    /// Most recently published value, or `None` before the first publish.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        lock_inner(&self.inner).latest.clone()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock_inner(&self.inner).listeners.len()
    }

    /// Read-only view of this channel.
    #[must_use]
    pub fn observe(&self) -> Observable<T> {
        Observable { channel: self.clone() }
    }
}

// =============================================================================
// OBSERVABLE
// =============================================================================

/// Subscribe-only handle onto a [`ReplayChannel`].
pub struct Observable<T> {
    channel: ReplayChannel<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { channel: self.channel.clone() }
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    /// See [`ReplayChannel::subscribe`].
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.channel.subscribe(listener)
    }

    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.channel.latest()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Registration guard returned by `subscribe`. Dropping it removes the listener.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(detach: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { detach: Some(Box::new(detach)) }
    }

    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.detach.is_some()).finish()
    }
}
