//! Listener registry with RAII connections.
//!
//! Cameras notify subscribers about new frames (pixels, ray data, bounding
//! boxes) through a [`Dispatcher`]. `connect()` hands back a [`Connection`]
//! whose drop unsubscribes, matching the scoped-connection contract of the
//! frame-listener API.
//!
//! Dispatch is synchronous on the rendering thread. Invocation order among
//! multiple listeners is unspecified.

use std::sync::{Arc, Mutex, Weak};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable key for a registered listener.
    pub struct ListenerKey;
}

type Registry<F> = Mutex<SlotMap<ListenerKey, Arc<F>>>;

/// Listener registry for one event kind.
///
/// `F` is the unsized callback type, e.g.
/// `dyn Fn(&[u8], u32, u32, u32, PixelFormat) + Send + Sync`.
pub struct Dispatcher<F: ?Sized> {
    listeners: Arc<Registry<F>>,
}

impl<F: ?Sized> Dispatcher<F> {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Register a listener.
    ///
    /// The listener stays subscribed until the returned [`Connection`] is
    /// dropped.
    pub fn connect(&self, listener: Arc<F>) -> Connection<F> {
        let key = self.listeners.lock().unwrap().insert(listener);
        Connection {
            registry: Arc::downgrade(&self.listeners),
            key,
        }
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// True if at least one listener is registered
    pub fn has_listeners(&self) -> bool {
        self.listener_count() > 0
    }

    /// Invoke `call` once per registered listener.
    ///
    /// Listeners are snapshotted before the first call, so a listener may
    /// connect or disconnect re-entrantly without deadlocking the registry.
    pub fn for_each(&self, mut call: impl FnMut(&F)) {
        let snapshot: Vec<Arc<F>> = self.listeners.lock().unwrap().values().cloned().collect();
        for listener in &snapshot {
            call(listener);
        }
    }
}

impl<F: ?Sized> Default for Dispatcher<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII subscription handle returned by [`Dispatcher::connect`].
///
/// Dropping the connection unsubscribes the listener. The handle holds only
/// a weak reference to the registry, so it outliving the camera is harmless.
pub struct Connection<F: ?Sized> {
    registry: Weak<Registry<F>>,
    key: ListenerKey,
}

impl<F: ?Sized> Connection<F> {
    /// True while the listener is still registered
    pub fn connected(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry
                .lock()
                .map(|listeners| listeners.contains_key(self.key))
                .unwrap_or(false),
            None => false,
        }
    }

    /// Explicitly unsubscribe (equivalent to dropping the handle)
    pub fn disconnect(self) {}
}

impl<F: ?Sized> Drop for Connection<F> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut listeners) = registry.lock() {
                listeners.remove(self.key);
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
