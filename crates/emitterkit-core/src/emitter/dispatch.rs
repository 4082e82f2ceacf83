//! Emitter implementation: registration, removal and synchronous dispatch.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use super::registry::{Position, Registry, Snapshot};
use crate::config::EmitterConfig;
use crate::error::{ListenerError, Result};
use crate::listener::{Listener, ListenerChange, ListenerId};
use crate::name::{Event, Name, Reserved, ERROR, NEW_LISTENER, REMOVE_LISTENER};

pub(crate) struct Inner {
    registry: Mutex<Registry>,
    max_listeners: AtomicUsize,
    pub(crate) default_timeout: Duration,
}

/// Typed, synchronous event emitter
///
/// Cloning yields another handle to the same registry. All methods take
/// `&self`; the registry lock is never held while a listener runs, so
/// listeners may register, remove and emit re-entrantly.
///
/// A listener that captures an `Emitter` clone keeps the registry alive
/// until it is removed. Capture a [`WeakEmitter`] (see
/// [`downgrade`](Self::downgrade)) when the listener should not.
#[derive(Clone)]
pub struct Emitter {
    pub(crate) inner: Arc<Inner>,
}

impl Emitter {
    /// Create an emitter with default configuration
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Create an emitter with custom configuration
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::default()),
                max_listeners: AtomicUsize::new(config.max_listeners),
                default_timeout: config.default_timeout,
            }),
        }
    }

    /// Names with at least one listener, oldest first
    pub fn event_names(&self) -> Vec<Name> {
        self.inner.registry.lock().names()
    }

    /// Listeners registered for `event`, or `None` if there are none
    pub fn listeners<P: 'static>(&self, event: &Event<P>) -> Option<Vec<Listener<P>>> {
        match self.inner.registry.lock().snapshot::<P>(event.name()) {
            Snapshot::Listeners(listeners) => Some(listeners),
            Snapshot::Empty | Snapshot::Mismatch { .. } => None,
        }
    }

    /// Number of listeners registered under `name`
    pub fn listener_count(&self, name: impl AsRef<Name>) -> usize {
        self.inner.registry.lock().count(name.as_ref())
    }

    /// Check if any event has any listener
    pub fn has_listeners(&self) -> bool {
        !self.inner.registry.lock().is_empty()
    }

    /// Check if `name` has any listener
    pub fn has_listener(&self, name: impl AsRef<Name>) -> bool {
        self.listener_count(name) > 0
    }

    /// Check if this exact listener is registered for `event`
    pub fn is_registered<P>(&self, event: &Event<P>, listener: &Listener<P>) -> bool {
        self.inner
            .registry
            .lock()
            .contains(event.name(), listener.id())
    }

    /// Current diagnostic threshold on listeners per event
    pub fn max_listeners(&self) -> usize {
        self.inner.max_listeners.load(Ordering::Relaxed)
    }

    /// Change the diagnostic threshold on listeners per event
    pub fn set_max_listeners(&self, max: usize) {
        self.inner.max_listeners.store(max, Ordering::Relaxed);
    }

    /// Register `listener` for `event`
    ///
    /// Fails if this listener is already registered for `event`, or if the
    /// event's listeners expect another payload type. Emits `newListener` on
    /// success.
    pub fn on<P: 'static>(&self, event: &Event<P>, listener: &Listener<P>) -> Result<Subscription> {
        self.register(event, listener, Position::Back)
    }

    /// Like [`on`](Self::on), but the listener runs before those already registered
    pub fn prepend<P: 'static>(
        &self,
        event: &Event<P>,
        listener: &Listener<P>,
    ) -> Result<Subscription> {
        self.register(event, listener, Position::Front)
    }

    pub(super) fn register<P: 'static>(
        &self,
        event: &Event<P>,
        listener: &Listener<P>,
        position: Position,
    ) -> Result<Subscription> {
        let name = event.name();
        let count = self
            .inner
            .registry
            .lock()
            .insert(name, listener, position)?;
        tracing::debug!(event = %name, listener = %listener.id(), "Listener registered");

        self.emit(
            &NEW_LISTENER,
            &ListenerChange {
                name: name.clone(),
                listener: listener.id(),
            },
        );

        let max = self.max_listeners();
        if count > max {
            tracing::error!(
                event = %name,
                count,
                max,
                "Possible listener leak: more listeners than the configured maximum"
            );
        }

        Ok(Subscription {
            emitter: self.downgrade(),
            name: name.clone(),
            listener: listener.id(),
        })
    }

    /// Handle that does not keep the registry alive
    pub fn downgrade(&self) -> WeakEmitter {
        WeakEmitter {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Remove `listener` from `event`; returns 1 if it was registered, else 0
    pub fn off<P>(&self, event: &Event<P>, listener: &Listener<P>) -> usize {
        self.remove(event.name(), listener.id())
    }

    /// Remove every listener of `name`; returns how many were removed
    pub fn off_event(&self, name: impl AsRef<Name>) -> usize {
        let name = name.as_ref();
        let ids = self.inner.registry.lock().ids(name);
        ids.into_iter().map(|id| self.remove(name, id)).sum()
    }

    /// Remove every listener of every event; returns how many were removed
    ///
    /// `removeListener` listeners are removed last so they observe the
    /// other removals.
    pub fn off_all(&self) -> usize {
        let remove_listener = Name::Reserved(Reserved::RemoveListener);
        let mut names = self.event_names();
        names.retain(|name| *name != remove_listener);
        names.push(remove_listener);
        names.iter().map(|name| self.off_event(name)).sum()
    }

    pub(crate) fn remove(&self, name: &Name, id: ListenerId) -> usize {
        // Dropped only once the lock is released
        let removed = { self.inner.registry.lock().remove(name, id) };
        let Some(registration) = removed else {
            return 0;
        };
        tracing::debug!(event = %name, listener = %id, "Listener removed");
        self.emit(
            &REMOVE_LISTENER,
            &ListenerChange {
                name: name.clone(),
                listener: id,
            },
        );
        drop(registration);
        1
    }

    /// Invoke every listener of `event` with `payload`, in registration order
    ///
    /// Returns the number of listeners invoked. Never fails: listener errors
    /// and panics are re-emitted on [`ERROR`] when it has listeners, and
    /// logged otherwise. Listeners registered during this call are not
    /// invoked by it; listeners removed during it are skipped from then on.
    pub fn emit<P: 'static>(&self, event: &Event<P>, payload: &P) -> usize {
        let name = event.name();
        let snapshot = self.inner.registry.lock().snapshot::<P>(name);
        let listeners = match snapshot {
            Snapshot::Empty => return 0,
            Snapshot::Mismatch { expected } => {
                tracing::warn!(
                    event = %name,
                    expected,
                    found = std::any::type_name::<P>(),
                    "Dropping emission with mismatched payload type"
                );
                return 0;
            }
            Snapshot::Listeners(listeners) => listeners,
        };

        let mut invoked = 0;
        for listener in listeners {
            if !self.inner.registry.lock().contains(name, listener.id()) {
                continue;
            }
            invoked += 1;
            let failure = match panic::catch_unwind(AssertUnwindSafe(|| listener.call(payload))) {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => ListenerError::Failed {
                    name: name.clone(),
                    listener: listener.id(),
                    error: Arc::new(error),
                },
                Err(panic) => ListenerError::from_panic(name.clone(), listener.id(), panic),
            };
            self.route_failure(name, failure);
        }
        invoked
    }

    fn route_failure(&self, name: &Name, failure: ListenerError) {
        if name != ERROR.name() && self.has_listener(&ERROR) {
            self.emit(&ERROR, &failure);
        } else {
            tracing::error!(event = %name, error = %failure, "Unhandled listener failure");
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("event_names", &self.event_names())
            .field("max_listeners", &self.max_listeners())
            .field("default_timeout", &self.inner.default_timeout)
            .finish()
    }
}

/// Non-owning [`Emitter`] handle, see [`Emitter::downgrade`]
#[derive(Clone, Default)]
pub struct WeakEmitter {
    inner: Weak<Inner>,
}

impl WeakEmitter {
    /// The emitter, if it is still alive
    pub fn upgrade(&self) -> Option<Emitter> {
        self.inner.upgrade().map(|inner| Emitter { inner })
    }
}

impl std::fmt::Debug for WeakEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakEmitter")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Registration handle returned by [`Emitter::on`] and friends
///
/// Holds the emitter weakly; dropping it leaves the listener registered.
#[derive(Clone)]
pub struct Subscription {
    emitter: WeakEmitter,
    name: Name,
    listener: ListenerId,
}

impl Subscription {
    /// Remove the registration; returns 1 if it was still registered, else 0
    pub fn off(&self) -> usize {
        self.emitter
            .upgrade()
            .map_or(0, |emitter| emitter.remove(&self.name, self.listener))
    }

    /// Event the listener was registered under
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Identity of the registered listener
    pub fn listener(&self) -> ListenerId {
        self.listener
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("listener", &self.listener)
            .finish()
    }
}
