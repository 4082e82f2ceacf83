//! Listener identities.
//!
//! A [`Listener`] is a shared callable with a stable [`ListenerId`]. Clones
//! share the id, so the clone kept by the caller can later be passed to
//! `off` to remove the registration.

use std::sync::Arc;

use uuid::Uuid;

use crate::name::Name;

/// Identity of a listener, shared by all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new unique listener ID
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", &self.0.to_string()[..8])
    }
}

/// Outcome of a single listener invocation
pub type ListenerResult = anyhow::Result<()>;

type Callback<P> = dyn Fn(&P) -> ListenerResult + Send + Sync;

/// Payload of the reserved `newListener` / `removeListener` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerChange {
    /// Event the listener is (or was) registered under.
    pub name: Name,
    /// The listener.
    pub listener: ListenerId,
}

/// Callback receiving payloads of type `P`.
pub struct Listener<P> {
    id: ListenerId,
    callback: Arc<Callback<P>>,
}

impl<P> Listener<P> {
    /// Wrap an infallible closure
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        Self::fallible(move |payload: &P| {
            callback(payload);
            Ok(())
        })
    }

    /// Wrap a closure whose errors are routed to the `error` event
    pub fn fallible<F>(callback: F) -> Self
    where
        F: Fn(&P) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            id: ListenerId::new(),
            callback: Arc::new(callback),
        }
    }

    /// Identity of this listener
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the callback directly, outside of any emitter
    pub fn call(&self, payload: &P) -> ListenerResult {
        (self.callback)(payload)
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<P> PartialEq for Listener<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for Listener<P> {}

impl<P> std::fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}
