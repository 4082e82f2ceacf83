//! Batch registration of named handlers.
//!
//! ```rust,ignore
//! let unlisten = listen(&socket, ListenerMap::new()
//!     .with(&MESSAGE, |m: &String| println!("{m}"))
//!     .with(&CLOSE, |_: &()| println!("closed")))?;
//!
//! // later
//! unlisten.off();
//! ```

use emitterkit_core::{
    Emitter, Event, Listener, ListenerResult, Name, Observable, Result, WeakEmitter,
};

type Register = Box<dyn Fn(&Emitter) -> Result<()> + Send + Sync>;
type Unregister = Box<dyn Fn(&Emitter) -> usize + Send + Sync>;

struct Entry {
    name: Name,
    register: Register,
    unregister: Unregister,
}

/// Ordered set of (event, listener) pairs with heterogeneous payload types
#[derive(Default)]
pub struct ListenerMap {
    entries: Vec<Entry>,
}

impl ListenerMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an infallible handler for `event`
    pub fn with<P, F>(self, event: &Event<P>, handler: F) -> Self
    where
        P: 'static,
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.with_listener(event, Listener::new(handler))
    }

    /// Add a handler whose errors are routed to the `error` event
    pub fn with_fallible<P, F>(self, event: &Event<P>, handler: F) -> Self
    where
        P: 'static,
        F: Fn(&P) -> ListenerResult + Send + Sync + 'static,
    {
        self.with_listener(event, Listener::fallible(handler))
    }

    /// Add an existing listener for `event`
    pub fn with_listener<P: 'static>(mut self, event: &Event<P>, listener: Listener<P>) -> Self {
        let register = {
            let event = event.clone();
            let listener = listener.clone();
            Box::new(move |emitter: &Emitter| emitter.on(&event, &listener).map(|_| ()))
        };
        let unregister = {
            let event = event.clone();
            Box::new(move |emitter: &Emitter| emitter.off(&event, &listener))
        };
        self.entries.push(Entry {
            name: event.name().clone(),
            register,
            unregister,
        });
        self
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no pairs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Event names, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|entry| &entry.name)
    }
}

impl std::fmt::Debug for ListenerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Register every pair of `listeners` on `target`, in insertion order
///
/// If one registration fails, the pairs registered before it are removed
/// again and the error is returned.
pub fn listen<O: Observable>(target: &O, listeners: ListenerMap) -> Result<Unlisten> {
    let emitter = target.emitter();
    for (index, entry) in listeners.entries.iter().enumerate() {
        if let Err(err) = (entry.register)(emitter) {
            tracing::debug!(event = %entry.name, error = %err, "Rolling back batch registration");
            for registered in &listeners.entries[..index] {
                (registered.unregister)(emitter);
            }
            return Err(err);
        }
    }
    Ok(Unlisten {
        emitter: emitter.downgrade(),
        listeners,
    })
}

/// Handle returned by [`listen`]; removes the whole batch
///
/// Holds the emitter weakly, so it can be stored inside one of its own
/// handlers without keeping the emitter alive.
pub struct Unlisten {
    emitter: WeakEmitter,
    listeners: ListenerMap,
}

impl Unlisten {
    /// Remove every pair, in insertion order; returns how many were still registered
    pub fn off(&self) -> usize {
        let Some(emitter) = self.emitter.upgrade() else {
            return 0;
        };
        self.listeners
            .entries
            .iter()
            .map(|entry| (entry.unregister)(&emitter))
            .sum()
    }
}

impl std::fmt::Debug for Unlisten {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unlisten")
            .field("emitter", &self.emitter)
            .field("listeners", &self.listeners)
            .finish()
    }
}
