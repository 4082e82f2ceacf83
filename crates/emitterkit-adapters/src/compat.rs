//! Conventional emitter method names on top of [`Observable`].

use emitterkit_core::{Event, Listener, Name, Observable, Result};

/// Familiar `add_listener` / `remove_listener` style API
///
/// Implemented for every [`Observable`]. Registration methods return `self`
/// so calls chain:
///
/// ```rust,ignore
/// emitter
///     .add_listener(&DATA, &log)?
///     .prepend_listener(&DATA, &audit)?;
/// ```
pub trait EventEmitterCompat: Observable {
    /// Alias of `on`
    fn add_listener<P: 'static>(&self, event: &Event<P>, listener: &Listener<P>) -> Result<&Self> {
        self.emitter().on(event, listener)?;
        Ok(self)
    }

    /// Register `listener` ahead of those already registered
    fn prepend_listener<P: 'static>(
        &self,
        event: &Event<P>,
        listener: &Listener<P>,
    ) -> Result<&Self> {
        self.emitter().prepend(event, listener)?;
        Ok(self)
    }

    /// One-shot registration ahead of those already registered
    fn prepend_once_listener<P: 'static>(
        &self,
        event: &Event<P>,
        listener: &Listener<P>,
    ) -> Result<&Self> {
        self.emitter().prepend_once(event, listener)?;
        Ok(self)
    }

    /// Alias of `off`
    fn remove_listener<P>(&self, event: &Event<P>, listener: &Listener<P>) -> &Self {
        self.emitter().off(event, listener);
        self
    }

    /// Remove the listeners of `name`, or of every event when `None`
    fn remove_all_listeners(&self, name: Option<&Name>) -> &Self {
        match name {
            Some(name) => self.emitter().off_event(name),
            None => self.emitter().off_all(),
        };
        self
    }

    /// Registered listeners of `event`, empty when there are none
    ///
    /// One-shot registrations appear as their internal wrapper.
    fn raw_listeners<P: 'static>(&self, event: &Event<P>) -> Vec<Listener<P>> {
        self.emitter().listeners(event).unwrap_or_default()
    }

    /// Current listener threshold
    fn get_max_listeners(&self) -> usize {
        self.emitter().max_listeners()
    }

    /// Change the listener threshold
    fn set_max_listeners(&self, max: usize) -> &Self {
        self.emitter().set_max_listeners(max);
        self
    }

    /// Emit `payload`; true if `event` had listeners
    fn dispatch<P: 'static>(&self, event: &Event<P>, payload: &P) -> bool {
        self.emitter().emit(event, payload) > 0
    }
}

impl<T: Observable> EventEmitterCompat for T {}
