//! Composition capability for components that expose events.
//!
//! A component holds an [`Emitter`] and implements [`Observable`] by handing
//! it out. A component wrapping another forwards the inner one's emitter, so
//! its events are a superset of the wrapped component's.
//!
//! ```rust,ignore
//! struct Socket { events: Emitter }
//!
//! impl Observable for Socket {
//!     fn emitter(&self) -> &Emitter { &self.events }
//! }
//!
//! struct Client { socket: Socket }
//!
//! impl Observable for Client {
//!     fn emitter(&self) -> &Emitter { self.socket.emitter() }
//! }
//! ```

use std::time::Duration;

use crate::emitter::{Emitter, Eventually, Subscription};
use crate::error::Result;
use crate::listener::Listener;
use crate::name::{Event, Name};

/// Something that publishes events through an [`Emitter`]
pub trait Observable {
    /// The emitter events are published through
    fn emitter(&self) -> &Emitter;

    /// See [`Emitter::on`]
    fn on<P: 'static>(&self, event: &Event<P>, listener: &Listener<P>) -> Result<Subscription> {
        self.emitter().on(event, listener)
    }

    /// See [`Emitter::off`]
    fn off<P>(&self, event: &Event<P>, listener: &Listener<P>) -> usize {
        self.emitter().off(event, listener)
    }

    /// See [`Emitter::once`]
    fn once<P: 'static>(&self, event: &Event<P>, listener: &Listener<P>) -> Result<Subscription> {
        self.emitter().once(event, listener)
    }

    /// See [`Emitter::once_if`]
    fn once_if<P, F>(&self, event: &Event<P>, predicate: F, listener: &Listener<P>) -> Result<Subscription>
    where
        P: 'static,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.emitter().once_if(event, predicate, listener)
    }

    /// See [`Emitter::emit`]
    fn emit<P: 'static>(&self, event: &Event<P>, payload: &P) -> usize {
        self.emitter().emit(event, payload)
    }

    /// See [`Emitter::eventually`]
    fn eventually<P>(&self, event: &Event<P>, timeout: Option<Duration>) -> Eventually<P>
    where
        P: Clone + Send + 'static,
    {
        self.emitter().eventually(event, timeout)
    }

    /// See [`Emitter::eventually_if`]
    fn eventually_if<P, F>(&self, event: &Event<P>, predicate: F, timeout: Option<Duration>) -> Eventually<P>
    where
        P: Clone + Send + 'static,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.emitter().eventually_if(event, predicate, timeout)
    }

    /// See [`Emitter::listener_count`]
    fn listener_count(&self, name: impl AsRef<Name>) -> usize {
        self.emitter().listener_count(name)
    }

    /// See [`Emitter::event_names`]
    fn event_names(&self) -> Vec<Name> {
        self.emitter().event_names()
    }
}

impl Observable for Emitter {
    fn emitter(&self) -> &Emitter {
        self
    }
}
