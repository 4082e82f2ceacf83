//! # emitterkit core
//!
//! Typed, synchronous, in-process event emitter.
//! Provides the listener registry and dispatch engine, one-shot and
//! future-based waits, and the cancellable delay they are built on.

pub mod config;
pub mod delay;
pub mod emitter;
pub mod error;
pub mod listener;
pub mod name;
pub mod observable;

pub use config::EmitterConfig;
pub use delay::{after, Cancel};
pub use emitter::{Emitter, Eventually, Subscription, WeakEmitter};
pub use error::{EmitterError, ErrorKind, ListenerError, Result};
pub use listener::{Listener, ListenerChange, ListenerId, ListenerResult};
pub use name::{Event, Name, Reserved, Token, ERROR, NEW_LISTENER, REMOVE_LISTENER};
pub use observable::Observable;
