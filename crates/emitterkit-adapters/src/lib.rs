//! # emitterkit adapters
//!
//! Glue on top of the core emitter:
//! - [`listen`]: register a batch of named handlers, remove them all at once
//! - [`EventEmitterCompat`]: conventional emitter method names for code
//!   written against that shape
//!
//! Both only use the core's `on`, `off`, `emit` and `listener_count`.

pub mod compat;
pub mod listen;

pub use compat::EventEmitterCompat;
pub use listen::{listen, ListenerMap, Unlisten};
