//! # Emitter Module
//!
//! Typed publish/subscribe within one process.
//!
//! ## Overview
//!
//! - Listeners register under typed [`Event`](crate::name::Event) keys and are
//!   invoked synchronously, in registration order, by `emit`
//! - A failing listener (error return or panic) never reaches the caller of
//!   `emit`; the failure is re-emitted on the reserved `error` event, or logged
//! - Registration changes are announced on `newListener` / `removeListener`
//! - `once`, `once_if`, `eventually` and `eventually_if` build one-shot and
//!   future-based waits on top of the same registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use emitterkit_core::{Emitter, Event, Listener};
//!
//! const MESSAGE: Event<String> = Event::new("message");
//!
//! let emitter = Emitter::new();
//! let subscription = emitter.on(&MESSAGE, &Listener::new(|m: &String| {
//!     println!("got {m}");
//! }))?;
//!
//! emitter.emit(&MESSAGE, &"hello".to_string());
//!
//! // Wait for the next matching emission, with a timeout
//! let reply = emitter
//!     .eventually_if(&MESSAGE, |m| m.starts_with("did"), Some(Duration::from_secs(1)))
//!     .await?;
//!
//! subscription.off();
//! ```

mod dispatch;
mod registry;
mod wait;

pub use dispatch::*;
pub use wait::*;
