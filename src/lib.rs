//! # emitterkit
//!
//! A typed, synchronous, in-process event emitter:
//! - Listeners keyed by typed event names, invoked in registration order
//! - `newListener` / `removeListener` meta events and an `error` event for
//!   listener failures
//! - One-shot and predicate-gated listeners
//! - Futures that resolve on the next matching emission, with timeouts
//! - A cancellable delay for scheduling work on the Tokio runtime
//!
//! ## Architecture
//!
//! 1. **emitterkit-core** - Registry, dispatch, waits, delays, errors, config
//! 2. **emitterkit-adapters** - Batch registration, conventional method names
//! 3. **emitterkit** - Re-exports both and sets up logging
//!
//! ```rust,ignore
//! use emitterkit::*;
//!
//! events! {
//!     MESSAGE: String = "message";
//! }
//!
//! let emitter = Emitter::new();
//! emitter.on(&MESSAGE, &Listener::new(|m: &String| println!("{m}")))?;
//! emitter.emit(&MESSAGE, &"hello".to_string());
//! ```

pub use emitterkit_adapters::{listen, EventEmitterCompat, ListenerMap, Unlisten};
pub use emitterkit_core::config;
pub use emitterkit_core::{
    after, events, Cancel, Emitter, EmitterConfig, EmitterError, ErrorKind, Event, Eventually,
    Listener, ListenerChange, ListenerError, ListenerId, ListenerResult, Name, Observable,
    Reserved, Result, Subscription, Token, WeakEmitter, ERROR, NEW_LISTENER, REMOVE_LISTENER,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, `info` otherwise
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(tracing::Level::INFO.into()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
