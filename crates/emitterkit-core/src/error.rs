//! Error handling for emitterkit
//!
//! Two families of errors exist:
//! - [`EmitterError`]: returned to callers of the emitter (registration
//!   failures, timed-out waits)
//! - [`ListenerError`]: a failure raised *inside* a listener during dispatch.
//!   It never reaches the caller of `emit`; it is delivered as the payload of
//!   the reserved `error` event instead.
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::listener::ListenerId;
use crate::name::Name;

/// Machine-checkable tag for an [`EmitterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Listener identity already registered for the event.
    Duplicate,
    /// Payload type differs from the one the event's listeners expect.
    PayloadMismatch,
    /// A wait elapsed without a matching emission.
    Timeout,
    /// A wait lost its completion side without an outcome.
    Abandoned,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::PayloadMismatch => "payload_mismatch",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Abandoned => "abandoned",
        };
        f.write_str(tag)
    }
}

/// Emitter error type
///
/// Returned synchronously from registration calls and as the error value of
/// [`Eventually`](crate::emitter::Eventually) futures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitterError {
    /// The listener is already registered for this event
    #[error("Listener {listener} is already registered for event {name}")]
    DuplicateListener {
        /// The event the listener was registered under.
        name: Name,
        /// The listener identity.
        listener: ListenerId,
    },

    /// The event already carries listeners of another payload type
    #[error("Event {name} carries {expected} payloads, not {found}")]
    PayloadMismatch {
        /// The event name.
        name: Name,
        /// Payload type of the live listener set.
        expected: &'static str,
        /// Payload type of the rejected listener.
        found: &'static str,
    },

    /// No matching emission within the allotted time
    #[error("Timeout of {}ms reached while waiting for event {name}", timeout.as_millis())]
    Timeout {
        /// The awaited event.
        name: Name,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The wait was dropped by the runtime before it settled
    #[error("Wait for event {name} was abandoned before it settled")]
    Abandoned {
        /// The awaited event.
        name: Name,
    },
}

impl EmitterError {
    /// Machine-checkable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EmitterError::DuplicateListener { .. } => ErrorKind::Duplicate,
            EmitterError::PayloadMismatch { .. } => ErrorKind::PayloadMismatch,
            EmitterError::Timeout { .. } => ErrorKind::Timeout,
            EmitterError::Abandoned { .. } => ErrorKind::Abandoned,
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// The event this error refers to
    pub fn name(&self) -> &Name {
        match self {
            EmitterError::DuplicateListener { name, .. }
            | EmitterError::PayloadMismatch { name, .. }
            | EmitterError::Timeout { name, .. }
            | EmitterError::Abandoned { name } => name,
        }
    }
}

/// Failure of a single listener during dispatch.
///
/// This is the payload of the reserved [`ERROR`](crate::name::ERROR) event.
#[derive(Error, Debug, Clone)]
pub enum ListenerError {
    /// The listener returned an error
    #[error("Listener {listener} for event {name} failed: {error:#}")]
    Failed {
        /// The event being dispatched.
        name: Name,
        /// The failing listener.
        listener: ListenerId,
        /// The returned error.
        error: Arc<anyhow::Error>,
    },

    /// The listener panicked
    #[error("Listener {listener} for event {name} panicked: {message}")]
    Panicked {
        /// The event being dispatched.
        name: Name,
        /// The failing listener.
        listener: ListenerId,
        /// The panic message, when it was a string.
        message: String,
    },
}

impl ListenerError {
    /// The event being dispatched when the listener failed
    pub fn name(&self) -> &Name {
        match self {
            ListenerError::Failed { name, .. } | ListenerError::Panicked { name, .. } => name,
        }
    }

    /// The listener that failed
    pub fn listener(&self) -> ListenerId {
        match self {
            ListenerError::Failed { listener, .. } | ListenerError::Panicked { listener, .. } => {
                *listener
            }
        }
    }

    /// Build from a caught panic payload
    pub(crate) fn from_panic(
        name: Name,
        listener: ListenerId,
        payload: Box<dyn std::any::Any + Send>,
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        ListenerError::Panicked {
            name,
            listener,
            message,
        }
    }
}

/// Result type using EmitterError
pub type Result<T> = std::result::Result<T, EmitterError>;
