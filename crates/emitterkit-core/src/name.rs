//! Event names and typed event keys.
//!
//! Reserved names live in the same map as user names; the [`Name`] sum type
//! keeps them apart, so `Name::from("error")` never collides with [`ERROR`].

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ListenerError;
use crate::listener::ListenerChange;

/// Names the emitter itself emits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reserved {
    /// A listener was registered.
    NewListener,
    /// A listener was removed.
    RemoveListener,
    /// A listener failed during dispatch.
    Error,
}

impl Reserved {
    /// Conventional spelling of the reserved name
    pub fn as_str(&self) -> &'static str {
        match self {
            Reserved::NewListener => "newListener",
            Reserved::RemoveListener => "removeListener",
            Reserved::Error => "error",
        }
    }
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque, unique event name. Every call to [`Token::new`] yields a name that
/// equals only itself and its copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    id: u64,
    description: &'static str,
}

impl Token {
    /// Create a fresh token with a description used in diagnostics
    pub fn new(description: &'static str) -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    /// Description given at creation
    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// An event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Name {
    /// Emitted by the emitter itself.
    Reserved(Reserved),
    /// Plain textual name.
    Text(Cow<'static, str>),
    /// Numeric name.
    Number(i64),
    /// Unique opaque name.
    Token(Token),
}

impl Name {
    /// Check if this is one of the emitter's own names
    pub fn is_reserved(&self) -> bool {
        matches!(self, Name::Reserved(_))
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Name::Reserved(reserved) => f.write_str(reserved.as_str()),
            Name::Text(text) => f.write_str(text),
            Name::Number(n) => write!(f, "{}", n),
            Name::Token(token) => write!(f, "Token({})", token.description),
        }
    }
}

impl From<&'static str> for Name {
    fn from(name: &'static str) -> Self {
        Name::Text(Cow::Borrowed(name))
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Name::Text(Cow::Owned(name))
    }
}

impl From<i64> for Name {
    fn from(n: i64) -> Self {
        Name::Number(n)
    }
}

impl From<Token> for Name {
    fn from(token: Token) -> Self {
        Name::Token(token)
    }
}

impl From<Reserved> for Name {
    fn from(reserved: Reserved) -> Self {
        Name::Reserved(reserved)
    }
}

impl AsRef<Name> for Name {
    fn as_ref(&self) -> &Name {
        self
    }
}

/// Typed event key: a [`Name`] bound to the payload type `P` its listeners
/// receive.
///
/// ```rust,ignore
/// const MESSAGE: Event<String> = Event::new("message");
/// emitter.emit(&MESSAGE, &"hello".to_string());
/// ```
pub struct Event<P> {
    name: Name,
    _payload: PhantomData<fn(&P)>,
}

impl<P> Event<P> {
    /// Key with a static textual name, usable in `const` items
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Name::Text(Cow::Borrowed(name)),
            _payload: PhantomData,
        }
    }

    /// Key for any name
    pub fn named(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            _payload: PhantomData,
        }
    }

    const fn reserved(reserved: Reserved) -> Self {
        Self {
            name: Name::Reserved(reserved),
            _payload: PhantomData,
        }
    }

    /// The untyped name
    pub fn name(&self) -> &Name {
        &self.name
    }
}

impl<P> Clone for Event<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _payload: PhantomData,
        }
    }
}

impl<P> std::fmt::Debug for Event<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("payload", &std::any::type_name::<P>())
            .finish()
    }
}

impl<P> AsRef<Name> for Event<P> {
    fn as_ref(&self) -> &Name {
        &self.name
    }
}

/// Emitted after a listener is registered.
pub const NEW_LISTENER: Event<ListenerChange> = Event::reserved(Reserved::NewListener);

/// Emitted after a listener is removed.
pub const REMOVE_LISTENER: Event<ListenerChange> = Event::reserved(Reserved::RemoveListener);

/// Emitted when a listener fails while handling another event.
pub const ERROR: Event<ListenerError> = Event::reserved(Reserved::Error);

/// Declare a group of typed event keys
///
/// ```rust,ignore
/// events! {
///     pub MESSAGE: String = "message";
///     pub CLOSE: (u16, String) = "close";
/// }
/// ```
#[macro_export]
macro_rules! events {
    ($($vis:vis $key:ident : $payload:ty = $name:literal;)+) => {
        $(
            $vis const $key: $crate::name::Event<$payload> = $crate::name::Event::new($name);
        )+
    };
}
