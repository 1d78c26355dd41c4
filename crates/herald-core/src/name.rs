//! Event names and the reserved meta-event identities.
//!
//! An [`EventName`] is a closed tagged identifier: a string, an integer, or an
//! opaque [`Symbol`]. Equality and hashing are well defined for every variant,
//! so names can key hash maps directly.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Symbol ids below this value are reserved for the crate's own identities.
const FIRST_USER_SYMBOL: u64 = 16;

static SYMBOL_COUNTER: AtomicU64 = AtomicU64::new(FIRST_USER_SYMBOL);

/// An opaque, unique event identity.
///
/// Two symbols are equal only if one is a clone of the other; the description
/// is used for display and never for comparison.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Cow<'static, str>,
}

impl Symbol {
    /// Create a new symbol, distinct from every other symbol in the process.
    pub fn new(description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: SYMBOL_COUNTER.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }
    }

    const fn reserved(id: u64, description: &'static str) -> Self {
        Self {
            id,
            description: Cow::Borrowed(description),
        }
    }

    /// Human-readable description given at construction.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.description, self.id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Identifier of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A string name
    Name(Arc<str>),
    /// A numeric name
    Number(i64),
    /// A unique symbol
    Symbol(Symbol),
}

/// Meta-event emitted after a listener is added.
pub const LISTENER_ADDED: EventName = EventName::Symbol(Symbol::reserved(1, "listenerAdded"));

/// Meta-event emitted after a listener is removed.
pub const LISTENER_REMOVED: EventName =
    EventName::Symbol(Symbol::reserved(2, "listenerRemoved"));

impl EventName {
    /// The meta-event this name denotes, if it is one of the reserved names.
    pub fn meta(&self) -> Option<MetaEvent> {
        match self {
            Self::Symbol(symbol) if symbol.id == 1 => Some(MetaEvent::ListenerAdded),
            Self::Symbol(symbol) if symbol.id == 2 => Some(MetaEvent::ListenerRemoved),
            _ => None,
        }
    }

    /// Whether this is one of the reserved meta-event names.
    pub fn is_meta(&self) -> bool {
        self.meta().is_some()
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Number(number) => write!(f, "{number}"),
            Self::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self::Name(Arc::from(name))
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self::Name(Arc::from(name))
    }
}

impl From<Arc<str>> for EventName {
    fn from(name: Arc<str>) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for EventName {
    fn from(number: i64) -> Self {
        Self::Number(number)
    }
}

impl From<i32> for EventName {
    fn from(number: i32) -> Self {
        Self::Number(i64::from(number))
    }
}

impl From<u32> for EventName {
    fn from(number: u32) -> Self {
        Self::Number(i64::from(number))
    }
}

impl From<Symbol> for EventName {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<&Symbol> for EventName {
    fn from(symbol: &Symbol) -> Self {
        Self::Symbol(symbol.clone())
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}

impl From<MetaEvent> for EventName {
    fn from(meta: MetaEvent) -> Self {
        meta.event_name()
    }
}

/// Typed view of the two reserved meta-events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaEvent {
    /// See [`LISTENER_ADDED`]
    ListenerAdded,
    /// See [`LISTENER_REMOVED`]
    ListenerRemoved,
}

impl MetaEvent {
    /// The reserved event name for this meta-event.
    pub fn event_name(self) -> EventName {
        match self {
            Self::ListenerAdded => LISTENER_ADDED,
            Self::ListenerRemoved => LISTENER_REMOVED,
        }
    }
}

/// Conversion into the list of names an operation applies to.
///
/// Implemented for single names (`&str`, `String`, integers, symbols,
/// `EventName`) and for arrays, slices and vectors of them.
pub trait IntoEventNames {
    /// The names, in the order given.
    fn into_event_names(self) -> Vec<EventName>;
}

macro_rules! single_event_name {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoEventNames for $ty {
                fn into_event_names(self) -> Vec<EventName> {
                    vec![EventName::from(self)]
                }
            }
        )*
    };
}

single_event_name!(
    EventName,
    &EventName,
    &str,
    String,
    Arc<str>,
    i64,
    i32,
    u32,
    Symbol,
    &Symbol,
    MetaEvent,
);

impl<E: Into<EventName>> IntoEventNames for Vec<E> {
    fn into_event_names(self) -> Vec<EventName> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<E: Into<EventName>, const N: usize> IntoEventNames for [E; N] {
    fn into_event_names(self) -> Vec<EventName> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<E: Into<EventName> + Clone> IntoEventNames for &[E] {
    fn into_event_names(self) -> Vec<EventName> {
        self.iter().cloned().map(Into::into).collect()
    }
}
