//! Emitter error types

use thiserror::Error;

use crate::name::EventName;

/// Emitter operation errors
#[derive(Debug, Error)]
pub enum EmitterError {
    /// A reserved meta-event name was used where only user events are allowed
    #[error("`{0}` is a reserved meta event and cannot be used here directly")]
    ReservedEventName(EventName),

    /// A listener failed while an emission was being awaited
    #[error("Listener failed: {0}")]
    Listener(#[source] anyhow::Error),
}

/// Specialized Result type for emitter operations
pub type EmitResult<T> = Result<T, EmitterError>;

impl EmitterError {
    /// Create a reserved-name error
    pub fn reserved(name: EventName) -> Self {
        Self::ReservedEventName(name)
    }

    /// Wrap a listener failure
    pub fn listener(error: anyhow::Error) -> Self {
        Self::Listener(error)
    }

    /// Check if this error is a caller contract violation
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ReservedEventName(_))
    }

    /// The listener failure, if this error wraps one
    pub fn listener_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Listener(error) => Some(error),
            _ => None,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::ReservedEventName(_) => "reserved_event_name",
            Self::Listener(_) => "listener",
        }
    }
}
