//! Per-emitter debug logging configuration.
//!
//! An emitter logs a [`DebugRecord`] for every subscription change, emission
//! and clear when either its own [`DebugConfig::enabled`] flag or the global
//! switch (see [`is_global_debug_enabled`](crate::is_global_debug_enabled)) is on.
//!
//! Logging is a side channel. A logger that panics is reported and otherwise
//! ignored so that delivery is never affected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::global::is_global_debug_enabled;

/// Default label used when an emitter is not given a name.
pub const DEFAULT_EMITTER_NAME: &str = "herald";

/// Operation that produced a debug record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugKind {
    /// A listener was added for an event name
    Subscribe,
    /// A listener was removed from an event name
    Unsubscribe,
    /// An any-listener was added
    SubscribeAny,
    /// An any-listener was removed
    UnsubscribeAny,
    /// Concurrent emission
    Emit,
    /// Serial emission
    EmitSerial,
    /// Listeners were cleared
    Clear,
}

impl DebugKind {
    /// Stable label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::SubscribeAny => "subscribeAny",
            Self::UnsubscribeAny => "unsubscribeAny",
            Self::Emit => "emit",
            Self::EmitSerial => "emitSerial",
            Self::Clear => "clear",
        }
    }
}

impl fmt::Display for DebugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single debug log entry handed to a [`Logger`].
///
/// Event names and payloads are borrowed as trait objects so that this crate
/// stays independent of the emitter's types.
#[derive(Clone, Copy)]
pub struct DebugRecord<'a> {
    /// Operation that produced the record
    pub kind: DebugKind,
    /// Label of the emitter (`DebugConfig::name`)
    pub emitter_name: &'a str,
    /// Event name, absent for any-listener changes and global clears
    pub event_name: Option<&'a dyn fmt::Display>,
    /// Event payload, present for emissions only
    pub data: Option<&'a dyn fmt::Debug>,
}

impl fmt::Debug for DebugRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugRecord")
            .field("kind", &self.kind)
            .field("emitter_name", &self.emitter_name)
            .field("event_name", &self.event_name.map(|n| n.to_string()))
            .field("data", &self.data.map(|d| format!("{d:?}")))
            .finish()
    }
}

impl fmt::Display for DebugRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[herald:{}][{}] Event Name: ", self.kind, self.emitter_name)?;
        match self.event_name {
            Some(name) => write!(f, "{name}")?,
            None => f.write_str("<none>")?,
        }
        if let Some(data) = self.data {
            write!(f, "\n\tdata: {data:?}")?;
        }
        Ok(())
    }
}

/// Log sink receiving debug records.
pub type Logger = Arc<dyn Fn(&DebugRecord<'_>) + Send + Sync>;

/// Logger used when none is configured: a `tracing` debug event on the
/// `herald` target.
pub fn default_logger() -> Logger {
    Arc::new(log_with_tracing)
}

fn log_with_tracing(record: &DebugRecord<'_>) {
    let event = record
        .event_name
        .map(|name| name.to_string())
        .unwrap_or_default();
    let data = record.data.map(|data| format!("{data:?}")).unwrap_or_default();

    tracing::debug!(
        target: "herald",
        kind = %record.kind,
        emitter = %record.emitter_name,
        event = %event,
        data = %data,
        "emitter debug"
    );
}

/// Debug settings for one emitter instance.
///
/// `name` and `enabled` are loadable with serde; the logger is code-only.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Label printed with every record
    pub name: String,

    /// Force logging for this instance regardless of the global switch
    pub enabled: bool,

    /// Custom log sink; `None` uses [`default_logger`]
    #[serde(skip)]
    pub logger: Option<Logger>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_EMITTER_NAME.to_string(),
            enabled: false,
            logger: None,
        }
    }
}

impl fmt::Debug for DebugConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugConfig")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field(
                "logger",
                &if self.logger.is_some() {
                    "custom"
                } else {
                    "default"
                },
            )
            .finish()
    }
}

impl DebugConfig {
    /// Create a config with the given label and logging off.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Force logging on or off for this instance.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Use a custom log sink.
    pub fn with_logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(&DebugRecord<'_>) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Whether records should be produced at all.
    pub fn should_log(&self) -> bool {
        self.enabled || is_global_debug_enabled()
    }

    /// Hand a record to the configured logger if logging is on.
    ///
    /// A panicking logger is caught and reported at `warn` level.
    pub fn log(&self, record: &DebugRecord<'_>) {
        if !self.should_log() {
            return;
        }

        let outcome = match &self.logger {
            Some(logger) => panic::catch_unwind(AssertUnwindSafe(|| logger(record))),
            None => {
                log_with_tracing(record);
                Ok(())
            }
        };

        if outcome.is_err() {
            tracing::warn!(
                emitter = %self.name,
                kind = %record.kind,
                "Debug logger panicked; record dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_kind_labels() {
        assert_eq!(DebugKind::Subscribe.as_str(), "subscribe");
        assert_eq!(DebugKind::SubscribeAny.to_string(), "subscribeAny");
        assert_eq!(DebugKind::EmitSerial.to_string(), "emitSerial");
    }

    #[test]
    fn test_record_display() {
        let name = "ready";
        let data = 42;
        let record = DebugRecord {
            kind: DebugKind::Emit,
            emitter_name: "ui",
            event_name: Some(&name),
            data: Some(&data),
        };
        assert_eq!(
            record.to_string(),
            "[herald:emit][ui] Event Name: ready\n\tdata: 42"
        );

        let record = DebugRecord {
            kind: DebugKind::Clear,
            emitter_name: "ui",
            event_name: None,
            data: None,
        };
        assert_eq!(record.to_string(), "[herald:clear][ui] Event Name: <none>");
    }

    #[test]
    fn test_enabled_config_calls_custom_logger() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = DebugConfig::new("worker")
            .with_enabled(true)
            .with_logger(move |record| {
                sink.lock().unwrap().push(record.to_string());
            });

        let name = "job";
        config.log(&DebugRecord {
            kind: DebugKind::Subscribe,
            emitter_name: &config.name,
            event_name: Some(&name),
            data: None,
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], "[herald:subscribe][worker] Event Name: job");
    }

    #[test]
    fn test_panicking_logger_is_contained() {
        let config = DebugConfig::new("boom")
            .with_enabled(true)
            .with_logger(|_| panic!("logger failure"));

        config.log(&DebugRecord {
            kind: DebugKind::Emit,
            emitter_name: "boom",
            event_name: None,
            data: None,
        });
    }

    #[test]
    fn test_debug_impl_hides_logger() {
        let config = DebugConfig::new("x").with_logger(|_| {});
        let rendered = format!("{config:?}");
        assert!(rendered.contains("custom"));
        assert!(format!("{:?}", DebugConfig::default()).contains("default"));
    }
}
