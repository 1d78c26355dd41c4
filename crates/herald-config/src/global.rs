//! Process-wide debug switch.
//!
//! The switch is set once: either explicitly at process start with
//! [`init_global_debug`], or lazily from the `DEBUG` environment variable on
//! first read. It is read-only afterwards.

use std::sync::OnceLock;

/// Environment variable inspected when the switch was not set explicitly.
pub const DEBUG_ENV_VAR: &str = "DEBUG";

static GLOBAL_DEBUG: OnceLock<bool> = OnceLock::new();

/// Set the global debug switch.
///
/// Returns `false` if the switch was already initialised (explicitly or by an
/// earlier read); the existing value is kept in that case.
pub fn init_global_debug(enabled: bool) -> bool {
    let accepted = GLOBAL_DEBUG.set(enabled).is_ok();
    if !accepted {
        tracing::debug!(
            requested = enabled,
            "Global debug switch already initialised; ignoring"
        );
    }
    accepted
}

/// Whether debug logging is enabled for every emitter in the process.
pub fn is_global_debug_enabled() -> bool {
    *GLOBAL_DEBUG
        .get_or_init(|| debug_enabled_from_value(std::env::var(DEBUG_ENV_VAR).ok().as_deref()))
}

/// Interpret a `DEBUG` value: `herald`, `*`, or a comma list containing either.
pub fn debug_enabled_from_value(value: Option<&str>) -> bool {
    value
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .any(|part| part == "herald" || part == "*")
        })
        .unwrap_or(false)
}
