//! # Herald Configuration Library
//!
//! Configuration for the Herald event emitter: per-emitter debug settings,
//! the process-wide debug switch, and loading both from TOML or JSON.
//!
//! ## Features
//!
//! - `DebugConfig` with a pluggable logger (defaults to `tracing`)
//! - Set-once global debug toggle, seeded from the `DEBUG` environment variable
//! - `HeraldConfig` loading from TOML (`toml` feature) and JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use herald_config::{DebugConfig, HeraldConfig};
//!
//! let config = HeraldConfig::from_json_str(r#"{ "debug": { "name": "ui", "enabled": true } }"#)
//!     .expect("valid config");
//! assert_eq!(config.debug.name, "ui");
//!
//! let debug = DebugConfig::new("worker").with_enabled(true);
//! assert!(debug.should_log());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod debug;
mod global;
mod loader;

pub use debug::*;
pub use global::*;
pub use loader::*;
