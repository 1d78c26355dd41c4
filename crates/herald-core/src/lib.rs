//! # Herald
//!
//! An in-process async event emitter for tokio applications.
//!
//! - Subscribe async or sync [`Listener`]s to [`EventName`]s with
//!   [`Emitter::on`], or to every event with [`Emitter::on_any`]
//! - Fan out concurrently with [`Emitter::emit`] or in subscription order with
//!   [`Emitter::emit_serial`]
//! - Wait for a single event with [`Emitter::once`]
//! - Consume events as a [`futures::Stream`] with [`Emitter::events`] and
//!   [`Emitter::any_event`]
//! - Observe subscription changes through the [`LISTENER_ADDED`] and
//!   [`LISTENER_REMOVED`] meta-events, with [`Emitter::on_meta`],
//!   [`Emitter::once_meta`] or [`Emitter::meta_events`]
//! - Log every operation through a configurable debug logger (see
//!   [`herald_config::DebugConfig`])
//!
//! Delivery is in-process only: there is no persistence and no transport.
//!
//! ## Example
//!
//! ```rust
//! use futures::StreamExt;
//! use herald_core::{Emitter, Listener};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), herald_core::EmitterError> {
//! let emitter: Emitter<u32> = Emitter::new();
//! let mut stream = emitter.events("tick")?;
//!
//! emitter.on("tick", Listener::new(|n: u32| async move {
//!     println!("tick {n}");
//!     Ok(())
//! }))?;
//!
//! emitter.emit("tick", 1).await?;
//! assert_eq!(stream.next().await, Some(1));
//! # Ok(())
//! # }
//! ```

pub mod emitter;
pub mod error;
pub mod host;
pub mod listener;
pub mod name;
pub mod once;
pub mod producer;

pub use emitter::{AnyListener, Emitter, MetaItem, MetaListener};
pub use error::{EmitResult, EmitterError};
pub use host::{EmitterHost, LazyEmitter};
pub use listener::{Listener, ListenerChange, ListenerId, Unsubscribe};
pub use name::{EventName, IntoEventNames, MetaEvent, Symbol, LISTENER_ADDED, LISTENER_REMOVED};
pub use once::Once;
pub use producer::EventStream;

pub use herald_config::{DebugConfig, DebugKind, DebugRecord, HeraldConfig};
