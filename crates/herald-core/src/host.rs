//! Exposing an emitter's methods on a host type.
//!
//! A host embeds a [`LazyEmitter`] (or any [`Emitter`]) and implements
//! [`EmitterHost::emitter`]; every other method of the trait delegates to it.
//!
//! ```rust
//! use herald_core::{EmitterHost, LazyEmitter, Listener};
//!
//! #[derive(Default)]
//! struct Downloader {
//!     events: LazyEmitter<u64>,
//! }
//!
//! impl EmitterHost<u64> for Downloader {
//!     fn emitter(&self) -> &herald_core::Emitter<u64> {
//!         self.events.get()
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let downloader = Downloader::default();
//! downloader
//!     .on("progress", Listener::from_fn(|bytes: u64| {
//!         println!("{bytes} bytes");
//!         Ok(())
//!     }))
//!     .unwrap();
//! downloader.emit("progress", 512).await.unwrap();
//! # }
//! ```
//!
//! A host that already has an inherent method with one of these names keeps
//! its own; call the trait method with `EmitterHost::on(&host, ..)` then.

use futures::future::BoxFuture;
use std::fmt;
use std::sync::OnceLock;

use herald_config::DebugConfig;

use crate::emitter::{AnyListener, Emitter, MetaItem, MetaListener};
use crate::error::EmitResult;
use crate::listener::{Listener, ListenerChange, Unsubscribe};
use crate::name::{EventName, IntoEventNames, MetaEvent};
use crate::once::Once;
use crate::producer::EventStream;

/// A type that exposes the public methods of an emitter it owns.
pub trait EmitterHost<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// The emitter every provided method delegates to.
    fn emitter(&self) -> &Emitter<T>;

    /// See [`Emitter::on`].
    fn on(&self, names: impl IntoEventNames, listener: Listener<T>) -> EmitResult<Unsubscribe> {
        self.emitter().on(names, listener)
    }

    /// See [`Emitter::off`].
    fn off(&self, names: impl IntoEventNames, listener: &Listener<T>) {
        self.emitter().off(names, listener)
    }

    /// See [`Emitter::once`].
    fn once(&self, names: impl IntoEventNames) -> EmitResult<Once<T>> {
        self.emitter().once(names)
    }

    /// See [`Emitter::events`].
    fn events(&self, names: impl IntoEventNames) -> EmitResult<EventStream<T>> {
        self.emitter().events(names)
    }

    /// See [`Emitter::emit`].
    fn emit(&self, name: impl Into<EventName>, data: T) -> BoxFuture<'static, EmitResult<()>> {
        Box::pin(self.emitter().emit(name, data))
    }

    /// See [`Emitter::emit_serial`].
    fn emit_serial(
        &self,
        name: impl Into<EventName>,
        data: T,
    ) -> BoxFuture<'static, EmitResult<()>> {
        Box::pin(self.emitter().emit_serial(name, data))
    }

    /// See [`Emitter::on_any`].
    fn on_any(&self, listener: AnyListener<T>) -> Unsubscribe {
        self.emitter().on_any(listener)
    }

    /// See [`Emitter::off_any`].
    fn off_any(&self, listener: &AnyListener<T>) {
        self.emitter().off_any(listener)
    }

    /// See [`Emitter::any_event`].
    fn any_event(&self) -> EventStream<(EventName, T)> {
        self.emitter().any_event()
    }

    /// See [`Emitter::on_meta`].
    fn on_meta(&self, kind: MetaEvent, listener: MetaListener) -> Unsubscribe {
        self.emitter().on_meta(kind, listener)
    }

    /// See [`Emitter::once_meta`].
    fn once_meta(&self, kind: MetaEvent) -> Once<ListenerChange> {
        self.emitter().once_meta(kind)
    }

    /// See [`Emitter::meta_events`].
    fn meta_events(&self, kinds: impl IntoIterator<Item = MetaEvent>) -> EventStream<MetaItem> {
        self.emitter().meta_events(kinds)
    }

    /// See [`Emitter::clear_listeners`].
    fn clear_listeners(&self, names: impl IntoEventNames) {
        self.emitter().clear_listeners(names)
    }

    /// See [`Emitter::clear_all_listeners`].
    fn clear_all_listeners(&self) {
        self.emitter().clear_all_listeners()
    }

    /// See [`Emitter::listener_count`].
    fn listener_count(&self, names: impl IntoEventNames) -> usize {
        self.emitter().listener_count(names)
    }
}

/// An emitter slot that is built on first use.
pub struct LazyEmitter<T> {
    cell: OnceLock<Emitter<T>>,
    debug: DebugConfig,
}

impl<T> LazyEmitter<T> {
    /// Create an empty slot using default debug settings.
    pub fn new() -> Self {
        Self::with_debug(DebugConfig::default())
    }

    /// Create an empty slot whose emitter will use `debug`.
    pub fn with_debug(debug: DebugConfig) -> Self {
        Self {
            cell: OnceLock::new(),
            debug,
        }
    }

    /// Whether the emitter was built yet.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> LazyEmitter<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// The emitter, built now if this is the first access.
    pub fn get(&self) -> &Emitter<T> {
        self.cell
            .get_or_init(|| Emitter::with_debug(self.debug.clone()))
    }
}

impl<T> Default for LazyEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LazyEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEmitter")
            .field("initialized", &self.is_initialized())
            .field("debug", &self.debug)
            .finish()
    }
}
