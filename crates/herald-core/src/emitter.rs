//! The event emitter.
//!
//! # Delivery
//!
//! Both emission methods snapshot the listener sets when they are called and
//! then yield once before the first listener runs, so no listener ever runs
//! on the caller's synchronous turn. At its turn each listener is checked
//! against the live set again; one removed in the meantime is skipped.
//!
//! - [`Emitter::emit`] starts every listener before awaiting any of them and
//!   fails fast on the first listener error.
//! - [`Emitter::emit_serial`] runs named listeners in subscription order, then
//!   any-listeners, each to completion, and stops at the first error.
//!
//! # Meta-events
//!
//! Adding or removing a listener emits [`MetaEvent::ListenerAdded`] or
//! [`MetaEvent::ListenerRemoved`]. Meta-events carry a [`ListenerChange`]
//! rather than `T`, so they are observed through the typed
//! [`Emitter::on_meta`], [`Emitter::once_meta`] and [`Emitter::meta_events`];
//! subscribing through these never emits a meta-event itself. Meta names can
//! never be emitted through the public methods.
//!
//! Subscription methods are synchronous, so meta listeners run on a single
//! per-emitter tokio task fed by an ordered queue: meta-events reach their
//! listeners in the order the subscription calls were made. Meta sessions are
//! fed synchronously and need no runtime.
//!
//! # Locking
//!
//! State sits behind one mutex per emitter. It is never held across an await,
//! while a listener or logger runs, or while removed listeners are dropped.

use futures::future::{join_all, try_join_all, BoxFuture};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot};

use herald_config::{DebugConfig, DebugKind, DebugRecord, HeraldConfig};

use crate::error::{EmitResult, EmitterError};
use crate::listener::{Listener, ListenerChange, ListenerId, Unsubscribe};
use crate::name::{EventName, IntoEventNames, MetaEvent};
use crate::once::{Once, OnceSlot};
use crate::producer::{EventStream, Producer, ProducerId};

/// Listener invoked for every user event, with the event's name.
pub type AnyListener<T> = Listener<(EventName, T)>;

/// Listener for the meta-events.
pub type MetaListener = Listener<ListenerChange>;

/// Item yielded by [`Emitter::meta_events`] sessions.
pub type MetaItem = (MetaEvent, ListenerChange);

/// One queued meta-event with the listeners snapshotted for it.
struct MetaDelivery {
    kind: MetaEvent,
    change: ListenerChange,
    listeners: Vec<MetaListener>,
}

struct State<T> {
    listeners: HashMap<EventName, Vec<Listener<T>>>,
    any_listeners: Vec<AnyListener<T>>,
    meta_listeners: HashMap<MetaEvent, Vec<MetaListener>>,
    producers: HashMap<EventName, Vec<Producer<T>>>,
    any_producers: Vec<Producer<(EventName, T)>>,
    meta_producers: HashMap<MetaEvent, Vec<Producer<MetaItem>>>,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
            any_listeners: Vec::new(),
            meta_listeners: HashMap::new(),
            producers: HashMap::new(),
            any_producers: Vec::new(),
            meta_producers: HashMap::new(),
        }
    }
}

impl<T: Clone> State<T> {
    fn enqueue(&self, name: &EventName, data: &T) {
        if let Some(producers) = self.producers.get(name) {
            for producer in producers {
                producer.enqueue(data.clone());
            }
        }
        for producer in &self.any_producers {
            producer.enqueue((name.clone(), data.clone()));
        }
    }

    fn has_listener(&self, name: &EventName, id: ListenerId) -> bool {
        self.listeners
            .get(name)
            .is_some_and(|set| set.iter().any(|listener| listener.id() == id))
    }

    fn has_any_listener(&self, id: ListenerId) -> bool {
        self.any_listeners.iter().any(|listener| listener.id() == id)
    }

    fn has_meta_listener(&self, kind: MetaEvent, id: ListenerId) -> bool {
        self.meta_listeners
            .get(&kind)
            .is_some_and(|set| set.iter().any(|listener| listener.id() == id))
    }
}

/// Unregister the given producers from every slot they occupy.
fn finish_producers<K, I>(
    slots: &mut HashMap<K, Vec<Producer<I>>>,
    ids: &[ProducerId],
) -> Vec<Producer<I>> {
    let mut finished = Vec::new();
    slots.retain(|_, set| {
        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(set)
            .into_iter()
            .partition(|producer| ids.contains(&producer.id()));
        finished.extend(gone);
        *set = kept;
        !set.is_empty()
    });
    finished
}

fn producer_ids<K, I>(slots: &HashMap<K, Vec<Producer<I>>>, key: &K) -> Vec<ProducerId>
where
    K: Eq + std::hash::Hash,
{
    slots
        .get(key)
        .map(|set| set.iter().map(Producer::id).collect())
        .unwrap_or_default()
}

fn add_to_set<A>(set: &mut Vec<Listener<A>>, listener: &Listener<A>) -> bool {
    if set.contains(listener) {
        return false;
    }
    set.push(listener.clone());
    true
}

fn remove_from_set<A>(set: &mut Vec<Listener<A>>, id: ListenerId) -> Option<Listener<A>> {
    let index = set.iter().position(|listener| listener.id() == id)?;
    Some(set.remove(index))
}

struct Inner<T> {
    state: Mutex<State<T>>,
    // Taken before `state` whenever both are held.
    meta_queue: Mutex<Option<mpsc::UnboundedSender<MetaDelivery>>>,
    debug: DebugConfig,
}

impl<T> Inner<T> {
    fn log(
        &self,
        kind: DebugKind,
        event_name: Option<&EventName>,
        data: Option<&dyn fmt::Debug>,
    ) {
        if !self.debug.should_log() {
            return;
        }
        self.debug.log(&DebugRecord {
            kind,
            emitter_name: &self.debug.name,
            event_name: event_name.map(|name| name as &dyn fmt::Display),
            data,
        });
    }
}

/// Listener sets captured when an emission is requested.
struct Snapshot<T> {
    name: EventName,
    data: T,
    listeners: Vec<Listener<T>>,
    any_listeners: Vec<AnyListener<T>>,
}

/// An in-process async event emitter.
///
/// Cloning is cheap and yields another handle to the same emitter. `T` is the
/// payload type; every listener receives its own clone of it.
///
/// # Example
///
/// ```rust
/// use herald_core::{Emitter, Listener};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let emitter: Emitter<String> = Emitter::new();
///
/// let greet = Listener::from_fn(|name: String| {
///     println!("hello {name}");
///     Ok(())
/// });
/// let subscription = emitter.on("greet", greet)?;
///
/// emitter.emit("greet", "world".to_string()).await?;
/// subscription.unsubscribe();
/// assert_eq!(emitter.listener_count("greet"), 0);
/// # Ok(())
/// # }
/// ```
pub struct Emitter<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("name", &self.inner.debug.name)
            .finish_non_exhaustive()
    }
}

impl<T> Default for Emitter<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Emitter<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Create an emitter with default debug settings.
    pub fn new() -> Self {
        Self::with_debug(DebugConfig::default())
    }

    /// Create an emitter with the given debug settings.
    pub fn with_debug(debug: DebugConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                meta_queue: Mutex::new(None),
                debug,
            }),
        }
    }

    /// Create an emitter from a loaded configuration.
    pub fn from_config(config: &HeraldConfig) -> Self {
        Self::with_debug(config.debug.clone())
    }

    /// The debug settings this emitter was built with.
    pub fn debug_config(&self) -> &DebugConfig {
        &self.inner.debug
    }

    fn from_weak(weak: &Weak<Inner<T>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // ------------------------------------------------------------------
    // Subscription
    // ------------------------------------------------------------------

    /// Subscribe `listener` to each of `names`.
    ///
    /// Names are processed in order. A meta-event name fails the call with
    /// [`EmitterError::ReservedEventName`]; names before it stay subscribed.
    /// Use [`on_meta`](Self::on_meta) to listen to meta-events.
    /// The returned handle is equivalent to calling [`off`](Self::off) with the
    /// same names and listener.
    pub fn on(
        &self,
        names: impl IntoEventNames,
        listener: Listener<T>,
    ) -> EmitResult<Unsubscribe> {
        let names = names.into_event_names();

        for name in &names {
            if name.is_meta() {
                return Err(EmitterError::reserved(name.clone()));
            }

            let added = {
                let mut state = self.inner.state.lock();
                add_to_set(state.listeners.entry(name.clone()).or_default(), &listener)
            };

            self.inner.log(DebugKind::Subscribe, Some(name), None);
            if added {
                self.emit_meta(
                    MetaEvent::ListenerAdded,
                    ListenerChange {
                        event_name: Some(name.clone()),
                        listener: listener.id(),
                    },
                );
            }
        }

        let weak = Arc::downgrade(&self.inner);
        let id = listener.id();
        Ok(Unsubscribe::new(move || {
            if let Some(emitter) = Self::from_weak(&weak) {
                emitter.off_id(&names, id);
            }
        }))
    }

    /// Remove `listener` from each of `names`. Absent listeners are ignored.
    pub fn off(&self, names: impl IntoEventNames, listener: &Listener<T>) {
        self.off_id(&names.into_event_names(), listener.id());
    }

    fn off_id(&self, names: &[EventName], id: ListenerId) {
        for name in names {
            let removed = {
                let mut state = self.inner.state.lock();
                match state.listeners.get_mut(name) {
                    Some(set) => {
                        let removed = remove_from_set(set, id);
                        if set.is_empty() {
                            state.listeners.remove(name);
                        }
                        removed
                    }
                    None => None,
                }
            };

            self.inner.log(DebugKind::Unsubscribe, Some(name), None);
            if removed.is_some() {
                self.emit_meta(
                    MetaEvent::ListenerRemoved,
                    ListenerChange {
                        event_name: Some(name.clone()),
                        listener: id,
                    },
                );
            }
        }
    }

    /// Wait for the first payload emitted to any of `names`.
    ///
    /// The internal listener removes itself after the first payload. Meta
    /// names are rejected before anything is subscribed; see
    /// [`once_meta`](Self::once_meta).
    pub fn once(&self, names: impl IntoEventNames) -> EmitResult<Once<T>> {
        let names = names.into_event_names();
        if let Some(name) = names.iter().find(|name| name.is_meta()) {
            return Err(EmitterError::reserved(name.clone()));
        }

        let (sender, receiver) = oneshot::channel();
        let slot: OnceSlot<T> = Arc::new(Mutex::new(Some(sender)));

        let id = ListenerId::next();
        let weak = Arc::downgrade(&self.inner);
        let own_names = names.clone();
        let listener_slot = Arc::clone(&slot);
        let listener = Listener::with_id(id, move |data: T| {
            let sender = listener_slot.lock().take();
            if let Some(sender) = sender {
                if let Some(emitter) = Self::from_weak(&weak) {
                    emitter.off_id(&own_names, id);
                }
                // The receiver may be gone already; nothing to report then.
                let _ = sender.send(data);
            }
            futures::future::ready(Ok(()))
        });

        let unsubscribe = self.on(names, listener)?;
        Ok(Once::new(receiver, &slot, unsubscribe))
    }

    /// Subscribe a listener to every user event.
    pub fn on_any(&self, listener: AnyListener<T>) -> Unsubscribe {
        let added = add_to_set(&mut self.inner.state.lock().any_listeners, &listener);

        self.inner.log(DebugKind::SubscribeAny, None, None);
        if added {
            self.emit_meta(
                MetaEvent::ListenerAdded,
                ListenerChange {
                    event_name: None,
                    listener: listener.id(),
                },
            );
        }

        let weak = Arc::downgrade(&self.inner);
        let id = listener.id();
        Unsubscribe::new(move || {
            if let Some(emitter) = Self::from_weak(&weak) {
                emitter.off_any_id(id);
            }
        })
    }

    /// Remove an any-listener. Absent listeners are ignored.
    pub fn off_any(&self, listener: &AnyListener<T>) {
        self.off_any_id(listener.id());
    }

    fn off_any_id(&self, id: ListenerId) {
        let removed = remove_from_set(&mut self.inner.state.lock().any_listeners, id);

        self.inner.log(DebugKind::UnsubscribeAny, None, None);
        if removed.is_some() {
            self.emit_meta(
                MetaEvent::ListenerRemoved,
                ListenerChange {
                    event_name: None,
                    listener: id,
                },
            );
        }
    }

    /// Subscribe to one of the meta-events.
    ///
    /// Meta subscriptions do not themselves produce meta-events.
    pub fn on_meta(&self, kind: MetaEvent, listener: MetaListener) -> Unsubscribe {
        let name = kind.event_name();
        add_to_set(
            self.inner.state.lock().meta_listeners.entry(kind).or_default(),
            &listener,
        );
        self.inner.log(DebugKind::Subscribe, Some(&name), None);

        let weak = Arc::downgrade(&self.inner);
        let id = listener.id();
        Unsubscribe::new(move || {
            if let Some(emitter) = Self::from_weak(&weak) {
                emitter.off_meta_id(kind, id);
            }
        })
    }

    /// Remove a meta-event listener. Absent listeners are ignored.
    pub fn off_meta(&self, kind: MetaEvent, listener: &MetaListener) {
        self.off_meta_id(kind, listener.id());
    }

    fn off_meta_id(&self, kind: MetaEvent, id: ListenerId) {
        let removed = {
            let mut state = self.inner.state.lock();
            match state.meta_listeners.get_mut(&kind) {
                Some(set) => {
                    let removed = remove_from_set(set, id);
                    if set.is_empty() {
                        state.meta_listeners.remove(&kind);
                    }
                    removed
                }
                None => None,
            }
        };
        drop(removed);
        self.inner
            .log(DebugKind::Unsubscribe, Some(&kind.event_name()), None);
    }

    /// Wait for the next occurrence of one meta-event.
    ///
    /// Resolves to `None` if the subscription is cleared first. Like
    /// [`on_meta`](Self::on_meta), this emits no meta-event itself.
    pub fn once_meta(&self, kind: MetaEvent) -> Once<ListenerChange> {
        let (sender, receiver) = oneshot::channel();
        let slot: OnceSlot<ListenerChange> = Arc::new(Mutex::new(Some(sender)));

        let id = ListenerId::next();
        let weak = Arc::downgrade(&self.inner);
        let listener_slot = Arc::clone(&slot);
        let listener = Listener::with_id(id, move |change: ListenerChange| {
            let sender = listener_slot.lock().take();
            if let Some(sender) = sender {
                if let Some(emitter) = Self::from_weak(&weak) {
                    emitter.off_meta_id(kind, id);
                }
                let _ = sender.send(change);
            }
            futures::future::ready(Ok(()))
        });

        let unsubscribe = self.on_meta(kind, listener);
        Once::new(receiver, &slot, unsubscribe)
    }

    // ------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------

    /// Start an iteration session over the payloads emitted to `names`.
    ///
    /// Only [`emit`](Self::emit) feeds sessions. The stream ends after
    /// [`EventStream::close`], or once the names are cleared and the queue is
    /// drained.
    pub fn events(&self, names: impl IntoEventNames) -> EmitResult<EventStream<T>> {
        let names = names.into_event_names();
        if let Some(name) = names.iter().find(|name| name.is_meta()) {
            return Err(EmitterError::reserved(name.clone()));
        }

        let (producer, receiver) = Producer::channel();
        let id = producer.id();
        {
            let mut state = self.inner.state.lock();
            for name in &names {
                let set = state.producers.entry(name.clone()).or_default();
                if !set.iter().any(|existing| existing.id() == id) {
                    set.push(producer.clone());
                }
            }
        }
        drop(producer);

        let weak = Arc::downgrade(&self.inner);
        Ok(EventStream::new(receiver, move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.lock();
                let detached = finish_producers(&mut state.producers, &[id]);
                drop(state);
                drop(detached);
            }
        }))
    }

    /// Start an iteration session over every user event, as `(name, payload)`.
    pub fn any_event(&self) -> EventStream<(EventName, T)> {
        let (producer, receiver) = Producer::channel();
        let id = producer.id();
        self.inner.state.lock().any_producers.push(producer);

        let weak = Arc::downgrade(&self.inner);
        EventStream::new(receiver, move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.lock();
                let index = state
                    .any_producers
                    .iter()
                    .position(|producer| producer.id() == id);
                let detached = index.map(|index| state.any_producers.remove(index));
                drop(state);
                drop(detached);
            }
        })
    }

    /// Start an iteration session over the given meta-events.
    ///
    /// The session is fed when the meta-event is emitted, before any meta
    /// listener runs, and works without a tokio runtime.
    pub fn meta_events(
        &self,
        kinds: impl IntoIterator<Item = MetaEvent>,
    ) -> EventStream<MetaItem> {
        let (producer, receiver) = Producer::channel();
        let id = producer.id();
        {
            let mut state = self.inner.state.lock();
            for kind in kinds {
                let set = state.meta_producers.entry(kind).or_default();
                if !set.iter().any(|existing| existing.id() == id) {
                    set.push(producer.clone());
                }
            }
        }
        drop(producer);

        let weak = Arc::downgrade(&self.inner);
        EventStream::new(receiver, move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.lock();
                let detached = finish_producers(&mut state.meta_producers, &[id]);
                drop(state);
                drop(detached);
            }
        })
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    /// Emit `data` to every listener of `name` and to every any-listener.
    ///
    /// Validation, the producer feed and the listener snapshot happen now; the
    /// listeners run when the returned future is awaited, after one yield.
    /// All listeners are started before any is awaited. The future resolves
    /// once all of them settled, or with the first listener error.
    pub fn emit(
        &self,
        name: impl Into<EventName>,
        data: T,
    ) -> impl Future<Output = EmitResult<()>> + Send + 'static {
        let prepared = self.prepare(name.into(), data, DebugKind::Emit);
        let emitter = self.clone();
        async move {
            let snapshot = prepared?;
            tokio::task::yield_now().await;
            emitter.dispatch_concurrent(snapshot).await
        }
    }

    /// Emit `data` to listeners one at a time, in subscription order.
    ///
    /// Named listeners run first, then any-listeners; each is awaited before
    /// the next starts and the first error stops the sequence. Iteration
    /// sessions are not fed.
    pub fn emit_serial(
        &self,
        name: impl Into<EventName>,
        data: T,
    ) -> impl Future<Output = EmitResult<()>> + Send + 'static {
        let prepared = self.prepare(name.into(), data, DebugKind::EmitSerial);
        let emitter = self.clone();
        async move {
            let snapshot = prepared?;
            tokio::task::yield_now().await;
            emitter.dispatch_serial(snapshot).await
        }
    }

    fn prepare(&self, name: EventName, data: T, kind: DebugKind) -> EmitResult<Snapshot<T>> {
        if name.is_meta() {
            return Err(EmitterError::reserved(name));
        }

        self.inner.log(kind, Some(&name), Some(&data as &dyn fmt::Debug));

        let state = self.inner.state.lock();
        if kind == DebugKind::Emit {
            state.enqueue(&name, &data);
        }
        let listeners = state.listeners.get(&name).cloned().unwrap_or_default();
        let any_listeners = state.any_listeners.clone();
        drop(state);

        Ok(Snapshot {
            name,
            data,
            listeners,
            any_listeners,
        })
    }

    async fn dispatch_concurrent(&self, snapshot: Snapshot<T>) -> EmitResult<()> {
        let Snapshot {
            name,
            data,
            listeners,
            any_listeners,
        } = snapshot;

        let mut calls: Vec<BoxFuture<'static, anyhow::Result<()>>> =
            Vec::with_capacity(listeners.len() + any_listeners.len());

        for listener in listeners {
            let emitter = self.clone();
            let name = name.clone();
            let data = data.clone();
            calls.push(Box::pin(async move {
                let live = emitter.inner.state.lock().has_listener(&name, listener.id());
                if !live {
                    return Ok(());
                }
                listener.call(data).await
            }));
        }

        for listener in any_listeners {
            let emitter = self.clone();
            let item = (name.clone(), data.clone());
            calls.push(Box::pin(async move {
                let live = emitter.inner.state.lock().has_any_listener(listener.id());
                if !live {
                    return Ok(());
                }
                listener.call(item).await
            }));
        }

        try_join_all(calls)
            .await
            .map(|_| ())
            .map_err(EmitterError::listener)
    }

    async fn dispatch_serial(&self, snapshot: Snapshot<T>) -> EmitResult<()> {
        let Snapshot {
            name,
            data,
            listeners,
            any_listeners,
        } = snapshot;

        for listener in listeners {
            let live = self.inner.state.lock().has_listener(&name, listener.id());
            if live {
                listener
                    .call(data.clone())
                    .await
                    .map_err(EmitterError::listener)?;
            }
        }

        for listener in any_listeners {
            let live = self.inner.state.lock().has_any_listener(listener.id());
            if live {
                listener
                    .call((name.clone(), data.clone()))
                    .await
                    .map_err(EmitterError::listener)?;
            }
        }

        Ok(())
    }

    /// Queue a meta-event for the emitter's meta task.
    ///
    /// Nothing awaits the delivery, so listener failures are only logged and
    /// one failing listener does not keep the others from running.
    fn emit_meta(&self, kind: MetaEvent, change: ListenerChange) {
        let name = kind.event_name();
        self.inner
            .log(DebugKind::Emit, Some(&name), Some(&change as &dyn fmt::Debug));

        // Snapshot and send under the queue lock so deliveries keep call order.
        let mut queue = self.inner.meta_queue.lock();
        let listeners = {
            let state = self.inner.state.lock();
            if let Some(producers) = state.meta_producers.get(&kind) {
                for producer in producers {
                    producer.enqueue((kind, change.clone()));
                }
            }
            state.meta_listeners.get(&kind).cloned().unwrap_or_default()
        };
        if listeners.is_empty() {
            return;
        }

        if queue.as_ref().map_or(true, |sender| sender.is_closed()) {
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                tracing::warn!(
                    emitter = %self.inner.debug.name,
                    event = %name,
                    "No tokio runtime available; meta event dropped"
                );
                return;
            };
            let (sender, receiver) = mpsc::unbounded_channel();
            runtime.spawn(Self::deliver_meta(
                Arc::downgrade(&self.inner),
                receiver,
                self.inner.debug.name.clone(),
            ));
            *queue = Some(sender);
        }

        let delivery = MetaDelivery {
            kind,
            change,
            listeners,
        };
        if let Some(sender) = queue.as_ref() {
            if sender.send(delivery).is_err() {
                tracing::warn!(
                    emitter = %self.inner.debug.name,
                    event = %name,
                    "Meta event task stopped; meta event dropped"
                );
            }
        }
    }

    /// Body of the meta task: deliver queued meta-events one at a time.
    ///
    /// Ends once the emitter is dropped and the queue is drained.
    async fn deliver_meta(
        inner: Weak<Inner<T>>,
        mut queue: mpsc::UnboundedReceiver<MetaDelivery>,
        emitter_name: String,
    ) {
        while let Some(delivery) = queue.recv().await {
            let MetaDelivery {
                kind,
                change,
                listeners,
            } = delivery;

            let calls = listeners.into_iter().map(|listener| {
                let inner = Weak::clone(&inner);
                let change = change.clone();
                async move {
                    let live = Self::from_weak(&inner).is_some_and(|emitter| {
                        emitter.has_live_meta_listener(kind, listener.id())
                    });
                    if !live {
                        return Ok(());
                    }
                    listener.call(change).await
                }
            });

            for result in join_all(calls).await {
                if let Err(error) = result {
                    tracing::warn!(
                        emitter = %emitter_name,
                        event = %kind.event_name(),
                        error = %error,
                        "Meta event listener failed"
                    );
                }
            }
        }
    }

    fn has_live_meta_listener(&self, kind: MetaEvent, id: ListenerId) -> bool {
        self.inner.state.lock().has_meta_listener(kind, id)
    }

    // ------------------------------------------------------------------
    // Housekeeping
    // ------------------------------------------------------------------

    /// Clear the listeners of each of `names` and finish their sessions.
    ///
    /// Finished sessions still yield what was queued before they end. Any
    /// listeners and any-event sessions are left alone.
    pub fn clear_listeners(&self, names: impl IntoEventNames) {
        for name in names.into_event_names() {
            self.inner.log(DebugKind::Clear, Some(&name), None);

            match name.meta() {
                Some(kind) => {
                    let cleared = {
                        let mut state = self.inner.state.lock();
                        let listeners = state.meta_listeners.remove(&kind);
                        let ids = producer_ids(&state.meta_producers, &kind);
                        let finished = finish_producers(&mut state.meta_producers, &ids);
                        (listeners, finished)
                    };
                    drop(cleared);
                }
                None => {
                    let cleared = {
                        let mut state = self.inner.state.lock();
                        let listeners = state.listeners.remove(&name);
                        let ids = producer_ids(&state.producers, &name);
                        let finished = finish_producers(&mut state.producers, &ids);
                        (listeners, finished)
                    };
                    drop(cleared);
                }
            }
        }
    }

    /// Clear every listener of every kind and finish every session.
    pub fn clear_all_listeners(&self) {
        self.inner.log(DebugKind::Clear, None, None);

        let cleared = std::mem::take(&mut *self.inner.state.lock());
        drop(cleared);
    }

    /// Number of receivers that an emission to `names` would reach, summed
    /// over the names.
    ///
    /// Per name this is the any-listeners, the name's listeners, its sessions
    /// and the any-event sessions.
    pub fn listener_count(&self, names: impl IntoEventNames) -> usize {
        let state = self.inner.state.lock();
        names
            .into_event_names()
            .iter()
            .map(|name| {
                let (listeners, producers) = match name.meta() {
                    Some(kind) => (
                        state.meta_listeners.get(&kind).map_or(0, Vec::len),
                        state.meta_producers.get(&kind).map_or(0, Vec::len),
                    ),
                    None => (
                        state.listeners.get(name).map_or(0, Vec::len),
                        state.producers.get(name).map_or(0, Vec::len),
                    ),
                };
                state.any_listeners.len() + listeners + producers + state.any_producers.len()
            })
            .sum()
    }

    /// Number of registrations across the whole emitter.
    pub fn total_listener_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.any_listeners.len()
            + state.listeners.values().map(Vec::len).sum::<usize>()
            + state.meta_listeners.values().map(Vec::len).sum::<usize>()
            + state.producers.values().map(Vec::len).sum::<usize>()
            + state.any_producers.len()
            + state.meta_producers.values().map(Vec::len).sum::<usize>()
    }
}
