//! Listener handles and unsubscribe handles.

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::name::EventName;

static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a listener.
///
/// Ids are never reused within a process, so an id identifies one listener
/// handle and all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

type ListenerFn<A> = dyn Fn(A) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// A cloneable async callback with a stable identity.
///
/// Keep a clone to unsubscribe later with `off`. `A` is the argument type:
/// the payload for named listeners, `(EventName, T)` for any-listeners and
/// [`ListenerChange`] for meta listeners.
pub struct Listener<A> {
    id: ListenerId,
    callback: Arc<ListenerFn<A>>,
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for Listener<A> {}

impl<A> Listener<A> {
    /// This listener's identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl<A: Send + 'static> Listener<A> {
    /// Wrap an async callback.
    ///
    /// ```rust
    /// use herald_core::Listener;
    ///
    /// let listener = Listener::new(|value: u32| async move {
    ///     println!("got {value}");
    ///     Ok(())
    /// });
    /// # let _ = listener;
    /// ```
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_id(ListenerId::next(), callback)
    }

    /// Wrap a synchronous callback.
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(move |arg| futures::future::ready(callback(arg)))
    }

    pub(crate) fn with_id<F, Fut>(id: ListenerId, callback: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let callback: Arc<ListenerFn<A>> =
            Arc::new(move |arg: A| -> BoxFuture<'static, anyhow::Result<()>> {
                Box::pin(callback(arg))
            });
        Self { id, callback }
    }

    pub(crate) fn call(&self, arg: A) -> BoxFuture<'static, anyhow::Result<()>> {
        (self.callback)(arg)
    }
}

/// Payload of the `LISTENER_ADDED` and `LISTENER_REMOVED` meta-events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerChange {
    /// The event the listener was attached to; `None` for any-listeners
    pub event_name: Option<EventName>,
    /// The listener that was added or removed
    pub listener: ListenerId,
}

/// Handle that removes a subscription when invoked.
///
/// Dropping the handle does not unsubscribe.
pub struct Unsubscribe {
    action: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Unsubscribe {
    pub(crate) fn new(action: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// Remove the subscription this handle was returned for.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    pub(crate) fn run(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("pending", &self.action.is_some())
            .finish()
    }
}
