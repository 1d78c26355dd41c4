//! The future returned by `Emitter::once`.

use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::listener::Unsubscribe;

pub(crate) type OnceSlot<T> = Arc<Mutex<Option<oneshot::Sender<T>>>>;

/// Resolves with the first payload emitted to any of the watched names.
///
/// Resolves to `None` when the subscription ends without a payload: after
/// [`off`](Self::off), after the listeners are cleared, or once the emitter is
/// dropped.
pub struct Once<T> {
    receiver: oneshot::Receiver<T>,
    // Weak: the listener owns the sender, so dropping the listener settles
    // the future.
    slot: Weak<Mutex<Option<oneshot::Sender<T>>>>,
    unsubscribe: Option<Unsubscribe>,
}

impl<T> Once<T> {
    pub(crate) fn new(
        receiver: oneshot::Receiver<T>,
        slot: &OnceSlot<T>,
        unsubscribe: Unsubscribe,
    ) -> Self {
        Self {
            receiver,
            slot: Arc::downgrade(slot),
            unsubscribe: Some(unsubscribe),
        }
    }

    /// Unsubscribe before any payload arrives.
    pub fn off(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe.unsubscribe();
        }
        // An in-flight emission may still hold the listener; close the slot
        // so the future settles now.
        if let Some(slot) = self.slot.upgrade() {
            slot.lock().take();
        }
    }
}

impl<T> Future for Once<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|received| received.ok())
    }
}

impl<T> fmt::Debug for Once<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Once")
            .field("subscribed", &self.unsubscribe.is_some())
            .finish()
    }
}
