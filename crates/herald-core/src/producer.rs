//! Async iteration over emitted events.
//!
//! Each call to `events`/`any_event` registers a [`Producer`] (the sending half
//! of an unbounded channel) under one or more slots of the emitter and hands
//! the receiving half to the caller as an [`EventStream`].
//!
//! Finishing is driven from the emitter side by dropping every registered
//! producer: the stream then drains whatever is queued and ends. Ending from
//! the consumer side (`close` or drop) unregisters the producer and ends the
//! stream at once, discarding the queue.

use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

static PRODUCER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ProducerId(u64);

/// Emitter-side end of one iteration session.
pub(crate) struct Producer<I> {
    id: ProducerId,
    sender: mpsc::UnboundedSender<I>,
}

impl<I> Clone for Producer<I> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
        }
    }
}

impl<I> Producer<I> {
    /// Create a producer and the receiver its session reads from.
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<I>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let producer = Self {
            id: ProducerId(PRODUCER_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            sender,
        };
        (producer, receiver)
    }

    pub(crate) fn id(&self) -> ProducerId {
        self.id
    }

    /// Queue an item. A session that already ended silently drops it.
    pub(crate) fn enqueue(&self, item: I) {
        if self.sender.send(item).is_err() {
            tracing::trace!(producer = self.id.0, "Dropped item for ended session");
        }
    }
}

/// A live iteration session over emitted events.
///
/// Implements [`futures::Stream`]; use `StreamExt::next` to pull items. The
/// stream yields events emitted after it was created, in emission order, and
/// ends when the session is closed or the emitter clears it.
pub struct EventStream<I> {
    receiver: mpsc::UnboundedReceiver<I>,
    closed: bool,
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl<I> EventStream<I> {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<I>,
        detach: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            receiver,
            closed: false,
            detach: Some(Box::new(detach)),
        }
    }

    /// End the session now.
    ///
    /// The producer is unregistered from every event it listened to, queued
    /// items are discarded and every further pull reports completion.
    pub fn close(&mut self) {
        self.closed = true;
        self.receiver.close();
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<I> Stream for EventStream<I> {
    type Item = I;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<I>> {
        let this = self.get_mut();
        if this.closed {
            return Poll::Ready(None);
        }
        this.receiver.poll_recv(cx)
    }
}

impl<I> Drop for EventStream<I> {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl<I> fmt::Debug for EventStream<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_finished_producer_drains_queue() {
        let (producer, receiver) = Producer::channel();
        let mut stream = EventStream::new(receiver, || {});

        producer.enqueue(1);
        producer.enqueue(2);
        drop(producer);

        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_close_discards_queue_and_detaches() {
        let detached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&detached);
        let (producer, receiver) = Producer::channel();
        let mut stream = EventStream::new(receiver, move || flag.store(true, Ordering::SeqCst));

        producer.enqueue("queued");
        stream.close();

        assert!(stream.is_closed());
        assert!(detached.load(Ordering::SeqCst));
        assert_eq!(stream.next().await, None);

        // Enqueueing after close is harmless.
        producer.enqueue("late");
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn test_drop_detaches() {
        let detached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&detached);
        let (_producer, receiver) = Producer::<u8>::channel();
        let stream = EventStream::new(receiver, move || flag.store(true, Ordering::SeqCst));

        drop(stream);
        assert!(detached.load(Ordering::SeqCst));
    }
}
