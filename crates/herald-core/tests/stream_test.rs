//! Async iteration sessions: `events` and `any_event`.

use futures::StreamExt;
use herald_core::{Emitter, EventName};

#[tokio::test]
async fn test_events_yield_in_emission_order_until_closed() {
    let emitter: Emitter<u32> = Emitter::new();

    emitter.emit("a", 0).await.unwrap();
    let mut stream = emitter.events(["a"]).unwrap();

    emitter.emit("a", 1).await.unwrap();
    emitter.emit("b", 2).await.unwrap();
    emitter.emit("a", 3).await.unwrap();

    assert_eq!(stream.next().await, Some(1));
    assert_eq!(stream.next().await, Some(3));

    stream.close();
    assert!(stream.is_closed());
    assert_eq!(stream.next().await, None);
    assert_eq!(emitter.listener_count("a"), 0);
}

#[tokio::test]
async fn test_emit_serial_does_not_feed_sessions() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut stream = emitter.events("a").unwrap();

    emitter.emit_serial("a", 1).await.unwrap();
    emitter.emit("a", 2).await.unwrap();

    assert_eq!(stream.next().await, Some(2));
}

#[tokio::test]
async fn test_each_call_creates_a_fresh_session() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut first = emitter.events("a").unwrap();
    emitter.emit("a", 1).await.unwrap();

    let mut second = emitter.events("a").unwrap();
    emitter.emit("a", 2).await.unwrap();

    assert_eq!(emitter.listener_count("a"), 2);
    assert_eq!(first.next().await, Some(1));
    assert_eq!(first.next().await, Some(2));
    assert_eq!(second.next().await, Some(2));
}

#[tokio::test]
async fn test_pending_pull_wakes_on_emit_and_on_finish() {
    let emitter: Emitter<u32> = Emitter::new();
    let stream = emitter.events("a").unwrap();

    let consumer = tokio::spawn(async move { stream.collect::<Vec<_>>().await });

    tokio::task::yield_now().await;
    emitter.emit("a", 1).await.unwrap();
    emitter.emit("a", 2).await.unwrap();
    emitter.clear_listeners("a");

    assert_eq!(consumer.await.unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_clear_all_terminates_every_session() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut named = emitter.events(["a", "b"]).unwrap();
    let mut any = emitter.any_event();

    emitter.emit("a", 1).await.unwrap();
    emitter.clear_all_listeners();

    for name in ["a", "b"] {
        assert_eq!(emitter.listener_count(name), 0);
    }
    // Queued items drain before completion.
    assert_eq!(named.next().await, Some(1));
    assert_eq!(named.next().await, None);
    assert_eq!(any.next().await, Some((EventName::from("a"), 1)));
    assert_eq!(any.next().await, None);
}

#[tokio::test]
async fn test_any_event_yields_name_and_payload() {
    let emitter: Emitter<&'static str> = Emitter::new();
    let mut stream = emitter.any_event();

    emitter.emit("open", "door").await.unwrap();
    emitter.emit(7i64, "seven").await.unwrap();

    assert_eq!(stream.next().await, Some((EventName::from("open"), "door")));
    assert_eq!(stream.next().await, Some((EventName::from(7i64), "seven")));

    drop(stream);
    assert_eq!(emitter.listener_count("open"), 0);
}

#[tokio::test]
async fn test_dropping_a_session_unregisters_it() {
    let emitter: Emitter<u32> = Emitter::new();
    {
        let _stream = emitter.events(["a", "b"]).unwrap();
        assert_eq!(emitter.total_listener_count(), 2);
    }
    assert_eq!(emitter.total_listener_count(), 0);
    emitter.emit("a", 1).await.unwrap();
}

#[tokio::test]
async fn test_session_ends_when_emitter_is_dropped() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut stream = emitter.events("a").unwrap();
    emitter.emit("a", 1).await.unwrap();

    drop(emitter);

    assert_eq!(stream.next().await, Some(1));
    assert_eq!(stream.next().await, None);
}
