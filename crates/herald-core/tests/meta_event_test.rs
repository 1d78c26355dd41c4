//! Listener-added / listener-removed meta-events.

use futures::StreamExt;
use herald_core::{
    Emitter, EventName, Listener, ListenerChange, MetaEvent, LISTENER_ADDED, LISTENER_REMOVED,
};
use tokio::sync::mpsc;

fn watch_meta(emitter: &Emitter<u32>) -> mpsc::UnboundedReceiver<(MetaEvent, ListenerChange)> {
    let (tx, rx) = mpsc::unbounded_channel();
    for kind in [MetaEvent::ListenerAdded, MetaEvent::ListenerRemoved] {
        let tx = tx.clone();
        emitter.on_meta(
            kind,
            Listener::from_fn(move |change| {
                let _ = tx.send((kind, change));
                Ok(())
            }),
        );
    }
    rx
}

#[tokio::test]
async fn test_on_and_off_emit_meta_events() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut changes = watch_meta(&emitter);
    let listener = Listener::from_fn(|_: u32| Ok(()));

    let handle = emitter.on("a", listener.clone()).unwrap();
    let (kind, change) = changes.recv().await.unwrap();
    assert_eq!(kind, MetaEvent::ListenerAdded);
    assert_eq!(
        change,
        ListenerChange {
            event_name: Some(EventName::from("a")),
            listener: listener.id(),
        }
    );

    handle.unsubscribe();
    let (kind, change) = changes.recv().await.unwrap();
    assert_eq!(kind, MetaEvent::ListenerRemoved);
    assert_eq!(change.event_name, Some(EventName::from("a")));
    assert_eq!(change.listener, listener.id());
}

#[tokio::test]
async fn test_any_listener_meta_events_have_no_name() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut changes = watch_meta(&emitter);
    let listener = Listener::from_fn(|_: (EventName, u32)| Ok(()));

    emitter.on_any(listener.clone());
    let (kind, change) = changes.recv().await.unwrap();
    assert_eq!(kind, MetaEvent::ListenerAdded);
    assert_eq!(change.event_name, None);

    emitter.off_any(&listener);
    let (kind, change) = changes.recv().await.unwrap();
    assert_eq!(kind, MetaEvent::ListenerRemoved);
    assert_eq!(change.listener, listener.id());
}

#[tokio::test]
async fn test_one_meta_event_per_name() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut changes = watch_meta(&emitter);

    emitter
        .on(["a", "b"], Listener::from_fn(|_| Ok(())))
        .unwrap();

    let mut names = Vec::new();
    for _ in 0..2 {
        let (_, change) = changes.recv().await.unwrap();
        names.push(change.event_name.unwrap().to_string());
    }
    names.sort();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn test_removing_absent_listener_emits_nothing() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut changes = watch_meta(&emitter);

    emitter.off("a", &Listener::from_fn(|_| Ok(())));
    emitter.on("b", Listener::from_fn(|_| Ok(()))).unwrap();

    let (kind, change) = changes.recv().await.unwrap();
    assert_eq!(kind, MetaEvent::ListenerAdded);
    assert_eq!(change.event_name, Some(EventName::from("b")));
}

#[tokio::test]
async fn test_meta_subscriptions_are_counted_and_silent() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut changes = watch_meta(&emitter);

    assert_eq!(emitter.listener_count(LISTENER_ADDED), 1);
    assert_eq!(emitter.listener_count([LISTENER_ADDED, LISTENER_REMOVED]), 2);
    assert_eq!(emitter.total_listener_count(), 2);

    // Subscribing to meta-events does not itself produce one.
    emitter.on("c", Listener::from_fn(|_| Ok(()))).unwrap();
    let (_, change) = changes.recv().await.unwrap();
    assert_eq!(change.event_name, Some(EventName::from("c")));
}

#[tokio::test]
async fn test_user_cannot_subscribe_data_listener_to_meta_name() {
    let emitter: Emitter<u32> = Emitter::new();
    let err = emitter
        .on(LISTENER_ADDED, Listener::from_fn(|_| Ok(())))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(emitter.total_listener_count(), 0);
}

#[tokio::test]
async fn test_failing_meta_listener_does_not_affect_subscription() {
    let emitter: Emitter<u32> = Emitter::new();
    emitter.on_meta(
        MetaEvent::ListenerAdded,
        Listener::from_fn(|_| Err(anyhow::anyhow!("meta listener failed"))),
    );
    let mut changes = watch_meta(&emitter);

    emitter.on("a", Listener::from_fn(|_| Ok(()))).unwrap();
    let (kind, _) = changes.recv().await.unwrap();

    assert_eq!(kind, MetaEvent::ListenerAdded);
    assert_eq!(emitter.listener_count("a"), 1);
}

#[tokio::test]
async fn test_off_meta_stops_delivery() {
    let emitter: Emitter<u32> = Emitter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let listener = Listener::from_fn(move |change: ListenerChange| {
        let _ = tx.send(change);
        Ok(())
    });
    emitter.on_meta(MetaEvent::ListenerAdded, listener.clone());
    emitter.off_meta(MetaEvent::ListenerAdded, &listener);
    assert_eq!(emitter.listener_count(LISTENER_ADDED), 0);

    emitter.on("a", Listener::from_fn(|_| Ok(()))).unwrap();
    drop(emitter);
    drop(listener);

    // Every sender is gone once the emitter and our handle are dropped.
    assert!(rx.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_meta_events_arrive_in_call_order() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut changes = watch_meta(&emitter);

    let mut expected = Vec::new();
    for _ in 0..500 {
        let listener = Listener::from_fn(|_: u32| Ok(()));
        emitter.on("a", listener.clone()).unwrap();
        emitter.off("a", &listener);
        expected.push((MetaEvent::ListenerAdded, listener.id()));
        expected.push((MetaEvent::ListenerRemoved, listener.id()));
    }

    let mut observed = Vec::with_capacity(expected.len());
    while observed.len() < expected.len() {
        let (kind, change) = changes.recv().await.unwrap();
        observed.push((kind, change.listener));
    }
    assert_eq!(observed, expected);
}

#[tokio::test]
async fn test_once_meta_resolves_with_next_change() {
    let emitter: Emitter<u32> = Emitter::new();
    let added = emitter.once_meta(MetaEvent::ListenerAdded);
    assert_eq!(emitter.listener_count(LISTENER_ADDED), 1);

    let listener = Listener::from_fn(|_: u32| Ok(()));
    emitter.on("a", listener.clone()).unwrap();

    let change = added.await.unwrap();
    assert_eq!(change.event_name, Some(EventName::from("a")));
    assert_eq!(change.listener, listener.id());
    assert_eq!(emitter.listener_count(LISTENER_ADDED), 0);
}

#[tokio::test]
async fn test_once_meta_cleared_resolves_to_none() {
    let emitter: Emitter<u32> = Emitter::new();
    let removed = emitter.once_meta(MetaEvent::ListenerRemoved);

    emitter.clear_listeners(LISTENER_REMOVED);
    assert_eq!(removed.await, None);
}

#[tokio::test]
async fn test_meta_events_stream_yields_changes() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut stream = emitter.meta_events([MetaEvent::ListenerAdded, MetaEvent::ListenerRemoved]);
    assert_eq!(emitter.listener_count([LISTENER_ADDED, LISTENER_REMOVED]), 2);

    let listener = Listener::from_fn(|_: (EventName, u32)| Ok(()));
    emitter.on_any(listener.clone());
    emitter.off_any(&listener);

    let added = ListenerChange {
        event_name: None,
        listener: listener.id(),
    };
    assert_eq!(
        stream.next().await,
        Some((MetaEvent::ListenerAdded, added.clone()))
    );
    assert_eq!(stream.next().await, Some((MetaEvent::ListenerRemoved, added)));

    drop(stream);
    assert_eq!(emitter.total_listener_count(), 0);
}

#[tokio::test]
async fn test_meta_subscriptions_emit_no_meta_events() {
    let emitter: Emitter<u32> = Emitter::new();
    let mut stream = emitter.meta_events([MetaEvent::ListenerAdded]);

    let pending = emitter.once_meta(MetaEvent::ListenerAdded);
    emitter.on_meta(MetaEvent::ListenerRemoved, Listener::from_fn(|_| Ok(())));
    drop(pending);
    let second = emitter.meta_events([MetaEvent::ListenerRemoved]);
    drop(second);

    emitter.on("b", Listener::from_fn(|_| Ok(()))).unwrap();
    let (kind, change) = stream.next().await.unwrap();
    assert_eq!(kind, MetaEvent::ListenerAdded);
    assert_eq!(change.event_name, Some(EventName::from("b")));
}
