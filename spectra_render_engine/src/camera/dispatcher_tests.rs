//! Unit tests for dispatcher.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use super::*;

type CountListener = dyn Fn(u32) + Send + Sync;

fn counting_listener(counter: Arc<AtomicUsize>) -> Arc<CountListener> {
    Arc::new(move |_value| {
        counter.fetch_add(1, Ordering::Relaxed);
    })
}

// ============================================================================
// CONNECT / DISPATCH
// ============================================================================

#[test]
fn test_dispatcher_starts_empty() {
    let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
    assert_eq!(dispatcher.listener_count(), 0);
    assert!(!dispatcher.has_listeners());
}

#[test]
fn test_dispatch_reaches_all_listeners() {
    let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let _c1 = dispatcher.connect(counting_listener(counter.clone()));
    let _c2 = dispatcher.connect(counting_listener(counter.clone()));
    assert_eq!(dispatcher.listener_count(), 2);

    dispatcher.for_each(|listener| listener(7));
    assert_eq!(counter.load(Ordering::Relaxed), 2);

    dispatcher.for_each(|listener| listener(8));
    assert_eq!(counter.load(Ordering::Relaxed), 4);
}

#[test]
fn test_dispatch_with_no_listeners_is_noop() {
    let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
    dispatcher.for_each(|listener| listener(1));
}

// ============================================================================
// RAII DISCONNECT
// ============================================================================

#[test]
fn test_drop_disconnects() {
    let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
    let counter = Arc::new(AtomicUsize::new(0));

    {
        let _connection = dispatcher.connect(counting_listener(counter.clone()));
        assert_eq!(dispatcher.listener_count(), 1);
    }

    assert_eq!(dispatcher.listener_count(), 0);
    dispatcher.for_each(|listener| listener(1));
    assert_eq!(counter.load(Ordering::Relaxed), 0);
}

#[test]
fn test_explicit_disconnect() {
    let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let connection = dispatcher.connect(counting_listener(counter));
    assert!(connection.connected());

    connection.disconnect();
    assert_eq!(dispatcher.listener_count(), 0);
}

#[test]
fn test_connection_tracks_registration() {
    let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let c1 = dispatcher.connect(counting_listener(counter.clone()));
    let c2 = dispatcher.connect(counting_listener(counter));
    assert!(c1.connected());
    assert!(c2.connected());

    drop(c2);
    assert!(c1.connected());
    assert_eq!(dispatcher.listener_count(), 1);
}

#[test]
fn test_connection_outliving_dispatcher() {
    let counter = Arc::new(AtomicUsize::new(0));
    let connection = {
        let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
        dispatcher.connect(counting_listener(counter))
    };

    // Registry is gone; the connection is stale but harmless
    assert!(!connection.connected());
    drop(connection);
}

// ============================================================================
// MULTIPLE INDEPENDENT LISTENERS
// ============================================================================

#[test]
fn test_listeners_receive_arguments() {
    let dispatcher: Dispatcher<CountListener> = Dispatcher::new();
    let last = Arc::new(AtomicUsize::new(0));
    let last_clone = last.clone();

    let _connection = dispatcher.connect(Arc::new(move |value: u32| {
        last_clone.store(value as usize, Ordering::Relaxed);
    }) as Arc<CountListener>);

    dispatcher.for_each(|listener| listener(41));
    assert_eq!(last.load(Ordering::Relaxed), 41);
}
