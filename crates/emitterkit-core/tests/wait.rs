//! Tests for once, once_if, eventually and eventually_if

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::recorder;
use emitterkit_core::*;

#[derive(Debug, Clone, PartialEq)]
struct Data {
    id: u32,
    value: String,
}

events! {
    MESSAGE: String = "message";
    DATA: Data = "data";
}

fn data(id: u32, value: &str) -> Data {
    Data {
        id,
        value: value.to_string(),
    }
}

#[test]
fn test_once_calls_listener_only_once() {
    let emitter = Emitter::new();
    let seen = recorder();
    let s = seen.clone();

    emitter
        .once(&MESSAGE, &Listener::new(move |m: &String| s.lock().push(m.clone())))
        .expect("Should register");

    emitter.emit(&MESSAGE, &"first".to_string());
    emitter.emit(&MESSAGE, &"second".to_string());

    assert_eq!(*seen.lock(), vec!["first"]);
    assert!(!emitter.has_listener(&MESSAGE));
}

#[test]
fn test_once_if_calls_listener_only_when_predicate_matches() {
    let emitter = Emitter::new();
    let seen = recorder();
    let s = seen.clone();

    emitter
        .once_if(
            &MESSAGE,
            |message| message.contains("world"),
            &Listener::new(move |m: &String| s.lock().push(m.clone())),
        )
        .expect("Should register");

    emitter.emit(&MESSAGE, &"hello".to_string());
    assert!(seen.lock().is_empty());
    assert_eq!(emitter.listener_count(&MESSAGE), 1);

    emitter.emit(&MESSAGE, &"hello world".to_string());
    assert_eq!(*seen.lock(), vec!["hello world"]);

    emitter.emit(&MESSAGE, &"hello world again".to_string());
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(emitter.listener_count(&MESSAGE), 0);
}

#[test]
fn test_once_if_can_be_removed_before_matching() {
    let emitter = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();

    let subscription = emitter
        .once_if(&MESSAGE, |_| true, &Listener::new(move |_: &String| {
            c.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("Should register");
    assert_eq!(subscription.off(), 1);

    emitter.emit(&MESSAGE, &"ignored".to_string());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_once_listener_failure_reaches_error_event() {
    let emitter = Emitter::new();
    let failures = Arc::new(AtomicUsize::new(0));
    let f = failures.clone();
    emitter
        .on(&ERROR, &Listener::new(move |_: &ListenerError| {
            f.fetch_add(1, Ordering::SeqCst);
        }))
        .ok();
    emitter
        .once(&MESSAGE, &Listener::fallible(|_: &String| anyhow::bail!("once failed")))
        .ok();

    emitter.emit(&MESSAGE, &"x".to_string());
    emitter.emit(&MESSAGE, &"y".to_string());
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_eventually_resolves_when_event_is_emitted() {
    let emitter = Emitter::new();
    let e = emitter.clone();
    after(Duration::from_millis(50), move || {
        e.emit(&MESSAGE, &"async response".to_string());
    });

    let result = emitter
        .eventually(&MESSAGE, Some(Duration::from_millis(1000)))
        .await;
    assert_eq!(result, Ok("async response".to_string()));
    assert!(!emitter.has_listener(&MESSAGE));
}

#[tokio::test]
async fn test_eventually_rejects_on_timeout() {
    let emitter = Emitter::new();

    let err = emitter
        .eventually(&MESSAGE, Some(Duration::from_millis(50)))
        .await
        .expect_err("nothing is emitted");
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_timeout());
    assert_eq!(err.name(), &Name::from("message"));
    assert!(err.to_string().contains("50ms"));
    assert!(err.to_string().contains("message"));

    // The timed-out wait no longer listens
    assert!(!emitter.has_listener(&MESSAGE));
}

#[tokio::test]
async fn test_eventually_if_resolves_when_predicate_matches() {
    let emitter = Emitter::new();

    let e = emitter.clone();
    after(Duration::from_millis(50), move || {
        e.emit(&DATA, &data(1, "first"));
    });
    let e = emitter.clone();
    after(Duration::from_millis(100), move || {
        e.emit(&DATA, &data(2, "second"));
    });

    let result = emitter
        .eventually_if(&DATA, |d| d.id == 2, Some(Duration::from_millis(1000)))
        .await;
    assert_eq!(result, Ok(data(2, "second")));
}

#[tokio::test]
async fn test_eventually_if_times_out_on_mismatches_only() {
    let emitter = Emitter::new();
    let e = emitter.clone();
    after(Duration::from_millis(10), move || {
        e.emit(&DATA, &data(1, "wrong"));
    });

    let result = emitter
        .eventually_if(&DATA, |d| d.value == "right", Some(Duration::from_millis(80)))
        .await;
    assert!(matches!(result, Err(EmitterError::Timeout { .. })));
    assert_eq!(emitter.listener_count(&DATA), 0);
}

#[tokio::test]
async fn test_default_timeout_comes_from_config() {
    let emitter = Emitter::with_config(EmitterConfig {
        default_timeout: Duration::from_millis(30),
        ..Default::default()
    });

    let err = emitter
        .eventually(&MESSAGE, None)
        .await
        .expect_err("nothing is emitted");
    assert_eq!(
        err,
        EmitterError::Timeout {
            name: Name::from("message"),
            timeout: Duration::from_millis(30),
        }
    );
}

#[tokio::test]
async fn test_timer_is_cancelled_after_match() {
    let emitter = Emitter::new();
    let removals = Arc::new(AtomicUsize::new(0));
    let r = removals.clone();
    emitter
        .on(&REMOVE_LISTENER, &Listener::new(move |_: &ListenerChange| {
            r.fetch_add(1, Ordering::SeqCst);
        }))
        .ok();

    let wait = emitter.eventually(&MESSAGE, Some(Duration::from_millis(30)));
    emitter.emit(&MESSAGE, &"now".to_string());
    assert_eq!(wait.await, Ok("now".to_string()));
    assert_eq!(removals.load(Ordering::SeqCst), 1);

    // Past the timeout: the timer must not try to remove anything again
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(removals.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_waits_resolve_independently() {
    let emitter = Emitter::new();
    let even = emitter.eventually_if(&DATA, |d| d.id % 2 == 0, Some(Duration::from_secs(1)));
    let any = emitter.eventually(&DATA, Some(Duration::from_secs(1)));
    assert_eq!(emitter.listener_count(&DATA), 2);

    emitter.emit(&DATA, &data(1, "odd"));
    emitter.emit(&DATA, &data(4, "even"));

    assert_eq!(any.await, Ok(data(1, "odd")));
    assert_eq!(even.await, Ok(data(4, "even")));
    assert_eq!(emitter.listener_count(&DATA), 0);
}

#[tokio::test]
async fn test_wait_with_mismatched_payload_fails_fast() {
    let emitter = Emitter::new();
    emitter.on(&MESSAGE, &Listener::new(|_: &String| {})).ok();

    let same_name: Event<u64> = Event::new("message");
    let err = emitter
        .eventually(&same_name, Some(Duration::from_secs(5)))
        .await
        .expect_err("payload types differ");
    assert_eq!(err.kind(), ErrorKind::PayloadMismatch);
}

#[tokio::test]
async fn test_removing_listener_that_owns_a_wait_does_not_block() {
    let emitter = Emitter::new();
    let wait = parking_lot::Mutex::new(Some(
        emitter.eventually(&DATA, Some(Duration::from_secs(5))),
    ));
    // The registry holds the only handle to this listener
    let subscription = emitter
        .on(&MESSAGE, &Listener::new(move |_: &String| {
            wait.lock().take();
        }))
        .expect("Should register");
    assert_eq!(emitter.listener_count(&DATA), 1);

    let (done, finished) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        done.send(subscription.off()).ok();
    });
    let removed = finished
        .recv_timeout(Duration::from_secs(3))
        .expect("off() should return");

    assert_eq!(removed, 1);
    assert!(!emitter.has_listener(&MESSAGE));
    assert!(!emitter.has_listener(&DATA));
}

#[test]
fn test_once_registration_is_only_reachable_through_subscription() {
    let emitter = Emitter::new();
    let listener = Listener::new(|_: &String| {});
    let subscription = emitter.once(&MESSAGE, &listener).expect("Should register");

    assert!(!emitter.is_registered(&MESSAGE, &listener));
    assert_eq!(emitter.off(&MESSAGE, &listener), 0);
    assert_eq!(emitter.listener_count(&MESSAGE), 1);

    assert_eq!(subscription.off(), 1);
    assert_eq!(emitter.listener_count(&MESSAGE), 0);
}
