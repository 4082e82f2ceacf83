//! Components exposing events by composing emitters

use std::time::Duration;

use emitterkit_adapters::{listen, ListenerMap};
use emitterkit_core::*;

#[derive(Debug, Clone, PartialEq)]
struct Login {
    user: String,
}

events! {
    CONNECTED: () = "connected";
    DID_LOGIN: Login = "did-login";
}

/// Low-level component
#[derive(Default)]
struct Socket {
    events: Emitter,
}

impl Observable for Socket {
    fn emitter(&self) -> &Emitter {
        &self.events
    }
}

impl Socket {
    fn connect(&self) {
        self.emit(&CONNECTED, &());
    }
}

/// Wraps a socket; its events are a superset of the socket's
#[derive(Default)]
struct Client {
    socket: Socket,
}

impl Observable for Client {
    fn emitter(&self) -> &Emitter {
        self.socket.emitter()
    }
}

impl Client {
    fn login_later(&self, user: &str, delay: Duration) -> Cancel {
        let emitter = self.emitter().clone();
        let login = Login {
            user: user.to_string(),
        };
        after(delay, move || {
            emitter.emit(&DID_LOGIN, &login);
        })
    }
}

#[tokio::test]
async fn test_wrapper_sees_inner_events() {
    let client = Client::default();
    let connected = client.eventually(&CONNECTED, Some(Duration::from_secs(1)));

    client.socket.connect();
    assert_eq!(connected.await, Ok(()));
}

#[tokio::test]
async fn test_eventually_if_through_wrapper() {
    let client = Client::default();
    let _guest = client.login_later("guest", Duration::from_millis(20));
    let _admin = client.login_later("admin", Duration::from_millis(60));

    let login = client
        .eventually_if(&DID_LOGIN, |login| login.user == "admin", Some(Duration::from_secs(1)))
        .await
        .expect("Should log in");

    assert_eq!(login.user, "admin");
    assert_eq!(client.listener_count(&DID_LOGIN), 0);
}

#[tokio::test]
async fn test_cancelled_login_times_out() {
    let client = Client::default();
    let pending = client.login_later("guest", Duration::from_millis(50));
    pending.cancel();

    let outcome = client
        .eventually(&DID_LOGIN, Some(Duration::from_millis(100)))
        .await;
    let err = outcome.expect_err("Should time out");
    assert!(err.is_timeout());
    assert_eq!(err.kind().to_string(), "timeout");
}

#[test]
fn test_listen_accepts_any_observable() {
    let client = Client::default();
    let unlisten = listen(&client, ListenerMap::new().with(&CONNECTED, |_: &()| {}))
        .expect("Should register batch");

    assert_eq!(client.socket.listener_count(&CONNECTED), 1);
    assert_eq!(unlisten.off(), 1);
}
