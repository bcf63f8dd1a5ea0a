use greeter_object::clients::GreeterClient;
use greeter_object::greeter::{self, Flavor, Greeter, GreeterError, DEFAULT_RECOUNT_DELAY};
use object_framework::mock::{test_peer, FlakyStore, TestPeer};
use object_framework::{
    CloseEvent, ConnectionId, DurableStore, InboundFrame, MemoryStore, ObjectStub, OutboundFrame,
    StoreError,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn spawn(greeter: Greeter, store: Arc<dyn DurableStore>) -> GreeterClient {
    let (actor, client) = greeter::new("foo", greeter, store);
    tokio::spawn(actor.run());
    client
}

fn presence() -> GreeterClient {
    spawn(Greeter::default(), Arc::new(MemoryStore::new()))
}

/// Accepts `n` peers and discards their welcome frames.
async fn connect(client: &GreeterClient, n: usize) -> Vec<(ConnectionId, TestPeer)> {
    let mut peers = Vec::new();
    for _ in 0..n {
        let (sender, mut peer) = test_peer();
        let id = client.accept_stream(sender).await.expect("accept failed");
        peer.drain();
        peers.push((id, peer));
    }
    peers
}

#[tokio::test]
async fn test_defaults_when_never_set() {
    let client = presence();

    assert_eq!(client.get_greeting().await.unwrap(), "Hello");
    assert_eq!(client.get_name().await.unwrap(), "World");
    assert_eq!(client.say_hello(None).await.unwrap(), "Hello, World!");
}

#[tokio::test]
async fn test_set_then_get_is_exact() {
    let client = presence();

    client.set_greeting("Hi".to_string()).await.unwrap();
    assert_eq!(client.get_greeting().await.unwrap(), "Hi");
    assert_eq!(
        client.say_hello(Some("Sam".to_string())).await.unwrap(),
        "Hi, Sam!"
    );

    // An empty greeting is a value, not "unset".
    client.set_greeting(String::new()).await.unwrap();
    assert_eq!(client.get_greeting().await.unwrap(), "");

    // An empty name argument falls back to the stored name.
    client.set_name("Ada".to_string()).await.unwrap();
    assert_eq!(client.say_hello(Some(String::new())).await.unwrap(), ", Ada!");
}

#[tokio::test]
async fn test_accept_sends_welcome() {
    let client = presence();
    let (sender, mut peer) = test_peer();

    client.accept_stream(sender).await.unwrap();

    assert_eq!(peer.next_json(), Some(json!({ "welcome": "Welcome!" })));
    assert_eq!(peer.next_json(), None);
}

#[tokio::test]
async fn test_set_name_broadcasts_composed_greeting() {
    let client = presence();
    let mut peers = connect(&client, 2).await;

    client.set_greeting("Hi".to_string()).await.unwrap();
    client.set_name("Sam".to_string()).await.unwrap();

    for (_, peer) in peers.iter_mut() {
        assert_eq!(peer.next_json(), Some(json!({ "hello": "Hi, World!" })));
        assert_eq!(peer.next_json(), Some(json!({ "hello": "Hi, Sam!" })));
        assert_eq!(peer.next_json(), None);
    }
}

#[tokio::test]
async fn test_message_counts_everyone_and_replies_to_sender() {
    let client = presence();
    let mut peers = connect(&client, 3).await;
    let (sender_id, _) = peers[0];

    client
        .stream_message(sender_id, InboundFrame::Text("hi".to_string()))
        .await
        .unwrap();

    let (_, sender) = &mut peers[0];
    assert_eq!(sender.next_json(), Some(json!({ "users": 3 })));
    assert_eq!(sender.next_json(), Some(json!({ "hello": "Hello, World!" })));
    for (_, other) in peers.iter_mut().skip(1) {
        assert_eq!(other.next_json(), Some(json!({ "users": 3 })));
        assert_eq!(other.next_json(), None);
    }
}

#[tokio::test(start_paused = true)]
async fn test_recount_after_close_is_deferred() {
    let client = presence();
    let mut peers = connect(&client, 3).await;
    let (closing, mut closed_peer) = peers.remove(0);

    let closed_at = Instant::now();
    client
        .stream_closed(closing, CloseEvent::clean(1000, "bye"))
        .await
        .unwrap();

    assert_eq!(
        closed_peer.next_frame(),
        Some(OutboundFrame::Close {
            code: 1000,
            reason: "Greeter object is closing stream".to_string()
        })
    );
    // Nothing is announced from inside the close callback.
    for (_, peer) in peers.iter_mut() {
        assert_eq!(peer.next_json(), None);
    }

    for (_, peer) in peers.iter_mut() {
        let frame = peer.recv_json(Duration::from_secs(5)).await;
        assert_eq!(frame, Some(json!({ "users": 2 })));
    }
    assert!(closed_at.elapsed() >= DEFAULT_RECOUNT_DELAY);
    assert_eq!(closed_peer.next_frame(), None);
}

#[tokio::test(start_paused = true)]
async fn test_double_close_is_harmless() {
    let client = presence();
    let mut peers = connect(&client, 2).await;
    let (closing, _) = peers[0];

    client
        .stream_closed(closing, CloseEvent::abnormal())
        .await
        .unwrap();
    client
        .stream_closed(closing, CloseEvent::abnormal())
        .await
        .unwrap();

    let (_, closed_peer) = &mut peers[0];
    assert!(matches!(
        closed_peer.next_frame(),
        Some(OutboundFrame::Close { code: 1000, .. })
    ));
    assert_eq!(closed_peer.next_frame(), None);

    let (_, remaining) = &mut peers[1];
    assert_eq!(
        remaining.recv_json(Duration::from_secs(5)).await,
        Some(json!({ "users": 1 }))
    );
    assert_eq!(remaining.recv_json(Duration::from_secs(5)).await, None);
}

#[tokio::test]
async fn test_failed_put_broadcasts_nothing() {
    let store = Arc::new(FlakyStore::new());
    let client = spawn(Greeter::default(), store.clone());
    let mut peers = connect(&client, 2).await;

    store.fail_puts(true);
    let result = client.set_greeting("Hi".to_string()).await;

    assert!(matches!(
        result,
        Err(GreeterError::Storage(StoreError::Unavailable(_)))
    ));
    for (_, peer) in peers.iter_mut() {
        assert_eq!(peer.next_json(), None);
    }

    store.fail_puts(false);
    assert_eq!(client.get_greeting().await.unwrap(), "Hello");
    assert_eq!(store.puts(), 0);
}

#[tokio::test]
async fn test_failed_get_fails_only_that_call() {
    let store = Arc::new(FlakyStore::new());
    let client = spawn(Greeter::default(), store.clone());

    store.fail_gets(true);
    assert!(matches!(
        client.say_hello(None).await,
        Err(GreeterError::Storage(_))
    ));

    store.fail_gets(false);
    assert_eq!(client.say_hello(None).await.unwrap(), "Hello, World!");
}

#[tokio::test]
async fn test_dead_connection_does_not_block_others() {
    let client = presence();
    let mut peers = connect(&client, 3).await;
    let (_, dead) = peers.remove(1);
    drop(dead);

    client.set_greeting("Hi".to_string()).await.unwrap();

    for (_, peer) in peers.iter_mut() {
        assert_eq!(peer.next_json(), Some(json!({ "hello": "Hi, World!" })));
    }
    // The dead connection was evicted during the broadcast.
    assert_eq!(client.broadcast_users(0).await.unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_close_after_eviction_still_recounts() {
    let client = presence();
    let mut peers = connect(&client, 3).await;
    let (dead_id, dead) = peers.remove(1);
    drop(dead);

    client.set_greeting("Hi".to_string()).await.unwrap();
    for (_, peer) in peers.iter_mut() {
        assert_eq!(peer.next_json(), Some(json!({ "hello": "Hi, World!" })));
    }

    client
        .stream_closed(dead_id, CloseEvent::abnormal())
        .await
        .unwrap();
    for (_, peer) in peers.iter_mut() {
        assert_eq!(
            peer.recv_json(Duration::from_secs(5)).await,
            Some(json!({ "users": 2 }))
        );
    }

    // A repeated close stays a no-op.
    client
        .stream_closed(dead_id, CloseEvent::abnormal())
        .await
        .unwrap();
    assert_eq!(peers[0].1.recv_json(Duration::from_secs(5)).await, None);
}

#[tokio::test]
async fn test_broadcast_users_saturates_at_zero() {
    let client = presence();
    let mut peers = connect(&client, 1).await;

    assert_eq!(client.broadcast_users(-5).await.unwrap(), 0);
    assert_eq!(peers[0].1.next_json(), Some(json!({ "users": 0 })));
    assert_eq!(client.broadcast_users(1).await.unwrap(), 2);
    assert_eq!(
        client.broadcast_users(i64::MAX).await.unwrap(),
        usize::try_from(i64::MAX).unwrap_or(usize::MAX)
    );
    assert_eq!(client.broadcast_users(i64::MIN).await.unwrap(), 0);
}

#[tokio::test]
async fn test_state_survives_restart_connections_do_not() {
    let namespace = greeter::namespace(Arc::new(MemoryStore::new()), Greeter::default(), 8);
    let client = GreeterClient::new(namespace.get("foo"));
    client.set_greeting("Hey".to_string()).await.unwrap();
    let mut peers = connect(&client, 1).await;

    assert!(namespace.evict("foo").await.unwrap());
    assert_eq!(
        peers[0].1.next_frame(),
        Some(OutboundFrame::Close {
            code: 1001,
            reason: "Greeter object is closing stream".to_string()
        })
    );

    let resumed = GreeterClient::new(namespace.get("foo"));
    assert_eq!(resumed.get_greeting().await.unwrap(), "Hey");
    assert_eq!(resumed.broadcast_users(0).await.unwrap(), 0);
    namespace.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_basic_flavor_protocol() {
    let client = spawn(
        Greeter::new(Flavor::Basic, DEFAULT_RECOUNT_DELAY),
        Arc::new(MemoryStore::new()),
    );
    let (sender, mut peer) = test_peer();
    let (other_sender, mut other) = test_peer();
    let id = client.accept_stream(sender).await.unwrap();
    client.accept_stream(other_sender).await.unwrap();

    // No welcome.
    assert_eq!(peer.next_json(), None);

    client
        .stream_message(id, InboundFrame::Binary(vec![1, 2, 3]))
        .await
        .unwrap();
    assert_eq!(peer.next_json(), Some(json!({ "hello": "world" })));
    assert_eq!(other.next_json(), None);

    client.set_greeting("Hi".to_string()).await.unwrap();
    assert_eq!(peer.next_json(), Some(json!({ "greeting": "Hi" })));
    assert_eq!(other.next_json(), Some(json!({ "greeting": "Hi" })));

    // No recount either.
    client
        .stream_closed(id, CloseEvent::clean(1000, ""))
        .await
        .unwrap();
    assert_eq!(other.recv_json(Duration::from_secs(5)).await, None);
}

#[tokio::test]
async fn test_basic_flavor_has_no_name() {
    let client = spawn(
        Greeter::new(Flavor::Basic, DEFAULT_RECOUNT_DELAY),
        Arc::new(MemoryStore::new()),
    );

    assert!(matches!(
        client.get_name().await,
        Err(GreeterError::Unsupported(_))
    ));
    assert!(matches!(
        client.set_name("Sam".to_string()).await,
        Err(GreeterError::Unsupported(_))
    ));
    assert!(matches!(
        client.say_hello(None).await,
        Err(GreeterError::MissingName)
    ));
    assert_eq!(
        client.say_hello(Some("Sam".to_string())).await.unwrap(),
        "Hello, Sam!"
    );
}
