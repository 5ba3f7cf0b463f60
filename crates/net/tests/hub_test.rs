//! Hub behavior over in-memory duplex streams.

use std::time::Duration;

use tokio::sync::mpsc;
use partyline_net::frame::{read_frame, write_frame, Frame, KIND_CHAT};
use partyline_net::{Hub, HubEvent};

async fn next_event(events: &mut mpsc::Receiver<HubEvent>) -> HubEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for hub event")
        .expect("event channel closed")
}

#[tokio::test]
async fn attach_posts_connected_event() {
    let (hub, mut events) = Hub::new();
    let (local, _remote) = tokio::io::duplex(1024);

    let id = hub.attach(local, "peer-a".to_string()).await;

    match next_event(&mut events).await {
        HubEvent::Connected { session, label } => {
            assert_eq!(session, id);
            assert_eq!(label, "peer-a");
        }
        other => panic!("expected Connected, got {:?}", other),
    }
    assert_eq!(hub.session_count().await, 1);
}

#[tokio::test]
async fn inbound_frame_becomes_message_event() {
    let (hub, mut events) = Hub::new();
    let (local, mut remote) = tokio::io::duplex(1024);

    hub.attach(local, "peer".to_string()).await;
    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Connected { .. }
    ));

    let frame = Frame::new(KIND_CHAT, b"5551234/hi back".to_vec()).unwrap();
    write_frame(&mut remote, &frame).await.unwrap();

    match next_event(&mut events).await {
        HubEvent::Message { message, .. } => {
            assert_eq!(message.sender, "5551234");
            assert_eq!(message.body, "hi back");
        }
        other => panic!("expected Message, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_payload_is_disconnect_signal() {
    let (hub, mut events) = Hub::new();
    let (local, mut remote) = tokio::io::duplex(1024);

    let id = hub.attach(local, "peer".to_string()).await;
    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Connected { .. }
    ));

    let frame = Frame::new(KIND_CHAT, Vec::new()).unwrap();
    write_frame(&mut remote, &frame).await.unwrap();

    match next_event(&mut events).await {
        HubEvent::Disconnected { session, .. } => assert_eq!(session, id),
        other => panic!("expected Disconnected, got {:?}", other),
    }
    assert_eq!(hub.session_count().await, 0);
}

#[tokio::test]
async fn malformed_payload_closes_session() {
    let (hub, mut events) = Hub::new();
    let (local, mut remote) = tokio::io::duplex(1024);

    hub.attach(local, "peer".to_string()).await;
    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Connected { .. }
    ));

    // No '/' separator
    let frame = Frame::new(KIND_CHAT, b"garbage".to_vec()).unwrap();
    write_frame(&mut remote, &frame).await.unwrap();

    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Disconnected { .. }
    ));
    assert_eq!(hub.session_count().await, 0);
}

#[tokio::test]
async fn broadcast_reaches_every_session() {
    let (hub, mut events) = Hub::new();

    let mut remotes = Vec::new();
    for i in 0..3 {
        let (local, remote) = tokio::io::duplex(1024);
        hub.attach(local, format!("peer-{i}")).await;
        assert!(matches!(
            next_event(&mut events).await,
            HubEvent::Connected { .. }
        ));
        remotes.push(remote);
    }

    let delivered = hub.broadcast(KIND_CHAT, b"5551234/hello").await.unwrap();
    assert_eq!(delivered, 3);

    for remote in &mut remotes {
        let frame = read_frame(remote).await.unwrap();
        assert_eq!(frame.kind(), KIND_CHAT);
        assert_eq!(frame.payload(), b"5551234/hello");
    }
}

#[tokio::test]
async fn broadcast_with_no_sessions_is_not_an_error() {
    let (hub, _events) = Hub::new();
    let delivered = hub.broadcast(KIND_CHAT, b"5551234/hello").await.unwrap();
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn failed_session_does_not_block_the_rest() {
    let (hub, mut events) = Hub::new();

    let (local_a, mut remote_a) = tokio::io::duplex(1024);
    hub.attach(local_a, "peer-a".to_string()).await;
    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Connected { .. }
    ));

    let (local_b, remote_b) = tokio::io::duplex(1024);
    let id_b = hub.attach(local_b, "peer-b".to_string()).await;
    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Connected { .. }
    ));

    // Kill peer B's end of the stream; its read loop notices and
    // deregisters it
    drop(remote_b);
    match next_event(&mut events).await {
        HubEvent::Disconnected { session, .. } => assert_eq!(session, id_b),
        other => panic!("expected Disconnected, got {:?}", other),
    }

    let delivered = hub.broadcast(KIND_CHAT, b"5551234/still here").await.unwrap();
    assert_eq!(delivered, 1);

    let frame = read_frame(&mut remote_a).await.unwrap();
    assert_eq!(frame.payload(), b"5551234/still here");
}

#[tokio::test]
async fn remove_is_idempotent() {
    let (hub, mut events) = Hub::new();
    let (local, _remote) = tokio::io::duplex(1024);

    let id = hub.attach(local, "peer".to_string()).await;
    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Connected { .. }
    ));

    hub.remove(id).await;
    hub.remove(id).await;
    assert_eq!(hub.session_count().await, 0);
}

#[tokio::test]
async fn shutdown_ends_session_read_loops() {
    let (hub, mut events) = Hub::new();
    let (local, mut remote) = tokio::io::duplex(1024);

    hub.attach(local, "peer".to_string()).await;
    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Connected { .. }
    ));

    hub.shutdown();

    assert!(matches!(
        next_event(&mut events).await,
        HubEvent::Disconnected { .. }
    ));

    // The hub side shut its stream down; the remote sees EOF
    let result = read_frame(&mut remote).await;
    assert!(result.is_err());
}
