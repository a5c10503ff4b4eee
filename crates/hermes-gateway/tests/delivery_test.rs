/// Delivery coordinator tests: the gate -> append -> broadcast contract,
/// exercised against an in-memory store and the real dispatcher, no sockets.
use std::sync::Arc;

use hermes_db::{Database, StoreError};
use hermes_gateway::{DeliveryCoordinator, Dispatcher, SendError, connection};
use hermes_types::events::{GatewayCommand, GatewayEvent};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::mpsc;

fn coordinator_with_friends() -> DeliveryCoordinator {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.create_user("id-1", "alice", "hash").unwrap();
    db.create_user("id-2", "bob", "hash").unwrap();
    db.create_user("id-3", "carol", "hash").unwrap();
    db.add_friendship("alice", "bob").unwrap();
    DeliveryCoordinator::new(db, Dispatcher::new())
}

#[tokio::test]
async fn authorized_send_persists_and_broadcasts() {
    let coordinator = coordinator_with_friends();
    let (_, mut rx) = coordinator.dispatcher().register().await;

    let sent = coordinator.send("alice", "bob", "hi").await.unwrap();
    assert_eq!(sent.sender, "alice");
    assert_eq!(sent.receiver, "bob");
    assert_eq!(sent.content, "hi");

    match rx.try_recv().unwrap() {
        GatewayEvent::ReceiveMessage {
            id,
            sender,
            receiver,
            content,
            created_at,
        } => {
            assert_eq!(id, sent.id);
            assert_eq!(sender, "alice");
            assert_eq!(receiver, "bob");
            assert_eq!(content, "hi");
            assert_eq!(created_at, sent.created_at);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn unauthorized_send_leaves_no_trace() {
    let coordinator = coordinator_with_friends();
    let (_, mut rx) = coordinator.dispatcher().register().await;

    // alice and carol are not friends
    let err = coordinator.send("alice", "carol", "hi").await.unwrap_err();
    assert!(matches!(err, SendError::Forbidden));

    assert!(coordinator.conversation("alice", "carol").await.unwrap().is_empty());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn friendship_is_checked_per_direction_of_the_same_pair() {
    let coordinator = coordinator_with_friends();

    // The symmetric relation authorizes both directions
    coordinator.send("alice", "bob", "ping").await.unwrap();
    coordinator.send("bob", "alice", "pong").await.unwrap();

    let convo = coordinator.conversation("alice", "bob").await.unwrap();
    let contents: Vec<&str> = convo.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["ping", "pong"]);
}

#[tokio::test]
async fn unknown_sender_is_a_store_error() {
    let coordinator = coordinator_with_friends();
    let err = coordinator.send("ghost", "bob", "hi").await.unwrap_err();
    assert!(matches!(err, SendError::Store(StoreError::UserNotFound(_))));
}

#[tokio::test]
async fn sent_message_round_trips_verbatim() {
    let coordinator = coordinator_with_friends();

    let sent = coordinator.send("alice", "bob", "exact content ✓").await.unwrap();

    let convo = coordinator.conversation("alice", "bob").await.unwrap();
    assert_eq!(convo.len(), 1);
    assert_eq!(convo[0].id, sent.id);
    assert_eq!(convo[0].sender, "alice");
    assert_eq!(convo[0].receiver, "bob");
    assert_eq!(convo[0].content, "exact content ✓");
}

#[tokio::test]
async fn every_session_receives_every_publish_in_order() {
    let coordinator = coordinator_with_friends();
    let dispatcher = coordinator.dispatcher();
    let (_, mut rx1) = dispatcher.register().await;
    let (_, mut rx2) = dispatcher.register().await;
    assert_eq!(dispatcher.session_count().await, 2);

    coordinator.send("alice", "bob", "one").await.unwrap();
    coordinator.send("bob", "alice", "two").await.unwrap();

    for rx in [&mut rx1, &mut rx2] {
        for expected in ["one", "two"] {
            match rx.try_recv().unwrap() {
                GatewayEvent::ReceiveMessage { content, .. } => assert_eq!(content, expected),
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }
}

#[tokio::test]
async fn rejected_gateway_send_replies_only_to_the_emitter() {
    let coordinator = coordinator_with_friends();
    let (_, mut broadcast_rx) = coordinator.dispatcher().register().await;
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

    // alice and carol are not friends
    connection::handle_command(
        &coordinator,
        GatewayCommand::SendMessage {
            sender: "alice".into(),
            receiver: "carol".into(),
            content: "hi".into(),
        },
        &reply_tx,
    )
    .await;

    // The emitting session hears the rejection...
    match reply_rx.try_recv().unwrap() {
        GatewayEvent::SendRejected { reason } => assert!(reason.contains("friends")),
        other => panic!("unexpected event: {:?}", other),
    }

    // ...and nobody else hears anything, nothing was persisted
    assert!(matches!(broadcast_rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(coordinator.conversation("alice", "carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn accepted_gateway_send_broadcasts_without_a_reply() {
    let coordinator = coordinator_with_friends();
    let (_, mut broadcast_rx) = coordinator.dispatcher().register().await;
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

    connection::handle_command(
        &coordinator,
        GatewayCommand::SendMessage {
            sender: "alice".into(),
            receiver: "bob".into(),
            content: "over the wire".into(),
        },
        &reply_tx,
    )
    .await;

    // Success flows through the broadcast fabric, not the reply channel
    assert!(reply_rx.try_recv().is_err());
    match broadcast_rx.try_recv().unwrap() {
        GatewayEvent::ReceiveMessage { sender, content, .. } => {
            assert_eq!(sender, "alice");
            assert_eq!(content, "over the wire");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let convo = coordinator.conversation("alice", "bob").await.unwrap();
    assert_eq!(convo.len(), 1);
    assert_eq!(convo[0].content, "over the wire");
}

#[tokio::test]
async fn late_session_misses_earlier_publishes() {
    let coordinator = coordinator_with_friends();

    coordinator.send("alice", "bob", "before").await.unwrap();

    // No replay: a session registered after a publish never sees it
    let (conn_id, mut rx) = coordinator.dispatcher().register().await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    coordinator.dispatcher().unregister(conn_id).await;
    assert_eq!(coordinator.dispatcher().session_count().await, 0);
}
