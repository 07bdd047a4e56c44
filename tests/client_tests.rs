//! Integration-style client tests for the Steam chat client.
//!
//! Uses the shared `MockTransport` from `tests/common` to script endpoint
//! replies and verify that `ChatClient` drives the logon, poll, reconnect
//! and disconnect lifecycle correctly, including event delivery order.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use steam_chat_client::protocol::{LOGOFF_RESOURCE, LOGON_RESOURCE, MESSAGE_RESOURCE, POLL_RESOURCE};
use steam_chat_client::{
    ChatClient, ChatConfig, ChatEvent, ConnectionState, PersonaState, SteamError,
};
use tokio::sync::mpsc::Receiver;
use tokio_test::{assert_pending, task};

use common::{
    ack_json, fast_config, form_field, friend, logon_json, next_event, owner, poll_json,
    poll_timeout_json, presence_item, start_client, summary, text_item, MockTransport,
    StaticDirectory, SESSION_ID,
};

// ════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════

fn empty_directory() -> Arc<StaticDirectory> {
    Arc::new(StaticDirectory::default())
}

/// Log on and consume events up to and including `Connected`.
async fn log_on_until_connected(client: &mut ChatClient, events: &mut Receiver<ChatEvent>) {
    client.log_on().await.expect("log_on");
    assert_eq!(
        next_event(events).await,
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
    assert_eq!(
        next_event(events).await,
        ChatEvent::StateChanged(ConnectionState::Connected)
    );
}

/// Wait until `resource` has seen `count` requests.
async fn wait_for_requests(transport: &MockTransport, resource: &str, count: usize) {
    for _ in 0..1000 {
        if transport.requests_to(resource).len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{resource} never saw {count} requests");
}

fn poll_cursor(transport: &MockTransport, index: usize) -> i64 {
    let polls = transport.requests_to(POLL_RESOURCE);
    form_field(&polls[index], "message").unwrap().parse().unwrap()
}

// ════════════════════════════════════════════════════════════════════
// Sequence cursor
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn cursor_follows_each_poll_and_never_decreases() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(95))
        .ok(POLL_RESOURCE, poll_json(100, serde_json::json!([text_item(friend(1), 10, "a")])))
        .ok(POLL_RESOURCE, poll_json(105, serde_json::json!([text_item(friend(1), 11, "b")])))
        .ok(POLL_RESOURCE, poll_json(110, serde_json::json!([text_item(friend(1), 12, "c")])))
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) = start_client(&transport, empty_directory(), fast_config());

    log_on_until_connected(&mut client, &mut events).await;

    for _ in 0..3 {
        let event = next_event(&mut events).await;
        assert!(matches!(event, ChatEvent::MessagesReceived { .. }), "got {event:?}");
    }

    wait_for_requests(&transport, POLL_RESOURCE, 4).await;
    let cursors: Vec<i64> = (0..4).map(|i| poll_cursor(&transport, i)).collect();
    assert_eq!(cursors, vec![95, 100, 105, 110]);
    assert_eq!(client.session().await.unwrap().last_message_seq, 110);

    client.disconnect().await;
}

#[tokio::test]
async fn slow_consumer_loses_no_messages() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(95))
        .ok(POLL_RESOURCE, poll_json(100, serde_json::json!([text_item(friend(1), 10, "first")])))
        .ok(POLL_RESOURCE, poll_json(105, serde_json::json!([text_item(friend(1), 11, "second")])))
        .ok(LOGOFF_RESOURCE, ack_json());
    let config = fast_config().with_event_channel_capacity(2);
    let (mut client, mut events) = start_client(&transport, empty_directory(), config);

    client.log_on().await.unwrap();
    // Let the poll cycle run into the full channel before reading anything.
    wait_for_requests(&transport, POLL_RESOURCE, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.session().await.unwrap().last_message_seq, 95);

    let mut delivered = Vec::new();
    while delivered.len() < 2 {
        if let ChatEvent::MessagesReceived { messages, .. } = next_event(&mut events).await {
            delivered.extend(messages.into_iter().filter_map(|m| m.text));
        }
    }
    assert_eq!(delivered, vec!["first", "second"]);

    wait_for_requests(&transport, POLL_RESOURCE, 3).await;
    assert_eq!(poll_cursor(&transport, 2), 105);

    client.disconnect().await;
}

#[tokio::test]
async fn timeout_poll_keeps_cursor_and_connects() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(42))
        .ok(POLL_RESOURCE, poll_timeout_json())
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) = start_client(&transport, empty_directory(), fast_config());

    log_on_until_connected(&mut client, &mut events).await;
    wait_for_requests(&transport, POLL_RESOURCE, 2).await;

    assert_eq!(poll_cursor(&transport, 0), 42);
    assert_eq!(poll_cursor(&transport, 1), 42);
    assert_eq!(client.session().await.unwrap().last_message_seq, 42);

    client.disconnect().await;
}

#[tokio::test]
async fn poll_carries_session_wait_budget_and_long_timeout() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) = start_client(&transport, empty_directory(), fast_config());

    client.log_on().await.unwrap();
    let _ = next_event(&mut events).await; // Connecting
    wait_for_requests(&transport, POLL_RESOURCE, 1).await;

    let poll = &transport.requests_to(POLL_RESOURCE)[0];
    assert!(poll.uri.ends_with("?access_token=test-token"));
    assert_eq!(form_field(poll, "umqid").as_deref(), Some(SESSION_ID));
    assert_eq!(form_field(poll, "sectimeout").as_deref(), Some("20"));
    assert!(poll.timeout > Duration::from_secs(20));

    client.disconnect().await;
}

// ════════════════════════════════════════════════════════════════════
// Demultiplexing
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn out_of_order_batch_is_delivered_sorted() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(
            POLL_RESOURCE,
            poll_json(
                4,
                serde_json::json!([
                    text_item(friend(1), 1_700_000_030, "third"),
                    text_item(friend(1), 1_700_000_010, "first"),
                    text_item(friend(2), 1_700_000_020, "second"),
                ]),
            ),
        )
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) = start_client(&transport, empty_directory(), fast_config());

    log_on_until_connected(&mut client, &mut events).await;

    match next_event(&mut events).await {
        ChatEvent::MessagesReceived {
            messages,
            server_timestamp,
        } => {
            let texts: Vec<_> = messages.iter().map(|m| m.text.as_deref().unwrap()).collect();
            assert_eq!(texts, vec!["first", "second", "third"]);
            assert_eq!(server_timestamp.timestamp(), 1_700_000_100);
        }
        other => panic!("expected MessagesReceived, got {other:?}"),
    }

    client.disconnect().await;
}

#[tokio::test]
async fn own_presence_change_is_ignored() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(
            POLL_RESOURCE,
            poll_json(2, serde_json::json!([presence_item(owner(), 10, 3, "me")])),
        )
        .ok(
            POLL_RESOURCE,
            poll_json(3, serde_json::json!([presence_item(friend(1), 11, 1, "Alice")])),
        )
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) = start_client(&transport, empty_directory(), fast_config());

    log_on_until_connected(&mut client, &mut events).await;

    // The first batch only held our own notification, so the first event
    // comes from the second batch.
    match next_event(&mut events).await {
        ChatEvent::PresenceChanged { notifications, .. } => {
            assert_eq!(notifications.len(), 1);
            assert_eq!(notifications[0].sender, friend(1));
        }
        other => panic!("expected PresenceChanged, got {other:?}"),
    }

    let roster = client.roster().await;
    assert!(!roster.contains(&owner()));
    assert!(roster.contains(&friend(1)));

    client.disconnect().await;
}

#[tokio::test]
async fn roster_is_seeded_and_backfilled() {
    let directory = Arc::new(StaticDirectory {
        friends: vec![friend(1)],
        profiles: vec![summary(friend(1), "Alice"), summary(friend(2), "Bob")],
        ..StaticDirectory::default()
    });
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(
            POLL_RESOURCE,
            poll_json(
                2,
                serde_json::json!([
                    presence_item(friend(1), 10, 0, "Alice"),
                    presence_item(friend(2), 11, 3, "Bobby"),
                ]),
            ),
        )
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) =
        start_client(&transport, Arc::clone(&directory) as _, fast_config());

    log_on_until_connected(&mut client, &mut events).await;
    let seeded = client.roster().await;
    assert_eq!(
        seeded.get(&friend(1)).unwrap().persona_name.as_deref(),
        Some("Alice")
    );

    assert!(matches!(
        next_event(&mut events).await,
        ChatEvent::PresenceChanged { .. }
    ));

    let roster = client.roster().await;
    let alice = roster.get(&friend(1)).unwrap();
    assert_eq!(alice.persona_state, PersonaState::Offline);
    assert_eq!(alice.last_logoff.unwrap().timestamp(), 10);

    let bob = roster.get(&friend(2)).unwrap();
    assert!(bob.profile.is_some(), "unknown sender should be backfilled");

    // One lookup for the seed, one for the unknown sender.
    let lookups = directory.lookups.lock().unwrap().clone();
    assert_eq!(lookups, vec![vec![friend(1)], vec![friend(2)]]);

    client.disconnect().await;
}

// ════════════════════════════════════════════════════════════════════
// Sending
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn send_message_and_typing_post_form_fields() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(MESSAGE_RESOURCE, ack_json())
        .ok(MESSAGE_RESOURCE, ack_json())
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, _events) = start_client(&transport, empty_directory(), fast_config());
    client.log_on().await.unwrap();

    client.send_message(friend(1), "hello world").await.unwrap();
    client.send_typing(friend(1)).await.unwrap();

    let sent = transport.requests_to(MESSAGE_RESOURCE);
    assert_eq!(form_field(&sent[0], "umqid").as_deref(), Some(SESSION_ID));
    assert_eq!(form_field(&sent[0], "type").as_deref(), Some("saytext"));
    assert_eq!(
        form_field(&sent[0], "steamid_dst"),
        Some(friend(1).to_string())
    );
    assert_eq!(form_field(&sent[0], "text").as_deref(), Some("hello%20world"));
    assert_eq!(form_field(&sent[1], "type").as_deref(), Some("typing"));
    assert!(form_field(&sent[1], "text").is_none());

    client.disconnect().await;
}

#[tokio::test]
async fn rejected_message_surfaces_authentication_error() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(MESSAGE_RESOURCE, r#"{"error":"Not Logged On"}"#)
        .status(MESSAGE_RESOURCE, 503, "Service Unavailable")
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, _events) = start_client(&transport, empty_directory(), fast_config());
    client.log_on().await.unwrap();

    let err = client.send_message(friend(1), "hi").await.unwrap_err();
    assert!(err.is_unauthorized(), "got {err:?}");

    let err = client.send_message(friend(1), "hi").await.unwrap_err();
    let request_err = err.request_error().unwrap();
    assert!(request_err.is_request_issue());
    assert_eq!(request_err.status_code(), 503);

    client.disconnect().await;
}

// ════════════════════════════════════════════════════════════════════
// Disconnect and reconnect
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn manual_disconnect_cancels_poll_and_never_reconnects() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(POLL_RESOURCE, poll_timeout_json())
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) = start_client(&transport, empty_directory(), ChatConfig::new());

    client.log_on().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connected)
    );
    // Second poll is in flight and will never be answered.
    wait_for_requests(&transport, POLL_RESOURCE, 2).await;

    client.disconnect().await;

    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Disconnected)
    );
    assert!(matches!(
        events.recv().await.unwrap(),
        ChatEvent::Disconnected { manual: true, .. }
    ));
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(client.session().await.is_none());

    let logoff = transport.requests_to(LOGOFF_RESOURCE);
    assert_eq!(logoff.len(), 1);
    assert_eq!(form_field(&logoff[0], "umqid").as_deref(), Some(SESSION_ID));

    // Well past the reconnect interval: nothing happens.
    tokio::time::sleep(Duration::from_secs(60)).await;
    let mut next = task::spawn(events.recv());
    assert_pending!(next.poll());
    drop(next);
    assert_eq!(transport.requests_to(LOGON_RESOURCE).len(), 1);
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn unexpected_disconnect_reconnects_after_backoff() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .status(POLL_RESOURCE, 404, "Not Found")
        .ok(LOGON_RESOURCE, logon_json(50))
        .ok(LOGOFF_RESOURCE, ack_json());
    let config = ChatConfig::new().with_reconnect_interval(Duration::from_secs(10));
    let (mut client, mut events) = start_client(&transport, empty_directory(), config);

    client.log_on().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Disconnected)
    );
    assert!(matches!(
        events.recv().await.unwrap(),
        ChatEvent::Disconnected { manual: false, .. }
    ));

    let dropped_at = tokio::time::Instant::now();
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
    assert!(dropped_at.elapsed() >= Duration::from_secs(10));

    wait_for_requests(&transport, POLL_RESOURCE, 2).await;
    assert_eq!(transport.requests_to(LOGON_RESOURCE).len(), 2);
    // The new session's cursor is used.
    assert_eq!(poll_cursor(&transport, 1), 50);

    client.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn failed_reconnect_handshake_backs_off_and_retries() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .status(POLL_RESOURCE, 404, "Not Found")
        .status(LOGON_RESOURCE, 503, "Service Unavailable")
        .ok(LOGON_RESOURCE, logon_json(60))
        .ok(LOGOFF_RESOURCE, ack_json());
    let config = ChatConfig::new().with_reconnect_interval(Duration::from_secs(10));
    let (mut client, mut events) = start_client(&transport, empty_directory(), config);

    client.log_on().await.unwrap();
    let _ = events.recv().await; // Connecting
    let _ = events.recv().await; // StateChanged(Disconnected)
    assert!(matches!(
        events.recv().await.unwrap(),
        ChatEvent::Disconnected { manual: false, .. }
    ));
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Disconnected)
    );
    match events.recv().await.unwrap() {
        ChatEvent::Disconnected { reason, manual } => {
            assert!(!manual);
            assert!(reason.unwrap().contains("503"));
        }
        other => panic!("expected Disconnected, got {other:?}"),
    }

    // The dead session is gone while waiting to reconnect.
    assert!(client.session().await.is_none());
    assert!(matches!(
        client.send_message(friend(1), "hi").await,
        Err(SteamError::NotConnected)
    ));
    assert!(transport.requests_to(MESSAGE_RESOURCE).is_empty());

    let failed_at = tokio::time::Instant::now();
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
    assert!(failed_at.elapsed() >= Duration::from_secs(10));

    wait_for_requests(&transport, POLL_RESOURCE, 2).await;
    assert_eq!(transport.requests_to(LOGON_RESOURCE).len(), 3);
    assert_eq!(poll_cursor(&transport, 1), 60);
    assert_eq!(client.session().await.unwrap().last_message_seq, 60);

    client.disconnect().await;
}

#[tokio::test(start_paused = true)]
async fn unauthorized_reconnect_handshake_is_fatal() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .status(POLL_RESOURCE, 404, "Not Found")
        .status(LOGON_RESOURCE, 401, "Unauthorized");
    let (mut client, mut events) = start_client(&transport, empty_directory(), ChatConfig::new());

    client.log_on().await.unwrap();
    let _ = events.recv().await; // Connecting
    let _ = events.recv().await; // StateChanged(Disconnected)
    let _ = events.recv().await; // Disconnected after the 404
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Disconnected)
    );
    match events.recv().await.unwrap() {
        ChatEvent::Disconnected { reason, manual } => {
            assert!(!manual);
            assert!(reason.unwrap().starts_with("authentication failed"));
        }
        other => panic!("expected Disconnected, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(transport.requests_to(LOGON_RESOURCE).len(), 2);
    assert!(client.session().await.is_none());
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn disconnect_does_not_hang_on_a_full_channel() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(POLL_RESOURCE, poll_json(2, serde_json::json!([text_item(friend(1), 10, "x")])))
        .ok(LOGOFF_RESOURCE, ack_json());
    let config = ChatConfig::new()
        .with_event_channel_capacity(1)
        .with_shutdown_timeout(Duration::from_millis(100));
    let (mut client, mut events) = start_client(&transport, empty_directory(), config);

    // Nobody reads: Connecting fills the channel and the batch waits for room.
    client.log_on().await.unwrap();
    wait_for_requests(&transport, POLL_RESOURCE, 1).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    tokio::time::timeout(Duration::from_secs(5), client.disconnect())
        .await
        .expect("disconnect hung on a full event channel");

    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(transport.requests_to(LOGOFF_RESOURCE).len(), 1);
    assert_eq!(
        events.recv().await.unwrap(),
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );
}

#[tokio::test(start_paused = true)]
async fn failure_without_auto_reconnect_stays_disconnected() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .status(POLL_RESOURCE, 500, "Internal Server Error");
    let config = ChatConfig::new().with_auto_reconnect(false);
    let (mut client, mut events) = start_client(&transport, empty_directory(), config);

    client.log_on().await.unwrap();
    let _ = events.recv().await; // Connecting
    let _ = events.recv().await; // StateChanged(Disconnected)
    match events.recv().await.unwrap() {
        ChatEvent::Disconnected { reason, manual } => {
            assert!(!manual);
            assert!(reason.unwrap().contains("500"));
        }
        other => panic!("expected Disconnected, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(transport.requests_to(LOGON_RESOURCE).len(), 1);
    assert!(client.session().await.is_none());
    assert!(matches!(
        client.send_message(friend(1), "hi").await,
        Err(SteamError::NotConnected)
    ));

    // A finished connection can be started again.
    transport.ok(LOGON_RESOURCE, logon_json(9));
    client.log_on().await.unwrap();
    assert_eq!(transport.requests_to(LOGON_RESOURCE).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_poll_is_fatal_even_with_auto_reconnect() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .status(POLL_RESOURCE, 401, "Unauthorized");
    let (mut client, mut events) = start_client(&transport, empty_directory(), ChatConfig::new());

    client.log_on().await.unwrap();
    let _ = events.recv().await; // Connecting
    let _ = events.recv().await; // StateChanged(Disconnected)
    match events.recv().await.unwrap() {
        ChatEvent::Disconnected { reason, manual } => {
            assert!(!manual);
            assert!(reason.unwrap().starts_with("authentication failed"));
        }
        other => panic!("expected Disconnected, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(transport.requests_to(LOGON_RESOURCE).len(), 1);
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn error_status_token_ends_cycle_and_reconnects() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(POLL_RESOURCE, r#"{"error":"Server Busy"}"#)
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, mut events) = start_client(&transport, empty_directory(), fast_config());

    client.log_on().await.unwrap();
    let _ = next_event(&mut events).await; // Connecting
    let _ = next_event(&mut events).await; // StateChanged(Disconnected)
    match next_event(&mut events).await {
        ChatEvent::Disconnected { reason, .. } => assert!(reason.unwrap().contains("Server Busy")),
        other => panic!("expected Disconnected, got {other:?}"),
    }
    assert_eq!(
        next_event(&mut events).await,
        ChatEvent::StateChanged(ConnectionState::Connecting)
    );

    client.disconnect().await;
}

#[tokio::test]
async fn state_watch_tracks_transitions() {
    let transport = MockTransport::new();
    transport
        .ok(LOGON_RESOURCE, logon_json(1))
        .ok(POLL_RESOURCE, poll_timeout_json())
        .ok(LOGOFF_RESOURCE, ack_json());
    let (mut client, _events) = start_client(&transport, empty_directory(), fast_config());
    let mut state = client.subscribe_state();
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);

    client.log_on().await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::Connected),
    )
    .await
    .unwrap()
    .unwrap();

    client.disconnect().await;
    assert_eq!(*state.borrow_and_update(), ConnectionState::Disconnected);
}
