//! End-to-end scenarios for the synchronization client
//!
//! Every test drives the real client over the scripted [`MockTransport`];
//! no network, no server.

use integration_tests::{
    build_client, message_payload, presence_payload, typing_payload, wait_until, MockTransport,
};
use sync_client::SyncConfig;
use sync_core::{
    ConnectionState, ConversationId, DisconnectReason, MessageKind, Publication, SyncError, UserId,
};
use tokio::sync::broadcast;
use tokio::time::{advance, Duration};

fn conv(id: &str) -> ConversationId {
    ConversationId::from(id)
}

/// Drain every pending `StateChanged` publication from a bus receiver
fn drain_states(rx: &mut broadcast::Receiver<Publication>) -> Vec<ConnectionState> {
    let mut states = Vec::new();
    while let Ok(publication) = rx.try_recv() {
        if let Publication::StateChanged(state) = publication {
            states.push(state);
        }
    }
    states
}

#[tokio::test]
async fn clean_connect_walks_the_full_state_sequence() {
    let transport = MockTransport::new();
    let client = build_client(transport, SyncConfig::default());
    let mut events = client.subscribe();

    client.connect().await.unwrap();

    assert_eq!(client.state(), ConnectionState::Authenticated);
    assert!(client.heartbeat_active());
    assert_eq!(
        drain_states(&mut events),
        vec![
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Authenticated,
        ]
    );
}

#[tokio::test]
async fn rejected_auth_ends_in_error_without_authenticated() {
    let transport = MockTransport::rejecting("token expired");
    let client = build_client(transport, SyncConfig::default());
    let mut events = client.subscribe();

    let err = client.connect().await.unwrap_err();
    match err {
        SyncError::AuthenticationFailed(message) => assert_eq!(message, "token expired"),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(client.state(), ConnectionState::Error);
    assert!(!client.heartbeat_active());

    let states = drain_states(&mut events);
    assert_eq!(
        states,
        vec![
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Error,
        ]
    );
    assert!(!states.contains(&ConnectionState::Authenticated));
}

#[tokio::test]
async fn auth_rejection_is_published_on_the_bus() {
    let transport = MockTransport::rejecting("bad credential");
    let client = build_client(transport, SyncConfig::default());
    let mut events = client.subscribe();

    client.connect().await.unwrap_err();

    let seen = wait_until(|| {
        matches!(
            events.try_recv(),
            Ok(Publication::AuthError { ref message }) if message == "bad credential"
        )
    })
    .await;
    assert!(seen, "AuthError publication never arrived");
}

#[tokio::test(start_paused = true)]
async fn exhausted_dial_budget_surfaces_reconnect_failed() {
    let transport = MockTransport::new();
    transport.fail_next_dials(10);

    let mut config = SyncConfig::default();
    config.reconnect.max_attempts = 3;
    let client = build_client(transport, config);
    let mut events = client.subscribe();

    let err = client.connect().await.unwrap_err();
    match err {
        SyncError::ReconnectExhausted { attempts } => assert_eq!(attempts, 3),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(client.state(), ConnectionState::Error);

    let seen = wait_until(|| {
        matches!(
            events.try_recv(),
            Ok(Publication::ReconnectFailed { attempts: 3 })
        )
    })
    .await;
    assert!(seen, "ReconnectFailed publication never arrived");
}

#[tokio::test(start_paused = true)]
async fn dial_retries_survive_transient_failures() {
    let transport = MockTransport::new();
    transport.fail_next_dials(2);

    let client = build_client(transport, SyncConfig::default());
    client.connect().await.unwrap();

    assert_eq!(client.state(), ConnectionState::Authenticated);
}

#[tokio::test]
async fn messages_sent_before_connect_flush_in_order() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());

    client.send_message(conv("c1"), "one", MessageKind::Text);
    client.send_message(conv("c1"), "two", MessageKind::Text);
    client.send_message(conv("c1"), "three", MessageKind::Text);
    assert_eq!(client.pending_outbound(), 3);

    client.connect().await.unwrap();

    assert!(wait_until(|| transport.emitted_named("message:send").len() == 3).await);
    let contents: Vec<String> = transport
        .emitted_named("message:send")
        .iter()
        .map(|payload| payload["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
    assert_eq!(client.pending_outbound(), 0);
}

#[tokio::test]
async fn overflow_evicts_oldest_and_delivers_the_rest() {
    let transport = MockTransport::new();
    let config = SyncConfig {
        queue_capacity: 2,
        ..SyncConfig::default()
    };
    let client = build_client(transport.clone(), config);

    client.send_message(conv("c1"), "one", MessageKind::Text);
    client.send_message(conv("c1"), "two", MessageKind::Text);
    client.send_message(conv("c1"), "three", MessageKind::Text);
    assert_eq!(client.pending_outbound(), 2);

    client.connect().await.unwrap();

    assert!(wait_until(|| transport.emitted_named("message:send").len() == 2).await);
    let contents: Vec<String> = transport
        .emitted_named("message:send")
        .iter()
        .map(|payload| payload["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["two", "three"]);
}

#[tokio::test(start_paused = true)]
async fn queued_work_replays_exactly_once_after_reconnect() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());

    client.connect().await.unwrap();

    transport.force_disconnect(DisconnectReason::Transient);
    assert!(wait_until(|| client.state() == ConnectionState::Disconnected).await);
    assert!(!client.heartbeat_active());

    client.send_message(conv("c1"), "offline-one", MessageKind::Text);
    client.send_message(conv("c1"), "offline-two", MessageKind::Text);
    assert_eq!(client.pending_outbound(), 2);

    transport.reconnect_and_authenticate();
    assert!(wait_until(|| client.state() == ConnectionState::Authenticated).await);
    assert!(wait_until(|| client.pending_outbound() == 0).await);

    // a send issued after reauthentication lands strictly behind the backlog
    client.send_message(conv("c1"), "online-again", MessageKind::Text);
    assert!(wait_until(|| transport.emitted_named("message:send").len() == 3).await);

    let contents: Vec<String> = transport
        .emitted_named("message:send")
        .iter()
        .map(|payload| payload["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["offline-one", "offline-two", "online-again"]);
}

#[tokio::test(start_paused = true)]
async fn interrupted_flush_keeps_the_remainder_queued() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());

    client.connect().await.unwrap();

    transport.set_send_failures(true);
    client.send_message(conv("c1"), "stuck", MessageKind::Text);

    advance(Duration::from_millis(50)).await;
    assert_eq!(client.pending_outbound(), 1);
    assert!(transport.emitted_named("message:send").is_empty());

    transport.set_send_failures(false);
    transport.force_disconnect(DisconnectReason::Transient);
    assert!(wait_until(|| client.state() == ConnectionState::Disconnected).await);
    transport.reconnect_and_authenticate();

    assert!(wait_until(|| transport.emitted_named("message:send").len() == 1).await);
    assert_eq!(
        transport.emitted_named("message:send")[0]["content"],
        "stuck"
    );
}

#[tokio::test(start_paused = true)]
async fn typing_start_then_stop_emits_one_of_each() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    client.connect().await.unwrap();

    client.start_typing(conv("c1"));
    client.stop_typing(conv("c1"));
    client.stop_typing(conv("c1"));

    assert!(wait_until(|| transport.emitted_named("typing").len() == 2).await);

    // no timer may fire afterward
    advance(Duration::from_secs(10)).await;
    let flags: Vec<bool> = transport
        .emitted_named("typing")
        .iter()
        .map(|payload| payload["isTyping"].as_bool().unwrap())
        .collect();
    assert_eq!(flags, vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn typing_rearm_emits_per_call_and_one_expiry_stop() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    client.connect().await.unwrap();

    client.start_typing(conv("c1"));
    advance(Duration::from_secs(3)).await;
    client.start_typing(conv("c1"));

    // 4s after the re-arm: the original 5s deadline has passed, the
    // superseding timer has not
    advance(Duration::from_secs(4)).await;
    assert!(wait_until(|| transport.emitted_named("typing").len() == 2).await);
    let flags: Vec<bool> = transport
        .emitted_named("typing")
        .iter()
        .map(|payload| payload["isTyping"].as_bool().unwrap())
        .collect();
    assert_eq!(flags, vec![true, true]);

    advance(Duration::from_secs(2)).await;
    assert!(wait_until(|| transport.emitted_named("typing").len() == 3).await);
    let last = &transport.emitted_named("typing")[2];
    assert_eq!(last["isTyping"], false);
}

#[tokio::test]
async fn remote_typing_events_split_into_start_and_stop() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    let mut events = client.subscribe();
    client.connect().await.unwrap();

    transport.inject("typing", typing_payload("c1", "u2", true));
    transport.inject("typing", typing_payload("c1", "u2", false));

    let mut seen = Vec::new();
    assert!(
        wait_until(|| {
            while let Ok(publication) = events.try_recv() {
                match publication {
                    Publication::UserTyping { .. } => seen.push("start"),
                    Publication::UserStoppedTyping { .. } => seen.push("stop"),
                    _ => {}
                }
            }
            seen.len() == 2
        })
        .await
    );
    assert_eq!(seen, vec!["start", "stop"]);
}

#[tokio::test]
async fn presence_lookups_reflect_the_latest_signal() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    client.connect().await.unwrap();

    assert!(client.get_presence(&UserId::from("u2")).is_none());

    transport.inject("presence:update", presence_payload("u2", true, None));
    assert!(
        wait_until(|| client
            .get_presence(&UserId::from("u2"))
            .is_some_and(|entry| entry.online))
        .await
    );

    transport.inject(
        "presence:update",
        presence_payload("u2", false, Some("2026-03-01T09:45:00Z")),
    );
    assert!(
        wait_until(|| {
            client.get_presence(&UserId::from("u2")).is_some_and(|entry| {
                !entry.online
                    && entry.last_seen.is_some_and(|seen| {
                        seen == "2026-03-01T09:45:00Z"
                            .parse::<chrono::DateTime<chrono::Utc>>()
                            .unwrap()
                    })
            })
        })
        .await
    );

    let entries = client.get_many_presence(&[UserId::from("u1"), UserId::from("u2")]);
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn inbound_messages_are_republished() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    let mut events = client.subscribe();
    client.connect().await.unwrap();

    transport.inject("message:new", message_payload("m1", "c1", "u2", "hello"));

    let mut received = None;
    assert!(
        wait_until(|| {
            while let Ok(publication) = events.try_recv() {
                if let Publication::MessageReceived(message) = publication {
                    received = Some(message);
                }
            }
            received.is_some()
        })
        .await
    );

    let message = received.unwrap();
    assert_eq!(message.content, "hello");
    assert_eq!(message.conversation_id, conv("c1"));
}

#[tokio::test]
async fn join_and_leave_track_a_single_room() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    client.connect().await.unwrap();

    // leaving with no room joined emits nothing
    client.leave_conversation();

    client.join_conversation(conv("c1"));
    client.join_conversation(conv("c1")); // rejoin is a no-op
    assert_eq!(client.current_conversation(), Some(conv("c1")));

    client.join_conversation(conv("c2")); // implies leaving c1
    client.leave_conversation();
    assert_eq!(client.current_conversation(), None);

    assert!(
        wait_until(|| {
            transport.emitted_named("conversation:join").len() == 2
                && transport.emitted_named("conversation:leave").len() == 2
        })
        .await
    );

    let joins: Vec<String> = transport
        .emitted_named("conversation:join")
        .iter()
        .map(|payload| payload["conversationId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(joins, vec!["c1", "c2"]);

    let leaves: Vec<String> = transport
        .emitted_named("conversation:leave")
        .iter()
        .map(|payload| payload["conversationId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(leaves, vec!["c1", "c2"]);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_refreshes_presence_while_authenticated() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    client.connect().await.unwrap();
    assert!(client.heartbeat_active());

    advance(Duration::from_secs(61)).await;
    assert!(wait_until(|| !transport.emitted_named("presence:refresh").is_empty()).await);

    transport.force_disconnect(DisconnectReason::Transient);
    assert!(wait_until(|| !client.heartbeat_active()).await);
    let beats = transport.emitted_named("presence:refresh").len();

    advance(Duration::from_secs(180)).await;
    assert_eq!(transport.emitted_named("presence:refresh").len(), beats);
}

#[tokio::test(start_paused = true)]
async fn explicit_disconnect_cancels_typing_and_keeps_the_queue() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    client.connect().await.unwrap();

    client.join_conversation(conv("c1"));
    assert!(wait_until(|| transport.emitted_named("conversation:join").len() == 1).await);

    client.start_typing(conv("c1"));
    assert!(wait_until(|| transport.emitted_named("typing").len() == 1).await);

    client.send_message(conv("c1"), "parting words", MessageKind::Text);
    client.disconnect().await;

    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(!client.heartbeat_active());
    assert_eq!(client.current_conversation(), None);

    // the stop signal for the cancelled timer and any unsent work stay queued
    assert!(client.pending_outbound() >= 1);

    // no typing timer may fire after disconnect
    let typing_before = transport.emitted_named("typing").len();
    advance(Duration::from_secs(10)).await;
    assert_eq!(transport.emitted_named("typing").len(), typing_before);

    // reconnecting resumes the pending work
    client.connect().await.unwrap();
    assert!(wait_until(|| client.pending_outbound() == 0).await);
    assert_eq!(
        transport.emitted_named("message:send").len(),
        1,
        "queued message delivered exactly once"
    );
}

#[tokio::test(start_paused = true)]
async fn full_reconnect_scenario_delivers_in_order() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    let mut events = client.subscribe();

    client.connect().await.unwrap();
    assert_eq!(client.state(), ConnectionState::Authenticated);
    assert!(client.heartbeat_active());

    transport.force_disconnect(DisconnectReason::Transient);
    assert!(wait_until(|| client.state() == ConnectionState::Disconnected).await);

    client.send_message(conv("c1"), "hi", MessageKind::Text);
    assert_eq!(client.pending_outbound(), 1);
    assert!(transport.emitted_named("message:send").is_empty());

    transport.reconnect_and_authenticate();
    assert!(wait_until(|| client.state() == ConnectionState::Authenticated).await);

    client.send_message(conv("c1"), "back online", MessageKind::Text);

    assert!(wait_until(|| transport.emitted_named("message:send").len() == 2).await);
    let contents: Vec<String> = transport
        .emitted_named("message:send")
        .iter()
        .map(|payload| payload["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["hi", "back online"]);

    // the bus reported the round trip
    let states = drain_states(&mut events);
    assert!(states.contains(&ConnectionState::Disconnected));
    assert_eq!(states.last(), Some(&ConnectionState::Authenticated));
}

#[tokio::test]
async fn server_errors_are_republished_verbatim() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    let mut events = client.subscribe();
    client.connect().await.unwrap();

    transport.inject(
        "error",
        serde_json::json!({ "code": "RATE_LIMITED", "message": "slow down" }),
    );

    let mut seen = false;
    assert!(
        wait_until(|| {
            while let Ok(publication) = events.try_recv() {
                if let Publication::ServerError(error) = publication {
                    assert_eq!(error.code.as_deref(), Some("RATE_LIMITED"));
                    assert_eq!(error.message, "slow down");
                    seen = true;
                }
            }
            seen
        })
        .await
    );
}

#[tokio::test]
async fn unknown_inbound_events_are_ignored() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());
    client.connect().await.unwrap();

    transport.inject("gamification:badge", serde_json::json!({ "id": "b1" }));
    transport.inject("message:new", message_payload("m1", "c1", "u2", "still fine"));

    let mut events = client.subscribe();
    transport.inject("message:new", message_payload("m2", "c1", "u2", "after"));

    assert!(
        wait_until(|| {
            matches!(
                events.try_recv(),
                Ok(Publication::MessageReceived(ref message)) if message.content == "after"
            )
        })
        .await,
        "client kept processing after an unknown event"
    );
}

#[tokio::test]
async fn connect_is_a_noop_when_already_authenticated() {
    let transport = MockTransport::new();
    let client = build_client(transport.clone(), SyncConfig::default());

    client.connect().await.unwrap();
    client.connect().await.unwrap();

    assert_eq!(client.state(), ConnectionState::Authenticated);
    // exactly one handshake happened: a fresh dial would have re-queued the
    // scripted auth ack and re-flushed, which the emit capture would show
    assert!(transport.emitted_named("message:send").is_empty());
}
