//! End-to-end tests: real websocket clients against a running gateway.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use quizhub::{GatewayServer, GatewayState, SharedState};
use quizhub_bank::QuestionBank;
use quizhub_protocol::{ClientEvent, ClientId, GameState, RoomCode, ServerEvent};
use quizhub_room::RoomRegistry;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a gateway on a random port and returns its address and state.
async fn start_server() -> (String, SharedState) {
    let state = GatewayState::new(RoomRegistry::new(Arc::new(QuestionBank::builtin())));
    let server = GatewayServer::bind("127.0.0.1:0", state.clone())
        .await
        .expect("server should bind");
    let addr = server.local_addr().expect("should have local addr").to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, state)
}

/// Connects a client and consumes its `welcome`, returning the assigned id.
async fn connect(addr: &str) -> (ClientWs, ClientId) {
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    let ServerEvent::Welcome { client_id } = recv_event(&mut ws).await else {
        panic!("first event must be welcome");
    };
    (ws, client_id)
}

async fn send(ws: &mut ClientWs, event: &ClientEvent) {
    let text = serde_json::to_string(event).unwrap();
    ws.send(Message::text(text)).await.unwrap();
}

async fn recv_event(ws: &mut ClientWs) -> ServerEvent {
    recv_until(ws, |_| true).await
}

/// Drains frames until one decodes to a matching event.
async fn recv_until(ws: &mut ClientWs, pred: impl Fn(&ServerEvent) -> bool) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let frame = ws.next().await.expect("stream ended").expect("ws error");
            if let Message::Text(text) = frame {
                let event: ServerEvent =
                    serde_json::from_str(text.as_str()).expect("undecodable server event");
                if pred(&event) {
                    return event;
                }
            }
        }
    })
    .await
    .expect("expected event never arrived")
}

/// Creates an easy-quiz room hosted by `host` straight on the registry.
async fn create_room(state: &SharedState, host: ClientId) -> RoomCode {
    let (code, _) = state
        .registry
        .lock()
        .await
        .create_room(host, "easy", None)
        .unwrap();
    code
}

fn join(room: &RoomCode, user: &str) -> ClientEvent {
    ClientEvent::JoinRoom { room_id: room.clone(), user: user.into() }
}

// =========================================================================
// Connection basics
// =========================================================================

#[tokio::test]
async fn test_welcome_carries_distinct_client_ids() {
    let (addr, _state) = start_server().await;

    let (_ws1, id1) = connect(&addr).await;
    let (_ws2, id2) = connect(&addr).await;
    assert_ne!(id1, id2);
}

#[tokio::test]
async fn test_invalid_json_gets_error_event() {
    let (addr, _state) = start_server().await;
    let (mut ws, _) = connect(&addr).await;

    ws.send(Message::text("this is not an event")).await.unwrap();

    let event = recv_until(&mut ws, |e| matches!(e, ServerEvent::Error { .. })).await;
    if let ServerEvent::Error { message } = event {
        assert_eq!(message, "invalid message");
    }
}

#[tokio::test]
async fn test_join_unknown_room_gets_error_event() {
    let (addr, _state) = start_server().await;
    let (mut ws, _) = connect(&addr).await;

    send(&mut ws, &join(&RoomCode::new("NOPE42"), "alice")).await;

    let event = recv_until(&mut ws, |e| matches!(e, ServerEvent::Error { .. })).await;
    if let ServerEvent::Error { message } = event {
        assert!(message.contains("not found"), "unexpected message: {message}");
    }
}

// =========================================================================
// Join / state snapshot
// =========================================================================

#[tokio::test]
async fn test_join_delivers_room_snapshot() {
    let (addr, state) = start_server().await;
    let (mut ws, id) = connect(&addr).await;
    let room = create_room(&state, id).await;

    send(&mut ws, &join(&room, "alice")).await;

    let event = recv_until(&mut ws, |e| matches!(e, ServerEvent::RoomState { .. })).await;
    if let ServerEvent::RoomState { participants, game_state, current_question, .. } = event {
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].username, "alice");
        assert_eq!(game_state, GameState::Waiting);
        assert_eq!(current_question, 0);
    }
}

#[tokio::test]
async fn test_second_join_is_broadcast_to_the_room() {
    let (addr, state) = start_server().await;
    let (mut host_ws, host_id) = connect(&addr).await;
    let room = create_room(&state, host_id).await;
    send(&mut host_ws, &join(&room, "host")).await;
    recv_until(&mut host_ws, |e| matches!(e, ServerEvent::RoomState { .. })).await;

    let (mut guest_ws, _) = connect(&addr).await;
    send(&mut guest_ws, &join(&room, "guest")).await;

    let event =
        recv_until(&mut host_ws, |e| matches!(e, ServerEvent::UserJoined { .. })).await;
    if let ServerEvent::UserJoined { username, participant_count, .. } = event {
        assert_eq!(username, "guest");
        assert_eq!(participant_count, 2);
    }
}

// =========================================================================
// Quiz flow over the wire
// =========================================================================

#[tokio::test]
async fn test_quiz_round_trip_over_websocket() {
    let (addr, state) = start_server().await;
    let (mut host_ws, host_id) = connect(&addr).await;
    let (mut guest_ws, _) = connect(&addr).await;
    let room = create_room(&state, host_id).await;

    send(&mut host_ws, &join(&room, "host")).await;
    send(&mut guest_ws, &join(&room, "guest")).await;
    recv_until(&mut guest_ws, |e| matches!(e, ServerEvent::RoomState { .. })).await;

    // Start: everyone gets the stripped first question.
    send(&mut host_ws, &ClientEvent::StartQuiz { room_id: room.clone() }).await;
    for ws in [&mut host_ws, &mut guest_ws] {
        let event = recv_until(ws, |e| matches!(e, ServerEvent::QuizStarted { .. })).await;
        if let ServerEvent::QuizStarted { question_number, total_questions, .. } = event {
            assert_eq!(question_number, 1);
            assert_eq!(total_questions, 8);
        }
    }

    // The host answers correctly.
    let answer = QuestionBank::builtin().get("easy").unwrap().questions[0]
        .correct_answer
        .clone();
    send(
        &mut host_ws,
        &ClientEvent::SubmitAnswer { room_id: room.clone(), answer, question_index: 0 },
    )
    .await;

    // Submitter gets the graded result…
    let event =
        recv_until(&mut host_ws, |e| matches!(e, ServerEvent::AnswerResult { .. })).await;
    if let ServerEvent::AnswerResult { is_correct, score, explanation } = event {
        assert!(is_correct);
        assert_eq!(score, 10);
        assert!(!explanation.is_empty());
    }

    // …the guest sees the submission and the refreshed leaderboard.
    let event = recv_until(&mut guest_ws, |e| {
        matches!(e, ServerEvent::AnswerSubmitted { .. })
    })
    .await;
    if let ServerEvent::AnswerSubmitted { username, is_correct, .. } = event {
        assert_eq!(username, "host");
        assert!(is_correct);
    }
    let event = recv_until(&mut guest_ws, |e| {
        matches!(e, ServerEvent::UpdateLeaderboard { .. })
    })
    .await;
    if let ServerEvent::UpdateLeaderboard { leaderboard } = event {
        assert_eq!(leaderboard[0].username, "host");
        assert_eq!(leaderboard[0].score, 10);
    }
}

#[tokio::test]
async fn test_end_quiz_is_host_only() {
    let (addr, state) = start_server().await;
    let (mut host_ws, host_id) = connect(&addr).await;
    let (mut guest_ws, _) = connect(&addr).await;
    let room = create_room(&state, host_id).await;

    send(&mut host_ws, &join(&room, "host")).await;
    send(&mut guest_ws, &join(&room, "guest")).await;
    recv_until(&mut guest_ws, |e| matches!(e, ServerEvent::RoomState { .. })).await;
    send(&mut host_ws, &ClientEvent::StartQuiz { room_id: room.clone() }).await;

    // A non-host asking to end the quiz only earns an error.
    send(&mut guest_ws, &ClientEvent::EndQuiz { room_id: room.clone() }).await;
    let event = recv_until(&mut guest_ws, |e| matches!(e, ServerEvent::Error { .. })).await;
    if let ServerEvent::Error { message } = event {
        assert!(message.contains("host"), "unexpected message: {message}");
    }

    // The host ends it for real; the whole room hears about it.
    send(&mut host_ws, &ClientEvent::EndQuiz { room_id: room.clone() }).await;
    recv_until(&mut guest_ws, |e| matches!(e, ServerEvent::QuizEnded { .. })).await;
    recv_until(&mut host_ws, |e| matches!(e, ServerEvent::QuizEnded { .. })).await;

    let summary = state.registry.lock().await.summary(&room).await.unwrap();
    assert_eq!(summary.game_state, GameState::Finished);
}

#[tokio::test]
async fn test_disconnect_runs_the_implicit_leave() {
    let (addr, state) = start_server().await;
    let (mut host_ws, host_id) = connect(&addr).await;
    let (mut guest_ws, _) = connect(&addr).await;
    let room = create_room(&state, host_id).await;

    send(&mut host_ws, &join(&room, "host")).await;
    send(&mut guest_ws, &join(&room, "guest")).await;
    recv_until(&mut guest_ws, |e| matches!(e, ServerEvent::RoomState { .. })).await;

    guest_ws.close(None).await.unwrap();

    let event = recv_until(&mut host_ws, |e| matches!(e, ServerEvent::UserLeft { .. })).await;
    if let ServerEvent::UserLeft { username, participant_count, .. } = event {
        assert_eq!(username, "guest");
        assert_eq!(participant_count, 1);
    }

    // The room itself survives the disconnect until a sweep runs.
    assert_eq!(state.registry.lock().await.room_count(), 1);
}
