//! Per-connection handler: event decode, dispatch, and relay.
//!
//! Each accepted websocket gets its own task running [`handle_connection`].
//! The flow is:
//!   1. Assign a `ClientId`, send `welcome` so the client knows it.
//!   2. Loop: decode one `ClientEvent` per text frame, invoke exactly one
//!      coordinator operation, let the room actor fan out the results.
//!   3. On close, run the implicit leave against the joined room.
//!
//! Room errors are non-fatal: they become a unicast `error` event to the
//! offending client and never reach the rest of the room.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use quizhub_protocol::{ClientEvent, ClientId, Codec, RoomCode, ServerEvent};
use quizhub_room::{EventSender, RoomError, RoomHandle};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{GatewayError, SharedState};

/// Counter for assigning connection identifiers.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Handles a single websocket connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    state: SharedState,
) -> Result<(), GatewayError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let id = ClientId(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed));
    tracing::debug!(client = %id, "websocket connection accepted");

    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Outbound pump: serializes everything this client receives, whether
    // it came from this handler or from a room actor broadcast. Ends once
    // every sender is gone.
    let codec = state.codec;
    let pump = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match codec.encode(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound event");
                    continue;
                }
            };
            if sink.send(Message::text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let _ = tx.send(ServerEvent::Welcome { client_id: id });

    // The room this connection has joined, if any. One room at a time.
    let mut joined: Option<(RoomCode, RoomHandle)> = None;

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                handle_frame(text.as_str(), id, &tx, &state, &mut joined).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/binary
            Err(e) => {
                tracing::debug!(client = %id, error = %e, "recv error");
                break;
            }
        }
    }

    // Implicit leave: disconnects are how most participants exit.
    if let Some((code, handle)) = joined {
        tracing::debug!(client = %id, room = %code, "disconnected, leaving room");
        let _ = handle.leave(id).await;
    }

    drop(tx);
    let _ = pump.await;
    tracing::debug!(client = %id, "connection closed");
    Ok(())
}

/// Decodes one frame and dispatches it; failures become a unicast error.
async fn handle_frame(
    text: &str,
    id: ClientId,
    tx: &EventSender,
    state: &SharedState,
    joined: &mut Option<(RoomCode, RoomHandle)>,
) {
    let event: ClientEvent = match state.codec.decode(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(client = %id, error = %e, "undecodable frame");
            let _ = tx.send(ServerEvent::Error { message: "invalid message".into() });
            return;
        }
    };

    if let Err(e) = dispatch(event, id, tx, state, joined).await {
        let _ = tx.send(ServerEvent::Error { message: e.to_string() });
    }
}

/// Routes one client event to exactly one coordinator operation.
async fn dispatch(
    event: ClientEvent,
    id: ClientId,
    tx: &EventSender,
    state: &SharedState,
    joined: &mut Option<(RoomCode, RoomHandle)>,
) -> Result<(), RoomError> {
    match event {
        ClientEvent::JoinRoom { room_id, user } => {
            join_room(room_id, user, id, tx, state, joined).await
        }
        ClientEvent::SubmitAnswer { room_id, answer, question_index } => {
            room(state, joined, &room_id)
                .await?
                .submit_answer(id, answer, question_index)
                .await
        }
        ClientEvent::StartQuiz { room_id } => {
            room(state, joined, &room_id).await?.start_quiz().await
        }
        ClientEvent::EndQuiz { room_id } => {
            room(state, joined, &room_id).await?.end_quiz(id).await
        }
        ClientEvent::ResetQuiz { room_id } => {
            room(state, joined, &room_id).await?.reset_quiz(id).await
        }
    }
}

async fn join_room(
    room_id: RoomCode,
    user: String,
    id: ClientId,
    tx: &EventSender,
    state: &SharedState,
    joined: &mut Option<(RoomCode, RoomHandle)>,
) -> Result<(), RoomError> {
    // The registry lock is held across the whole join so the periodic
    // sweep cannot delete this room between the lookup and the insert.
    let handle = {
        let registry = state.registry.lock().await;
        let handle = registry
            .get(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.join(id, user, tx.clone()).await?;
        handle
    };

    // One room per connection: a successful move leaves the old room.
    if let Some((old_code, old_handle)) = joined.take() {
        if old_code != room_id {
            let _ = old_handle.leave(id).await;
        }
    }
    *joined = Some((room_id, handle));
    Ok(())
}

/// Resolves the room handle for an operation: the joined room when the
/// codes match (no registry lock needed), otherwise a registry lookup —
/// a host may end a quiz without being a participant.
async fn room(
    state: &SharedState,
    joined: &Option<(RoomCode, RoomHandle)>,
    code: &RoomCode,
) -> Result<RoomHandle, RoomError> {
    if let Some((joined_code, handle)) = joined {
        if joined_code == code {
            return Ok(handle.clone());
        }
    }
    state
        .registry
        .lock()
        .await
        .get(code)
        .ok_or_else(|| RoomError::NotFound(code.clone()))
}
