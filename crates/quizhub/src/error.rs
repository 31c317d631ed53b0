//! Unified error type for the gateway.

use quizhub_protocol::ProtocolError;
use quizhub_room::RoomError;

/// Top-level error that wraps the layer-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A room-level error (not found, wrong state, duplicate answer, …).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A websocket transport error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A socket-level I/O error (bind, accept).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
