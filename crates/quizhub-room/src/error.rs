//! Error types for the room layer.

use quizhub_protocol::{ClientId, RoomCode};

/// Errors that can occur during room operations.
///
/// Every variant is reported to the originating client only, as a
/// non-fatal `error` notification; none of them corrupt room state or
/// reach other participants.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Late joins are rejected, not queued.
    #[error("cannot join room {0} while quiz is in progress")]
    JoinWhilePlaying(RoomCode),

    /// A quiz needs at least one participant to start.
    #[error("cannot start quiz with no participants")]
    NoParticipants,

    /// The room is not in the waiting state.
    #[error("quiz already in progress")]
    AlreadyPlaying,

    /// The operation needs a running quiz.
    #[error("quiz is not active")]
    NotPlaying,

    /// The participant is not in this room.
    #[error("participant {0} not found")]
    NoSuchParticipant(ClientId),

    /// The participant already answered the current question. Duplicate
    /// submissions (e.g. a network retry) must not score twice.
    #[error("answer already submitted")]
    AlreadyAnswered,

    /// The answer targeted a question the room has already moved past.
    #[error("answer was for question {submitted}, but the room is on question {current}")]
    StaleQuestionIndex { submitted: usize, current: usize },

    /// Only the host may perform this operation.
    #[error("only the host can do that")]
    NotHost(ClientId),

    /// Replay reset is only valid once the quiz has finished.
    #[error("quiz has not finished")]
    NotFinished,

    /// The question bank has no quiz for this key.
    #[error("no quiz found for difficulty \"{0}\"")]
    UnknownDifficulty(String),

    /// Code sampling kept colliding with live rooms.
    #[error("could not allocate a unique room code")]
    CodeSpaceExhausted,

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
