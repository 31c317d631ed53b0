//! Client/server events and the content views they carry.
//!
//! Events are internally tagged (`{"type": "join-room", ...}`) with
//! camelCase fields, matching what the browser client sends and expects.

use quizhub_bank::{Question, Quiz, QuizSummary};
use serde::{Deserialize, Serialize};

use crate::{ClientId, RoomCode};

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// Where a room is in its quiz lifecycle.
///
/// ```text
/// waiting → playing → finished
///    ↑__________________|        (host-issued reset only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Waiting,
    Playing,
    Finished,
}

impl GameState {
    /// Participants may join while waiting or reviewing results — only a
    /// running quiz rejects late joins.
    pub fn is_joinable(&self) -> bool {
        !matches!(self, Self::Playing)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Content views (answer-stripped)
// ---------------------------------------------------------------------------

/// A question as clients see it: no correct answer, no explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub time_limit: u64,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question: q.text.clone(),
            options: q.options.clone(),
            time_limit: q.time_limit_secs,
        }
    }
}

/// A quiz as clients see it, with every question stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub id: String,
    pub title: String,
    pub difficulty: String,
    pub description: String,
    pub time_per_question: u64,
    pub points_per_question: u32,
    pub questions: Vec<QuestionView>,
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            difficulty: quiz.difficulty.clone(),
            description: quiz.description.clone(),
            time_per_question: quiz.time_per_question_secs,
            points_per_question: quiz.points_per_question,
            questions: quiz.questions.iter().map(QuestionView::from).collect(),
        }
    }
}

/// One row of the public quiz catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub difficulty: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub time_per_question: u64,
}

impl From<&QuizSummary> for CatalogEntry {
    fn from(s: &QuizSummary) -> Self {
        Self {
            difficulty: s.difficulty.clone(),
            title: s.title.clone(),
            description: s.description.clone(),
            question_count: s.question_count,
            time_per_question: s.time_per_question_secs,
        }
    }
}

/// One participant, as broadcast in membership updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: ClientId,
    pub username: String,
    pub score: u32,
    pub answered: bool,
}

/// One row of the ranked leaderboard. Ranks are sequential (1, 2, 3, …);
/// equal scores still get distinct consecutive ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub score: u32,
    pub id: ClientId,
}

/// Room settings, as exposed in room summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub time_per_question: u64,
    pub points_per_question: u32,
    pub auto_start: bool,
    pub show_explanations: bool,
}

/// Public room metadata returned by the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomCode,
    pub difficulty: String,
    pub quiz_title: String,
    /// Unix epoch milliseconds.
    pub created_at: u64,
    pub game_state: GameState,
    pub participant_count: usize,
    pub current_question: usize,
    pub total_questions: usize,
    pub settings: SettingsView,
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// Everything a client can send over the realtime channel.
///
/// Disconnect is not a wire event — the gateway synthesises the implicit
/// leave when the transport closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "join-room", rename_all = "camelCase")]
    JoinRoom { room_id: RoomCode, user: String },

    #[serde(rename = "submit-answer", rename_all = "camelCase")]
    SubmitAnswer {
        room_id: RoomCode,
        answer: String,
        question_index: usize,
    },

    #[serde(rename = "start-quiz", rename_all = "camelCase")]
    StartQuiz { room_id: RoomCode },

    #[serde(rename = "end-quiz", rename_all = "camelCase")]
    EndQuiz { room_id: RoomCode },

    /// Host-issued replay reset: back to `waiting` with scores cleared,
    /// participants kept.
    #[serde(rename = "reset-quiz", rename_all = "camelCase")]
    ResetQuiz { room_id: RoomCode },
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Everything the coordinator can send to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Unicast on connect: tells the client its connection identifier,
    /// which it presents as `hostId` when creating a room.
    #[serde(rename = "welcome", rename_all = "camelCase")]
    Welcome { client_id: ClientId },

    /// Unicast to a client that just joined: the full room snapshot.
    #[serde(rename = "room-state", rename_all = "camelCase")]
    RoomState {
        participants: Vec<ParticipantView>,
        leaderboard: Vec<LeaderboardEntry>,
        game_state: GameState,
        current_question: usize,
    },

    #[serde(rename = "user-joined", rename_all = "camelCase")]
    UserJoined {
        username: String,
        participant_count: usize,
        participants: Vec<ParticipantView>,
    },

    #[serde(rename = "user-left", rename_all = "camelCase")]
    UserLeft {
        username: String,
        participant_count: usize,
        participants: Vec<ParticipantView>,
    },

    #[serde(rename = "quiz-started", rename_all = "camelCase")]
    QuizStarted {
        quiz: QuizView,
        question: QuestionView,
        question_number: usize,
        total_questions: usize,
    },

    #[serde(rename = "next-question", rename_all = "camelCase")]
    NextQuestion {
        question: QuestionView,
        question_number: usize,
        total_questions: usize,
    },

    /// Room-wide, excluding the submitter: someone locked in an answer.
    #[serde(rename = "answer-submitted", rename_all = "camelCase")]
    AnswerSubmitted {
        username: String,
        has_answered: bool,
        is_correct: bool,
    },

    /// Unicast to the submitter only. The one payload allowed to carry
    /// the explanation.
    #[serde(rename = "answer-result", rename_all = "camelCase")]
    AnswerResult {
        is_correct: bool,
        score: u32,
        explanation: String,
    },

    #[serde(rename = "update-leaderboard", rename_all = "camelCase")]
    UpdateLeaderboard { leaderboard: Vec<LeaderboardEntry> },

    /// The quiz ran out of questions.
    #[serde(rename = "quiz-finished", rename_all = "camelCase")]
    QuizFinished { leaderboard: Vec<LeaderboardEntry> },

    /// The host ended the quiz early.
    #[serde(rename = "quiz-ended", rename_all = "camelCase")]
    QuizEnded { leaderboard: Vec<LeaderboardEntry> },

    #[serde(rename = "quiz-reset", rename_all = "camelCase")]
    QuizReset { participants: Vec<ParticipantView> },

    #[serde(rename = "error", rename_all = "camelCase")]
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
