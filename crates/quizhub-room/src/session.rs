//! The room session state machine.
//!
//! `RoomSession` is synchronous and single-owner: it is driven by exactly
//! one room actor task, so every operation here runs as one indivisible
//! turn. The duplicate-answer check-and-set in [`RoomSession::submit_answer`]
//! is atomic with respect to every other operation on the room because of
//! that ownership, not because of any lock.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use quizhub_bank::Quiz;
use quizhub_protocol::{
    ClientId, GameState, LeaderboardEntry, ParticipantView, QuestionView, QuizView, RoomCode,
    RoomSummary,
};

use crate::{Participant, RoomError, RoomSettings, leaderboard};

/// Result of a successful `start_quiz`.
#[derive(Debug, Clone)]
pub struct StartedQuiz {
    pub quiz: QuizView,
    pub question: QuestionView,
    /// 1-based.
    pub question_number: usize,
    pub total_questions: usize,
}

/// Result of a successful `submit_answer`.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub username: String,
    pub is_correct: bool,
    /// The participant's cumulative score after this answer.
    pub score: u32,
    pub explanation: String,
}

/// Result of a successful `advance_question`.
#[derive(Debug, Clone)]
pub enum Advance {
    Next {
        question: QuestionView,
        question_number: usize,
        total_questions: usize,
    },
    Finished {
        leaderboard: Vec<LeaderboardEntry>,
    },
}

/// Full room snapshot sent to a client that just joined.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub participants: Vec<ParticipantView>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub game_state: GameState,
    pub current_question: usize,
}

/// The state machine for one room.
///
/// States: `waiting → playing → finished`, plus `finished → waiting` via
/// an explicit host-issued reset. While `playing`, `current_question` is
/// always a valid index into the quiz.
pub struct RoomSession {
    code: RoomCode,
    host: ClientId,
    title: String,
    quiz: Arc<Quiz>,
    created_at_ms: u64,
    state: GameState,
    current_question: usize,
    settings: RoomSettings,
    /// Insertion order is join order.
    participants: Vec<Participant>,
}

impl RoomSession {
    pub fn new(code: RoomCode, host: ClientId, quiz: Arc<Quiz>, title: Option<String>) -> Self {
        let settings = RoomSettings::from_quiz(&quiz);
        let title = title.unwrap_or_else(|| quiz.title.clone());
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            code,
            host,
            title,
            quiz,
            created_at_ms,
            state: GameState::Waiting,
            current_question: 0,
            settings,
            participants: Vec::new(),
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host(&self) -> ClientId {
        self.host
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    // -- membership --------------------------------------------------------

    /// Adds a participant. Late joins are rejected while a quiz runs.
    ///
    /// Rejoining with an id already present just refreshes the display
    /// name — connection ids are transport-owned, so a duplicate means
    /// the same socket sent join twice.
    pub fn join(&mut self, id: ClientId, username: impl Into<String>) -> Result<(), RoomError> {
        if self.state.is_playing() {
            return Err(RoomError::JoinWhilePlaying(self.code.clone()));
        }
        let username = username.into();
        if let Some(existing) = self.participants.iter_mut().find(|p| p.id == id) {
            existing.username = username;
        } else {
            self.participants.push(Participant::new(id, username));
        }
        Ok(())
    }

    /// Removes a participant. Absent ids are a no-op, not an error:
    /// disconnect notifications can race with room deletion.
    pub fn leave(&mut self, id: ClientId) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == id)?;
        Some(self.participants.remove(index))
    }

    // -- quiz lifecycle ----------------------------------------------------

    /// Starts the quiz from `waiting`: resets every participant, moves to
    /// question 0, and returns the first question for broadcast.
    pub fn start_quiz(&mut self) -> Result<StartedQuiz, RoomError> {
        if self.participants.is_empty() {
            return Err(RoomError::NoParticipants);
        }
        if self.state != GameState::Waiting {
            return Err(RoomError::AlreadyPlaying);
        }

        let question = self
            .quiz
            .question(0)
            .map(QuestionView::from)
            .ok_or(RoomError::NotPlaying)?;

        self.state = GameState::Playing;
        self.current_question = 0;
        for p in &mut self.participants {
            p.reset_for_game();
        }

        Ok(StartedQuiz {
            quiz: QuizView::from(self.quiz.as_ref()),
            question,
            question_number: 1,
            total_questions: self.quiz.len(),
        })
    }

    /// Records a participant's answer for the current question.
    ///
    /// The `answered` check-and-set is the race-sensitive step: a second
    /// submission from the same participant for the same question must
    /// fail, never score twice.
    pub fn submit_answer(
        &mut self,
        id: ClientId,
        answer: String,
        question_index: usize,
    ) -> Result<AnswerOutcome, RoomError> {
        if !self.state.is_playing() {
            return Err(RoomError::NotPlaying);
        }
        if question_index != self.current_question {
            return Err(RoomError::StaleQuestionIndex {
                submitted: question_index,
                current: self.current_question,
            });
        }
        let question = self.quiz.question(self.current_question).ok_or(
            RoomError::StaleQuestionIndex {
                submitted: question_index,
                current: self.current_question,
            },
        )?;

        let points = self.settings.points_per_question;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RoomError::NoSuchParticipant(id))?;
        if participant.answered {
            return Err(RoomError::AlreadyAnswered);
        }

        let is_correct = question.is_correct(&answer);
        participant.record_answer(answer, if is_correct { points } else { 0 });

        Ok(AnswerOutcome {
            username: participant.username.clone(),
            is_correct,
            score: participant.score,
            explanation: question.explanation.clone(),
        })
    }

    /// Whether every current participant has answered the active question.
    pub fn all_answered(&self) -> bool {
        self.participants.iter().all(|p| p.answered)
    }

    /// Moves to the next question, or finishes the quiz when the last
    /// question has been played.
    pub fn advance_question(&mut self) -> Result<Advance, RoomError> {
        if !self.state.is_playing() {
            return Err(RoomError::NotPlaying);
        }

        self.current_question += 1;

        if self.current_question >= self.quiz.len() {
            self.state = GameState::Finished;
            return Ok(Advance::Finished {
                leaderboard: self.leaderboard(),
            });
        }

        for p in &mut self.participants {
            p.reset_for_question();
        }

        let question = self
            .quiz
            .question(self.current_question)
            .map(QuestionView::from)
            .ok_or(RoomError::NotPlaying)?;

        Ok(Advance::Next {
            question,
            question_number: self.current_question + 1,
            total_questions: self.quiz.len(),
        })
    }

    /// Host-only: forces the quiz to `finished` from any state and
    /// returns the final leaderboard.
    pub fn end_quiz(&mut self, requester: ClientId) -> Result<Vec<LeaderboardEntry>, RoomError> {
        if requester != self.host {
            return Err(RoomError::NotHost(requester));
        }
        self.state = GameState::Finished;
        Ok(self.leaderboard())
    }

    /// Host-only replay reset: back to `waiting` with scores and answer
    /// state cleared, participants and settings kept.
    pub fn reset_for_replay(&mut self, requester: ClientId) -> Result<(), RoomError> {
        if requester != self.host {
            return Err(RoomError::NotHost(requester));
        }
        if self.state != GameState::Finished {
            return Err(RoomError::NotFinished);
        }
        self.state = GameState::Waiting;
        self.current_question = 0;
        for p in &mut self.participants {
            p.reset_for_game();
        }
        Ok(())
    }

    // -- views -------------------------------------------------------------

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        leaderboard::rank(&self.participants)
    }

    pub fn participant_views(&self) -> Vec<ParticipantView> {
        self.participants.iter().map(Participant::view).collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            participants: self.participant_views(),
            leaderboard: self.leaderboard(),
            game_state: self.state,
            current_question: self.current_question,
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.code.clone(),
            difficulty: self.quiz.difficulty.clone(),
            quiz_title: self.title.clone(),
            created_at: self.created_at_ms,
            game_state: self.state,
            participant_count: self.participants.len(),
            current_question: self.current_question,
            total_questions: self.quiz.len(),
            settings: self.settings.view(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
