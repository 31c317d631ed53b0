//! Participant state.

use quizhub_protocol::{ClientId, ParticipantView};

/// One connected user inside a room.
///
/// Keyed by connection identifier; the containing collection preserves
/// join order, which is what breaks leaderboard ties.
///
/// Invariant: `answered` is true exactly when `current_answer` is set for
/// the room's current question. The two are reset together on every
/// question transition.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ClientId,
    pub username: String,
    pub score: u32,
    pub answered: bool,
    pub current_answer: Option<String>,
}

impl Participant {
    pub fn new(id: ClientId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            score: 0,
            answered: false,
            current_answer: None,
        }
    }

    /// Records the single accepted answer for the current question.
    pub fn record_answer(&mut self, answer: String, points: u32) {
        self.score += points;
        self.current_answer = Some(answer);
        self.answered = true;
    }

    /// Clears answer state for the next question.
    pub fn reset_for_question(&mut self) {
        self.answered = false;
        self.current_answer = None;
    }

    /// Clears everything a fresh quiz run needs cleared.
    pub fn reset_for_game(&mut self) {
        self.score = 0;
        self.reset_for_question();
    }

    pub fn view(&self) -> ParticipantView {
        ParticipantView {
            id: self.id,
            username: self.username.clone(),
            score: self.score,
            answered: self.answered,
        }
    }
}
