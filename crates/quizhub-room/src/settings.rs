//! Per-room quiz settings.

use std::time::Duration;

use quizhub_bank::Quiz;
use quizhub_protocol::SettingsView;

/// Settings a room runs its quiz with, seeded from the quiz content.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// How long participants get for each question.
    pub time_per_question: Duration,
    /// Points awarded per correct answer.
    pub points_per_question: u32,
    pub auto_start: bool,
    pub show_explanations: bool,
}

impl RoomSettings {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            time_per_question: Duration::from_secs(quiz.time_per_question_secs),
            points_per_question: quiz.points_per_question,
            auto_start: false,
            show_explanations: true,
        }
    }

    pub fn view(&self) -> SettingsView {
        SettingsView {
            time_per_question: self.time_per_question.as_secs(),
            points_per_question: self.points_per_question,
            auto_start: self.auto_start,
            show_explanations: self.show_explanations,
        }
    }
}
