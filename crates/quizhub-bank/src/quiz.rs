//! Quiz content types.

/// A single quiz question.
///
/// Immutable once built — rooms index into a quiz, they never rewrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// 1-based id within the quiz.
    pub id: u32,
    /// The question text shown to participants.
    pub text: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option, verbatim.
    pub correct_answer: String,
    /// Shown to a participant after they answer. Never broadcast.
    pub explanation: String,
    /// Seconds a participant has to answer this question.
    pub time_limit_secs: u64,
}

impl Question {
    /// Decides whether `answer` is correct: exact value equality against
    /// the correct option. No normalisation, no partial credit.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// An ordered quiz for one difficulty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub difficulty: String,
    pub description: String,
    /// Seconds per question; also stamped on each question's time limit.
    pub time_per_question_secs: u64,
    /// Points awarded for each correct answer.
    pub points_per_question: u32,
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Number of questions in this quiz.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The question at `index`, if it exists.
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Catalog row for this quiz.
    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            difficulty: self.difficulty.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            question_count: self.questions.len(),
            time_per_question_secs: self.time_per_question_secs,
        }
    }
}

/// One row of the quiz catalog, safe to list publicly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub difficulty: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub time_per_question_secs: u64,
}
