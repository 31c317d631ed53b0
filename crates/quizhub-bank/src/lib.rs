//! Question bank for Quizhub.
//!
//! Pure lookup, no state: given a difficulty key, the bank hands out an
//! immutable [`Quiz`] — an ordered list of questions with options, the
//! correct answer, an explanation, and per-question timing/points. The
//! coordinator only ever indexes into quiz content; it never mutates it.
//!
//! Answer evaluation also lives here ([`Question::is_correct`]) so the
//! grading rule and the content it grades against stay in one place.

mod catalog;
mod quiz;

pub use catalog::QuestionBank;
pub use quiz::{Question, Quiz, QuizSummary};
