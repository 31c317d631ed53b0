//! Integration tests for the room system: registry, actors, and pacing.
//!
//! Timing tests run with a paused tokio clock (`start_paused`), so the
//! grace delay and question deadlines resolve deterministically.

use std::sync::Arc;
use std::time::Duration;

use quizhub_bank::QuestionBank;
use quizhub_protocol::{ClientId, GameState, RoomCode, ServerEvent};
use quizhub_room::{
    CodeGenerator, EventSender, RegistryConfig, RoomError, RoomHandle, RoomRegistry,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::timeout;

// =========================================================================
// Helpers
// =========================================================================

const HOST: ClientId = ClientId(1);

fn registry() -> RoomRegistry {
    RoomRegistry::new(Arc::new(QuestionBank::builtin()))
}

/// Emits a fixed code sequence, repeating the last entry forever.
struct FixedCodes {
    codes: Vec<&'static str>,
    next: usize,
}

impl FixedCodes {
    fn new(codes: Vec<&'static str>) -> Self {
        Self { codes, next: 0 }
    }
}

impl CodeGenerator for FixedCodes {
    fn generate(&mut self) -> RoomCode {
        let code = self.codes[self.next.min(self.codes.len() - 1)];
        self.next += 1;
        RoomCode::new(code)
    }
}

fn fixed_registry(codes: Vec<&'static str>) -> RoomRegistry {
    RoomRegistry::with_parts(
        Arc::new(QuestionBank::builtin()),
        Box::new(FixedCodes::new(codes)),
        RegistryConfig::default(),
    )
}

fn channel() -> (EventSender, UnboundedReceiver<ServerEvent>) {
    mpsc::unbounded_channel()
}

/// The correct answer for question `index` of the easy quiz.
fn easy_answer(index: usize) -> String {
    let bank = QuestionBank::builtin();
    bank.get("easy").unwrap().questions[index].correct_answer.clone()
}

/// Drains events until one matches, with a generous outer timeout.
async fn recv_until(
    rx: &mut UnboundedReceiver<ServerEvent>,
    pred: impl Fn(&ServerEvent) -> bool,
) -> ServerEvent {
    timeout(Duration::from_secs(300), async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("expected event never arrived")
}

/// Asserts that no matching event arrives within `within`.
async fn assert_silent(
    rx: &mut UnboundedReceiver<ServerEvent>,
    within: Duration,
    pred: impl Fn(&ServerEvent) -> bool,
) {
    let result = timeout(within, async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await;
    assert!(result.is_err(), "unexpected event: {:?}", result.unwrap());
}

fn is_next_question(event: &ServerEvent) -> bool {
    matches!(event, ServerEvent::NextQuestion { .. })
}

/// Creates an easy-quiz room and joins `count` participants c-1, c-2, …
/// Returns the handle plus each participant's event receiver.
async fn room_with(
    registry: &mut RoomRegistry,
    count: u64,
) -> (RoomHandle, Vec<UnboundedReceiver<ServerEvent>>) {
    let (code, _) = registry.create_room(HOST, "easy", None).unwrap();
    let handle = registry.get(&code).unwrap();

    let mut receivers = Vec::new();
    for i in 1..=count {
        let (tx, rx) = channel();
        handle
            .join(ClientId(i), format!("user-{i}"), tx)
            .await
            .unwrap();
        receivers.push(rx);
    }
    (handle, receivers)
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_create_room_unknown_difficulty() {
    let mut registry = registry();
    let result = registry.create_room(HOST, "impossible", None);
    assert!(matches!(result, Err(RoomError::UnknownDifficulty(_))));
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_create_room_returns_code_and_summary() {
    let mut registry = registry();
    let (code, summary) = registry.create_room(HOST, "easy", None).unwrap();

    assert_eq!(code.as_str().len(), 6);
    assert_eq!(summary.id, code);
    assert_eq!(summary.game_state, GameState::Waiting);
    assert_eq!(summary.total_questions, 8);
    assert_eq!(summary.quiz_title, "Basic Aptitude");
    assert_eq!(registry.room_count(), 1);
}

#[tokio::test]
async fn test_create_room_custom_title() {
    let mut registry = registry();
    let (_, summary) = registry
        .create_room(HOST, "easy", Some("Friday social".into()))
        .unwrap();
    assert_eq!(summary.quiz_title, "Friday social");
}

#[tokio::test]
async fn test_codes_are_unique_among_live_rooms() {
    let mut registry = registry();
    let (a, _) = registry.create_room(HOST, "easy", None).unwrap();
    let (b, _) = registry.create_room(HOST, "medium", None).unwrap();
    assert_ne!(a, b);
    assert_eq!(registry.room_count(), 2);
}

#[tokio::test]
async fn test_code_collision_retries_until_free() {
    let mut registry = fixed_registry(vec!["AAAAAA", "AAAAAA", "BBBBBB"]);

    let (first, _) = registry.create_room(HOST, "easy", None).unwrap();
    assert_eq!(first.as_str(), "AAAAAA");

    // The generator offers AAAAAA again; the registry must reject the
    // collision and take the next candidate.
    let (second, _) = registry.create_room(HOST, "easy", None).unwrap();
    assert_eq!(second.as_str(), "BBBBBB");
}

#[tokio::test]
async fn test_code_allocation_is_bounded() {
    // A generator stuck on one code must not loop forever.
    let mut registry = fixed_registry(vec!["AAAAAA"]);
    registry.create_room(HOST, "easy", None).unwrap();

    let result = registry.create_room(HOST, "easy", None);
    assert!(matches!(result, Err(RoomError::CodeSpaceExhausted)));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let mut registry = registry();
    let (code, _) = registry.create_room(HOST, "easy", None).unwrap();

    assert!(registry.delete(&code).await);
    assert!(!registry.delete(&code).await);
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_summary_for_missing_room() {
    let registry = registry();
    let result = registry.summary(&RoomCode::new("NOPE42")).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

// =========================================================================
// Membership
// =========================================================================

#[tokio::test]
async fn test_join_sends_snapshot_and_notifies_room() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 2).await;

    // The first participant got the room snapshot on join…
    let snapshot = recv_until(&mut receivers[0], |e| {
        matches!(e, ServerEvent::RoomState { .. })
    })
    .await;
    if let ServerEvent::RoomState { game_state, current_question, .. } = snapshot {
        assert_eq!(game_state, GameState::Waiting);
        assert_eq!(current_question, 0);
    }

    // …and a membership update when the second joined.
    let joined = recv_until(&mut receivers[0], |e| {
        matches!(e, ServerEvent::UserJoined { .. })
    })
    .await;
    if let ServerEvent::UserJoined { username, participant_count, participants } = joined {
        assert_eq!(username, "user-2");
        assert_eq!(participant_count, 2);
        assert_eq!(participants.len(), 2);
    }

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.participant_count, 2);
}

#[tokio::test]
async fn test_join_while_playing_is_rejected() {
    let mut registry = registry();
    let (handle, _receivers) = room_with(&mut registry, 2).await;
    handle.start_quiz().await.unwrap();

    let (tx, _rx) = channel();
    let result = handle.join(ClientId(3), "late".into(), tx).await;
    assert!(matches!(result, Err(RoomError::JoinWhilePlaying(_))));

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.participant_count, 2);
}

#[tokio::test]
async fn test_leave_notifies_remaining_participants() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 2).await;

    handle.leave(ClientId(2)).await.unwrap();

    let left = recv_until(&mut receivers[0], |e| {
        matches!(e, ServerEvent::UserLeft { .. })
    })
    .await;
    if let ServerEvent::UserLeft { username, participant_count, .. } = left {
        assert_eq!(username, "user-2");
        assert_eq!(participant_count, 1);
    }
}

#[tokio::test]
async fn test_leave_twice_is_fine() {
    let mut registry = registry();
    let (handle, _receivers) = room_with(&mut registry, 1).await;

    handle.leave(ClientId(1)).await.unwrap();
    handle.leave(ClientId(1)).await.unwrap();

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.participant_count, 0);
}

// =========================================================================
// Quiz flow
// =========================================================================

#[tokio::test]
async fn test_start_requires_participants() {
    let mut registry = registry();
    let (code, _) = registry.create_room(HOST, "easy", None).unwrap();
    let handle = registry.get(&code).unwrap();

    let result = handle.start_quiz().await;
    assert!(matches!(result, Err(RoomError::NoParticipants)));
}

#[tokio::test]
async fn test_start_broadcasts_first_question_to_everyone() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 2).await;
    handle.start_quiz().await.unwrap();

    for rx in &mut receivers {
        let started = recv_until(rx, |e| matches!(e, ServerEvent::QuizStarted { .. })).await;
        if let ServerEvent::QuizStarted { question_number, total_questions, question, .. } =
            started
        {
            assert_eq!(question_number, 1);
            assert_eq!(total_questions, 8);
            assert_eq!(question.id, 1);
        }
    }
}

#[tokio::test]
async fn test_submit_feedback_goes_to_the_right_audiences() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 2).await;
    handle.start_quiz().await.unwrap();

    handle
        .submit_answer(ClientId(1), easy_answer(0), 0)
        .await
        .unwrap();

    // The submitter gets the graded result (with explanation)…
    let result = recv_until(&mut receivers[0], |e| {
        matches!(e, ServerEvent::AnswerResult { .. })
    })
    .await;
    if let ServerEvent::AnswerResult { is_correct, score, explanation } = result {
        assert!(is_correct);
        assert_eq!(score, 10);
        assert!(!explanation.is_empty());
    }

    // …the rest of the room only learns that an answer landed.
    let seen = recv_until(&mut receivers[1], |e| {
        matches!(e, ServerEvent::AnswerSubmitted { .. })
    })
    .await;
    if let ServerEvent::AnswerSubmitted { username, has_answered, is_correct } = seen {
        assert_eq!(username, "user-1");
        assert!(has_answered);
        assert!(is_correct);
    }

    // The submitter must never see their own answer-submitted echo.
    assert_silent(&mut receivers[0], Duration::from_secs(1), |e| {
        matches!(e, ServerEvent::AnswerSubmitted { .. })
    })
    .await;
}

#[tokio::test]
async fn test_duplicate_answer_is_rejected() {
    let mut registry = registry();
    let (handle, _receivers) = room_with(&mut registry, 1).await;
    handle.start_quiz().await.unwrap();

    handle
        .submit_answer(ClientId(1), easy_answer(0), 0)
        .await
        .unwrap();
    let result = handle.submit_answer(ClientId(1), easy_answer(0), 0).await;
    assert!(matches!(result, Err(RoomError::AlreadyAnswered)));
}

// =========================================================================
// Quorum advancement
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_quorum_advances_once_after_grace() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 1).await;
    handle.start_quiz().await.unwrap();

    handle
        .submit_answer(ClientId(1), easy_answer(0), 0)
        .await
        .unwrap();

    // Quorum (the only participant answered) schedules one advancement;
    // after the grace delay the room moves to question 2.
    let next = recv_until(&mut receivers[0], is_next_question).await;
    if let ServerEvent::NextQuestion { question_number, .. } = next {
        assert_eq!(question_number, 2);
    }

    // Exactly once: nothing else advances the room before question 2's
    // own deadline (30s + slack) could fire.
    assert_silent(&mut receivers[0], Duration::from_secs(25), is_next_question).await;

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.current_question, 1);
    assert_eq!(summary.game_state, GameState::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_no_advance_before_quorum() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 2).await;
    handle.start_quiz().await.unwrap();

    handle
        .submit_answer(ClientId(1), easy_answer(0), 0)
        .await
        .unwrap();

    // One of two answered: no quorum, so no advancement inside the
    // question's time limit.
    assert_silent(&mut receivers[0], Duration::from_secs(25), is_next_question).await;
}

#[tokio::test(start_paused = true)]
async fn test_hard_deadline_advances_without_quorum() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 2).await;
    handle.start_quiz().await.unwrap();

    handle
        .submit_answer(ClientId(1), easy_answer(0), 0)
        .await
        .unwrap();

    // user-2 never answers; the per-question deadline (30s + slack)
    // fires and the room moves on anyway.
    let next = recv_until(&mut receivers[1], is_next_question).await;
    if let ServerEvent::NextQuestion { question_number, .. } = next {
        assert_eq!(question_number, 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_host_end_wins_over_pending_advancement() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 1).await;
    handle.start_quiz().await.unwrap();

    // Quorum reached — an advancement is now scheduled…
    handle
        .submit_answer(ClientId(1), easy_answer(0), 0)
        .await
        .unwrap();

    // …but the host ends the quiz inside the grace window.
    handle.end_quiz(HOST).await.unwrap();

    let ended = recv_until(&mut receivers[0], |e| {
        matches!(e, ServerEvent::QuizEnded { .. })
    })
    .await;
    if let ServerEvent::QuizEnded { leaderboard } = ended {
        assert_eq!(leaderboard[0].score, 10);
    }

    // The stale advancement must never fire: no next question, no state
    // change, question index untouched.
    assert_silent(&mut receivers[0], Duration::from_secs(60), is_next_question).await;

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.game_state, GameState::Finished);
    assert_eq!(summary.current_question, 0);
}

#[tokio::test(start_paused = true)]
async fn test_full_game_finishes_with_perfect_score() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 1).await;
    handle.start_quiz().await.unwrap();

    for index in 0..8 {
        handle
            .submit_answer(ClientId(1), easy_answer(index), index)
            .await
            .unwrap();

        let event = recv_until(&mut receivers[0], |e| {
            matches!(e, ServerEvent::NextQuestion { .. } | ServerEvent::QuizFinished { .. })
        })
        .await;

        match event {
            ServerEvent::NextQuestion { question_number, .. } => {
                assert_eq!(question_number, index + 2);
                assert!(index < 7, "quiz advanced past its last question");
            }
            ServerEvent::QuizFinished { leaderboard } => {
                assert_eq!(index, 7, "quiz finished early");
                assert_eq!(leaderboard.len(), 1);
                assert_eq!(leaderboard[0].score, 80);
                assert_eq!(leaderboard[0].rank, 1);
            }
            _ => unreachable!(),
        }
    }

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.game_state, GameState::Finished);
}

// =========================================================================
// Replay
// =========================================================================

#[tokio::test]
async fn test_reset_returns_room_to_waiting() {
    let mut registry = registry();
    let (handle, mut receivers) = room_with(&mut registry, 2).await;
    handle.start_quiz().await.unwrap();
    handle
        .submit_answer(ClientId(1), easy_answer(0), 0)
        .await
        .unwrap();
    handle.end_quiz(HOST).await.unwrap();

    handle.reset_quiz(HOST).await.unwrap();

    let reset = recv_until(&mut receivers[1], |e| {
        matches!(e, ServerEvent::QuizReset { .. })
    })
    .await;
    if let ServerEvent::QuizReset { participants } = reset {
        assert_eq!(participants.len(), 2);
        assert!(participants.iter().all(|p| p.score == 0));
    }

    let summary = handle.summary().await.unwrap();
    assert_eq!(summary.game_state, GameState::Waiting);

    // The room can run another quiz.
    handle.start_quiz().await.unwrap();
}

#[tokio::test]
async fn test_reset_is_host_only() {
    let mut registry = registry();
    let (handle, _receivers) = room_with(&mut registry, 2).await;
    handle.start_quiz().await.unwrap();
    handle.end_quiz(HOST).await.unwrap();

    let result = handle.reset_quiz(ClientId(2)).await;
    assert!(matches!(result, Err(RoomError::NotHost(_))));
}

// =========================================================================
// Sweep
// =========================================================================

#[tokio::test]
async fn test_room_survives_last_leave_until_swept() {
    let mut registry = registry();
    let (handle, _receivers) = room_with(&mut registry, 1).await;
    let code = handle.code().clone();

    handle.leave(ClientId(1)).await.unwrap();

    // Leaving does not destroy the room — a host may be mid-reconnect.
    assert_eq!(registry.room_count(), 1);
    assert!(registry.get(&code).is_some());

    // The periodic sweep reclaims it.
    assert_eq!(registry.sweep_empty().await, 1);
    assert!(registry.get(&code).is_none());
}

#[tokio::test]
async fn test_sweep_keeps_occupied_rooms() {
    let mut registry = registry();
    let (occupied, _receivers) = room_with(&mut registry, 1).await;
    let (empty_code, _) = registry.create_room(HOST, "medium", None).unwrap();

    assert_eq!(registry.sweep_empty().await, 1);
    assert_eq!(registry.room_count(), 1);
    assert!(registry.get(occupied.code()).is_some());
    assert!(registry.get(&empty_code).is_none());
}
