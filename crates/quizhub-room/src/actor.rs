//! Room actor: an isolated tokio task that owns one [`RoomSession`].
//!
//! Every room runs in its own task and talks to the outside world through
//! an mpsc channel. Commands are processed one at a time in arrival
//! order, which gives each room a total order over its operations without
//! any lock — and without a global lock coupling unrelated rooms.
//!
//! The actor also owns question pacing: the quorum grace delay and the
//! hard per-question deadline both live in its `select!` loop, so a timer
//! firing is serialized with every other operation on the room. A host
//! ending the quiz during the grace window therefore cannot race the
//! scheduled advancement — whichever is processed first wins, and the
//! advancement is a no-op once the room has left `playing`.

use std::collections::HashMap;
use std::time::Duration;

use quizhub_pacing::DeadlineTimer;
use quizhub_protocol::{ClientId, RoomCode, RoomSummary, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::{Advance, RoomError, RoomSession};

/// Channel sender for delivering outbound events to one participant.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Timing policy for question advancement.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// How long to wait after every participant has answered before
    /// advancing, so clients can render "answer submitted" feedback.
    pub advance_grace: Duration,
    /// Added to a question's time limit to form the hard per-question
    /// deadline. Firing that deadline is equivalent to reaching quorum.
    pub deadline_slack: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            advance_grace: Duration::from_secs(2),
            deadline_slack: Duration::from_secs(2),
        }
    }
}

/// Who should receive an outbound event.
enum Audience {
    /// Every participant in the room.
    Room,
    /// One specific participant.
    One(ClientId),
    /// Everyone except the given participant.
    Others(ClientId),
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        id: ClientId,
        username: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        id: ClientId,
        reply: oneshot::Sender<()>,
    },
    Start {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Submit {
        id: ClientId,
        answer: String,
        question_index: usize,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    End {
        id: ClientId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Reset {
        id: ClientId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Summary {
        reply: oneshot::Sender<RoomSummary>,
    },
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone — it's an
/// `mpsc::Sender` wrapper. The registry holds one per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Adds a participant, wiring up their outbound event channel.
    pub async fn join(
        &self,
        id: ClientId,
        username: String,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join { id, username, sender, reply })
            .await?
    }

    /// Removes a participant. Idempotent — leaving twice is fine.
    pub async fn leave(&self, id: ClientId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Leave { id, reply }).await
    }

    pub async fn start_quiz(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Start { reply }).await?
    }

    pub async fn submit_answer(
        &self,
        id: ClientId,
        answer: String,
        question_index: usize,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Submit { id, answer, question_index, reply })
            .await?
    }

    pub async fn end_quiz(&self, id: ClientId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::End { id, reply }).await?
    }

    pub async fn reset_quiz(&self, id: ClientId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Reset { id, reply }).await?
    }

    pub async fn summary(&self) -> Result<RoomSummary, RoomError> {
        self.request(|reply| RoomCommand::Summary { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor state. Runs inside a tokio task.
struct RoomActor {
    session: RoomSession,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Per-participant outbound channels.
    senders: HashMap<ClientId, EventSender>,
    pacing: PacingConfig,
    /// One-shot grace delay armed when quorum is reached. At most one
    /// advancement is scheduled at a time — `arm` no-ops while pending.
    grace: DeadlineTimer,
    /// Hard per-question timeout, re-armed on every question.
    question_deadline: DeadlineTimer,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.session.code(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(RoomCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = self.grace.fired() => self.advance(),
                _ = self.question_deadline.fired() => self.advance(),
            }
        }

        tracing::info!(room = %self.session.code(), "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { id, username, sender, reply } => {
                let result = self.handle_join(id, username, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { id, reply } => {
                self.handle_leave(id);
                let _ = reply.send(());
            }
            RoomCommand::Start { reply } => {
                let _ = reply.send(self.handle_start());
            }
            RoomCommand::Submit { id, answer, question_index, reply } => {
                let _ = reply.send(self.handle_submit(id, answer, question_index));
            }
            RoomCommand::End { id, reply } => {
                let _ = reply.send(self.handle_end(id));
            }
            RoomCommand::Reset { id, reply } => {
                let _ = reply.send(self.handle_reset(id));
            }
            RoomCommand::Summary { reply } => {
                let _ = reply.send(self.session.summary());
            }
            RoomCommand::Shutdown => unreachable!("handled in run loop"),
        }
    }

    fn handle_join(
        &mut self,
        id: ClientId,
        username: String,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        self.session.join(id, username.clone())?;
        self.senders.insert(id, sender);

        let participants = self.session.participant_views();
        tracing::info!(
            room = %self.session.code(),
            client = %id,
            username = %username,
            participants = participants.len(),
            "participant joined"
        );

        self.dispatch(
            Audience::Others(id),
            ServerEvent::UserJoined {
                username,
                participant_count: participants.len(),
                participants,
            },
        );

        let snapshot = self.session.snapshot();
        self.dispatch(
            Audience::One(id),
            ServerEvent::RoomState {
                participants: snapshot.participants,
                leaderboard: snapshot.leaderboard,
                game_state: snapshot.game_state,
                current_question: snapshot.current_question,
            },
        );
        Ok(())
    }

    fn handle_leave(&mut self, id: ClientId) {
        self.senders.remove(&id);
        let Some(removed) = self.session.leave(id) else {
            return;
        };

        let participants = self.session.participant_views();
        tracing::info!(
            room = %self.session.code(),
            client = %id,
            username = %removed.username,
            participants = participants.len(),
            "participant left"
        );

        self.dispatch(
            Audience::Room,
            ServerEvent::UserLeft {
                username: removed.username,
                participant_count: participants.len(),
                participants,
            },
        );
        self.dispatch(
            Audience::Room,
            ServerEvent::UpdateLeaderboard { leaderboard: self.session.leaderboard() },
        );
    }

    fn handle_start(&mut self) -> Result<(), RoomError> {
        let started = self.session.start_quiz()?;
        tracing::info!(
            room = %self.session.code(),
            questions = started.total_questions,
            "quiz started"
        );

        self.grace.disarm();
        self.question_deadline.rearm(self.question_timeout());

        self.dispatch(
            Audience::Room,
            ServerEvent::QuizStarted {
                quiz: started.quiz,
                question: started.question,
                question_number: started.question_number,
                total_questions: started.total_questions,
            },
        );
        Ok(())
    }

    fn handle_submit(
        &mut self,
        id: ClientId,
        answer: String,
        question_index: usize,
    ) -> Result<(), RoomError> {
        let outcome = self.session.submit_answer(id, answer, question_index)?;
        tracing::debug!(
            room = %self.session.code(),
            client = %id,
            correct = outcome.is_correct,
            "answer submitted"
        );

        self.dispatch(
            Audience::Others(id),
            ServerEvent::AnswerSubmitted {
                username: outcome.username,
                has_answered: true,
                is_correct: outcome.is_correct,
            },
        );
        self.dispatch(
            Audience::One(id),
            ServerEvent::AnswerResult {
                is_correct: outcome.is_correct,
                score: outcome.score,
                explanation: outcome.explanation,
            },
        );
        self.dispatch(
            Audience::Room,
            ServerEvent::UpdateLeaderboard { leaderboard: self.session.leaderboard() },
        );

        // Quorum: once everyone has answered, schedule a single delayed
        // advancement. `arm` is a no-op while one is already pending.
        if self.session.all_answered() && self.grace.arm(self.pacing.advance_grace) {
            tracing::debug!(room = %self.session.code(), "quorum reached, advancement scheduled");
        }
        Ok(())
    }

    fn handle_end(&mut self, id: ClientId) -> Result<(), RoomError> {
        let leaderboard = self.session.end_quiz(id)?;
        tracing::info!(room = %self.session.code(), "quiz ended by host");

        self.grace.disarm();
        self.question_deadline.disarm();
        self.dispatch(Audience::Room, ServerEvent::QuizEnded { leaderboard });
        Ok(())
    }

    fn handle_reset(&mut self, id: ClientId) -> Result<(), RoomError> {
        self.session.reset_for_replay(id)?;
        tracing::info!(room = %self.session.code(), "room reset for replay");

        self.grace.disarm();
        self.question_deadline.disarm();
        self.dispatch(
            Audience::Room,
            ServerEvent::QuizReset { participants: self.session.participant_views() },
        );
        Ok(())
    }

    /// Moves the room to its next question. Called from both timers.
    ///
    /// Must be a no-op when the room has already left `playing`: a host
    /// may end the quiz while an advancement is pending, and the stale
    /// callback firing afterwards must not double-advance or error.
    fn advance(&mut self) {
        self.grace.disarm();
        if !self.session.state().is_playing() {
            self.question_deadline.disarm();
            return;
        }

        match self.session.advance_question() {
            Ok(Advance::Next { question, question_number, total_questions }) => {
                tracing::debug!(
                    room = %self.session.code(),
                    question = question_number,
                    "advancing to next question"
                );
                self.question_deadline.rearm(self.question_timeout());
                self.dispatch(
                    Audience::Room,
                    ServerEvent::NextQuestion { question, question_number, total_questions },
                );
            }
            Ok(Advance::Finished { leaderboard }) => {
                tracing::info!(room = %self.session.code(), "quiz finished");
                self.question_deadline.disarm();
                self.dispatch(Audience::Room, ServerEvent::QuizFinished { leaderboard });
            }
            Err(e) => {
                // Guarded above; kept so a future refactor cannot turn a
                // stale timer into a panic.
                tracing::debug!(room = %self.session.code(), error = %e, "advance skipped");
            }
        }
    }

    fn question_timeout(&self) -> Duration {
        self.session.settings().time_per_question + self.pacing.deadline_slack
    }

    /// Delivers an event to its audience. Closed receivers are dropped
    /// silently — the participant is mid-disconnect.
    fn dispatch(&self, audience: Audience, event: ServerEvent) {
        match audience {
            Audience::Room => {
                for sender in self.senders.values() {
                    let _ = sender.send(event.clone());
                }
            }
            Audience::One(id) => {
                if let Some(sender) = self.senders.get(&id) {
                    let _ = sender.send(event);
                }
            }
            Audience::Others(excluded) => {
                for (id, sender) in &self.senders {
                    if *id != excluded {
                        let _ = sender.send(event.clone());
                    }
                }
            }
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
pub(crate) fn spawn_room(
    session: RoomSession,
    pacing: PacingConfig,
    channel_size: usize,
) -> RoomHandle {
    let code = session.code().clone();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        session,
        receiver: rx,
        senders: HashMap::new(),
        pacing,
        grace: DeadlineTimer::unarmed(),
        question_deadline: DeadlineTimer::unarmed(),
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
