//! One-shot deadline timer for Quizhub room pacing.
//!
//! A room actor needs two clocks: the short grace delay after every
//! participant has answered, and the hard per-question timeout that keeps
//! a room from waiting forever on a participant who never answers. Both
//! are one-shot deadlines that live inside the actor's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* handle commands */ }
//!         _ = grace.fired() => self.advance(),
//!         _ = question_deadline.fired() => self.advance(),
//!     }
//! }
//! ```
//!
//! An unarmed timer pends forever, so idle branches never wake the loop.

use std::future;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::trace;

/// A one-shot deadline usable as a `select!` branch.
///
/// At most one deadline is pending at a time: [`arm`](Self::arm) is a
/// no-op while a deadline is outstanding, which is how a room guarantees
/// a single scheduled advancement per question. [`rearm`](Self::rearm)
/// replaces the deadline unconditionally (used for per-question timeouts
/// that reset on every question).
///
/// # Cancellation safety
///
/// [`fired`](Self::fired) only clears the deadline after it resolves. If
/// `select!` drops the future mid-wait, the deadline stays set and the
/// next call picks it up again.
#[derive(Debug, Default)]
pub struct DeadlineTimer {
    deadline: Option<Instant>,
}

impl DeadlineTimer {
    /// Creates a timer with no pending deadline.
    pub fn unarmed() -> Self {
        Self::default()
    }

    /// Arms the timer to fire after `delay`.
    ///
    /// Returns `false` without touching the pending deadline if one is
    /// already scheduled.
    pub fn arm(&mut self, delay: Duration) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(Instant::now() + delay);
        trace!(delay_ms = delay.as_millis() as u64, "deadline armed");
        true
    }

    /// Replaces any pending deadline with `now + delay`.
    pub fn rearm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
        trace!(delay_ms = delay.as_millis() as u64, "deadline rearmed");
    }

    /// Clears any pending deadline.
    pub fn disarm(&mut self) {
        if self.deadline.take().is_some() {
            trace!("deadline disarmed");
        }
    }

    /// Whether a deadline is currently pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves once the pending deadline passes, then clears it.
    ///
    /// Pends forever while unarmed — `select!` just keeps processing its
    /// other branches.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(at) => {
                time::sleep_until(at).await;
                self.deadline = None;
            }
            None => future::pending::<()>().await,
        }
    }
}
