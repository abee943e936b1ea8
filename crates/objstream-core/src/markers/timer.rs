//! Cancellable one-shot expiry timer
//!
//! The timer holds at most one armed deadline. Every arming produces a new
//! [`TimerToken`]; firing with any token other than the current one does
//! nothing, so a callback scheduled for an earlier arming can never clear
//! state belonging to a later one.

use std::time::Instant;

/// Identifies one arming of an [`ExpiryTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Default)]
pub struct ExpiryTimer {
    generation: u64,
    deadline: Option<Instant>,
}

impl ExpiryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer, invalidating any earlier token
    pub fn arm(&mut self, deadline: Instant) -> TimerToken {
        self.generation += 1;
        self.deadline = Some(deadline);
        TimerToken(self.generation)
    }

    /// Cancel the pending deadline; a no-op if nothing is armed
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            self.generation += 1;
        }
    }

    /// Whether a deadline is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline and the token that will fire it
    pub fn pending(&self) -> Option<(Instant, TimerToken)> {
        self.deadline.map(|at| (at, TimerToken(self.generation)))
    }

    /// Fire the timer if `token` is the current arming
    ///
    /// Returns true when the timer fired (and is now disarmed).
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.deadline.is_some() && token.0 == self.generation {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Fire the timer if its deadline has passed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
