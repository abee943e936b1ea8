//! Bounded retry state machine for one streamed object.
//!
//! ```text
//! streaming --complete--> complete            (terminal)
//! streaming --error-----> error
//! error     --retry-----> streaming           (only while retry_count < max_retries)
//! error                                       (terminal once retries are spent)
//! ```
//!
//! Duplicate terminal signals are absorbed: an error or completion arriving
//! in `complete`, or an error arriving while already in `error`, is ignored.

use serde::{Deserialize, Serialize};

use crate::errors::{ReconcileError, Result};
use crate::transport::TransportError;

/// Default bound on retries when none is configured
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Lifecycle phase of a reconciliation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingState {
    Streaming,
    Complete,
    Error,
}

impl StreamingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamingState::Streaming => "streaming",
            StreamingState::Complete => "complete",
            StreamingState::Error => "error",
        }
    }
}

impl std::fmt::Display for StreamingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retry budget: failures seen so far against the configured bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryState {
    pub retry_count: u32,
    pub max_retries: u32,
}

impl RetryState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            retry_count: 0,
            max_retries,
        }
    }

    /// Whether another retry would be permitted
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Whether the budget is spent
    pub fn is_exhausted(&self) -> bool {
        !self.can_retry()
    }

    /// Caller-facing counter, e.g. `Retry (1/3)`
    pub fn label(&self) -> String {
        format!("Retry ({}/{})", self.retry_count, self.max_retries)
    }
}

/// Gates transitions between streaming, complete and error
#[derive(Debug, Clone)]
pub struct RetryController {
    state: StreamingState,
    budget: RetryState,
    error: Option<TransportError>,
}

impl RetryController {
    pub fn new(max_retries: u32) -> Self {
        Self {
            state: StreamingState::Streaming,
            budget: RetryState::new(max_retries),
            error: None,
        }
    }

    pub fn state(&self) -> StreamingState {
        self.state
    }

    pub fn budget(&self) -> RetryState {
        self.budget
    }

    /// The stored transport error while in the error state
    pub fn error(&self) -> Option<&TransportError> {
        self.error.as_ref()
    }

    /// True once the error state can no longer be left
    pub fn is_terminal_error(&self) -> bool {
        self.state == StreamingState::Error && self.budget.is_exhausted()
    }

    /// Record a transport failure
    ///
    /// Returns false (and changes nothing) when the signal is a duplicate:
    /// the stream already completed or is already in error.
    pub fn on_transport_error(&mut self, err: TransportError) -> bool {
        if self.state != StreamingState::Streaming {
            return false;
        }
        self.state = StreamingState::Error;
        self.budget.retry_count = self.budget.retry_count.saturating_add(1);
        self.error = Some(err);
        true
    }

    /// Record successful completion; only valid while streaming
    pub fn on_transport_complete(&mut self) -> bool {
        if self.state != StreamingState::Streaming {
            return false;
        }
        self.state = StreamingState::Complete;
        true
    }

    /// Leave the error state so the caller can re-issue the request
    ///
    /// # Errors
    ///
    /// - `RetryNotAllowed` - not currently in the error state
    /// - `RetryExhausted` - `retry_count >= max_retries`
    pub fn retry(&mut self) -> Result<()> {
        if self.state != StreamingState::Error {
            return Err(ReconcileError::RetryNotAllowed {
                state: self.state.to_string(),
            });
        }
        if self.budget.is_exhausted() {
            return Err(ReconcileError::RetryExhausted {
                retry_count: self.budget.retry_count,
                max_retries: self.budget.max_retries,
            });
        }
        self.state = StreamingState::Streaming;
        self.error = None;
        Ok(())
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(msg: &str) -> TransportError {
        TransportError::Failed {
            message: msg.to_string(),
        }
    }

    #[test]
    fn test_error_then_retry_then_exhaustion() {
        let mut ctl = RetryController::new(2);

        assert!(ctl.on_transport_error(failure("e1")));
        assert_eq!(ctl.state(), StreamingState::Error);
        assert_eq!(ctl.budget().retry_count, 1);

        ctl.retry().unwrap();
        assert_eq!(ctl.state(), StreamingState::Streaming);
        assert_eq!(ctl.budget().retry_count, 1);
        assert!(ctl.error().is_none());

        assert!(ctl.on_transport_error(failure("e2")));
        assert_eq!(ctl.budget().retry_count, 2);
        assert!(ctl.is_terminal_error());

        let err = ctl.retry().unwrap_err();
        assert_eq!(
            err,
            ReconcileError::RetryExhausted {
                retry_count: 2,
                max_retries: 2
            }
        );
        assert_eq!(ctl.state(), StreamingState::Error);
        assert_eq!(ctl.error(), Some(&failure("e2")));
    }

    #[test]
    fn test_single_retry_budget_is_spent_by_first_failure() {
        let mut ctl = RetryController::new(1);
        ctl.on_transport_error(failure("boom"));
        assert!(matches!(
            ctl.retry(),
            Err(ReconcileError::RetryExhausted { .. })
        ));
    }

    #[test]
    fn test_zero_retries_means_first_error_is_terminal() {
        let mut ctl = RetryController::new(0);
        ctl.on_transport_error(failure("boom"));
        assert!(ctl.is_terminal_error());
        assert!(ctl.retry().is_err());
    }

    #[test]
    fn test_complete_is_terminal_and_absorbs_duplicates() {
        let mut ctl = RetryController::default();
        assert!(ctl.on_transport_complete());
        assert!(!ctl.on_transport_complete());
        assert!(!ctl.on_transport_error(failure("late")));
        assert_eq!(ctl.state(), StreamingState::Complete);
        assert_eq!(ctl.budget().retry_count, 0);
        assert!(matches!(
            ctl.retry(),
            Err(ReconcileError::RetryNotAllowed { .. })
        ));
    }

    #[test]
    fn test_duplicate_error_does_not_consume_budget() {
        let mut ctl = RetryController::new(3);
        ctl.on_transport_error(failure("first"));
        assert!(!ctl.on_transport_error(failure("echo")));
        assert_eq!(ctl.budget().retry_count, 1);
        assert_eq!(ctl.error(), Some(&failure("first")));
    }

    #[test]
    fn test_complete_from_error_is_ignored() {
        let mut ctl = RetryController::new(0);
        ctl.on_transport_error(failure("x"));
        assert!(!ctl.on_transport_complete());
        assert_eq!(ctl.state(), StreamingState::Error);
    }

    #[test]
    fn test_retry_label() {
        let mut ctl = RetryController::new(3);
        ctl.on_transport_error(failure("x"));
        assert_eq!(ctl.budget().label(), "Retry (1/3)");
    }
}
