//! Borrowed snapshot of a session's observable state

use objstream_core_types::{AttemptId, SessionId};
use serde_json::Value;

use crate::model::ChangeSet;
use crate::retry::{RetryState, StreamingState};
use crate::transport::TransportError;

/// What listeners and hosts observe after each transition
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub session_id: &'a SessionId,
    pub attempt: AttemptId,
    pub snapshot: Option<&'a Value>,
    pub state: StreamingState,
    /// `None` when progress display is turned off
    pub progress: Option<u8>,
    /// Paths still inside their marker window
    pub updated_paths: &'a ChangeSet,
    pub error: Option<&'a TransportError>,
    pub retry: RetryState,
}

impl SessionView<'_> {
    /// The error is terminal: no retry can leave it
    pub fn is_retry_exhausted(&self) -> bool {
        self.state == StreamingState::Error && self.retry.is_exhausted()
    }

    pub fn can_retry(&self) -> bool {
        self.state == StreamingState::Error && self.retry.can_retry()
    }
}
