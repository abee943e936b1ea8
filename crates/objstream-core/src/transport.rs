//! Inbound side of the engine: the streaming transport.
//!
//! The engine never builds requests itself. A [`Transport`] issues one request
//! per call to [`Transport::stream`] and pushes [`TransportEvent`]s into the
//! channel it is given, ending with a terminal event (or by dropping the
//! sender, which the driver treats as an interruption).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure reported by the transport
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportError {
    #[error("request failed: {message}")]
    Failed { message: String },

    #[error("stream interrupted: {message}")]
    Interrupted { message: String },

    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("could not decode partial object: {message}")]
    Decode { message: String },
}

/// One event from the streaming transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A partial (or full) object
    Snapshot { value: Value },
    /// Terminal success with the final object
    Complete { value: Value },
    /// Terminal or retryable failure
    Error { error: TransportError },
}

impl TransportEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransportEvent::Snapshot { .. })
    }
}

/// Producer of snapshot events for one streamed object
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request and push its events into `tx`
    ///
    /// Called once per attempt; a retry calls it again.
    async fn stream(&self, tx: mpsc::UnboundedSender<TransportEvent>);
}

/// Transport that replays pre-recorded events, one script per attempt
///
/// Once the scripts run out, further attempts fail with
/// [`TransportError::Failed`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    attempts: Mutex<VecDeque<Vec<TransportEvent>>>,
}

impl ScriptedTransport {
    pub fn new(attempts: Vec<Vec<TransportEvent>>) -> Self {
        Self {
            attempts: Mutex::new(attempts.into()),
        }
    }

    /// Split a flat recording into attempts, cutting after each error event
    pub fn from_recording(events: Vec<TransportEvent>) -> Self {
        let mut attempts = Vec::new();
        let mut current = Vec::new();
        for event in events {
            let ends_attempt = matches!(event, TransportEvent::Error { .. });
            current.push(event);
            if ends_attempt {
                attempts.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            attempts.push(current);
        }
        Self::new(attempts)
    }

    /// Number of attempts not yet replayed
    pub fn remaining(&self) -> usize {
        self.attempts.lock().map(|a| a.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn stream(&self, tx: mpsc::UnboundedSender<TransportEvent>) {
        let script = self.attempts.lock().ok().and_then(|mut a| a.pop_front());
        let events = script.unwrap_or_else(|| {
            vec![TransportEvent::Error {
                error: TransportError::Failed {
                    message: "no scripted attempt left".to_string(),
                },
            }]
        });
        for event in events {
            if tx.send(event).is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }
}
