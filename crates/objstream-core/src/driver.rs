//! Async driver connecting a [`Transport`] to a [`ReconciliationSession`].
//!
//! ## Logging Ownership
//!
//! The driver owns lifecycle logging for stream attempts:
//! - `log_op_start!` when an attempt is issued
//! - `log_op_end!` when it completes
//! - `log_op_error!` when it fails
//!
//! The session itself uses only `tracing::debug!()`/`warn!()` for event detail.
//!
//! ## Scheduling
//!
//! Everything runs on the caller's task. One attempt multiplexes, with
//! `tokio::select!`, the transport future, its event channel, the update
//! marker expiry deadline and the debounce deadline. Dropping the transport
//! future after a terminal event is how forwarding stops.

use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant as TokioInstant};

use crate::errors::{ExError, ReconcileError, Result};
use crate::markers::TimerToken;
use crate::retry::StreamingState;
use crate::session::ReconciliationSession;
use crate::transport::{Transport, TransportError, TransportEvent};
use crate::{log_op_end, log_op_error, log_op_start};

/// Marker expiry translated onto the tokio timeline
#[derive(Debug, Default)]
struct MarkerSchedule {
    tracked: Option<(TimerToken, TokioInstant)>,
}

impl MarkerSchedule {
    fn next(&mut self, session: &ReconciliationSession) -> Option<(TimerToken, TokioInstant)> {
        let Some((at, token)) = session.pending_marker_expiry() else {
            self.tracked = None;
            return None;
        };
        match self.tracked {
            Some((tracked, deadline)) if tracked == token => Some((tracked, deadline)),
            _ => {
                let remaining = at.saturating_duration_since(session.now());
                let scheduled = (token, TokioInstant::now() + remaining);
                self.tracked = Some(scheduled);
                Some(scheduled)
            }
        }
    }
}

/// Snapshots held back by the debounce window
#[derive(Debug, Default)]
struct Debouncer {
    delay: Option<Duration>,
    pending: Option<Value>,
    deadline: Option<TokioInstant>,
}

impl Debouncer {
    fn new(delay: Option<Duration>) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Hold `value` back, or hand it straight through when debouncing is off
    fn offer(&mut self, value: Value) -> Option<Value> {
        let Some(delay) = self.delay else {
            return Some(value);
        };
        // The window opens with the first held snapshot; later ones replace it.
        if self.deadline.is_none() {
            self.deadline = Some(TokioInstant::now() + delay);
        }
        self.pending = Some(value);
        None
    }

    fn take(&mut self) -> Option<Value> {
        self.deadline = None;
        self.pending.take()
    }
}

/// Drive one transport attempt to its terminal event
///
/// Starts the session first if it has not been started. Returns the state
/// the session is left in. If the transport stops without a terminal event
/// the attempt is failed with [`TransportError::Interrupted`].
pub async fn run_attempt<T>(session: &mut ReconciliationSession, transport: &T) -> StreamingState
where
    T: Transport + ?Sized,
{
    if !session.is_started() {
        if let Err(err) = session.start(None) {
            tracing::debug!(session_id = %session.id(), error = %err, "attempt not started");
            return session.state();
        }
    }
    if session.is_disposed() || session.state() != StreamingState::Streaming {
        return session.state();
    }

    log_op_start!(
        "stream_attempt",
        session_id = %session.id(),
        attempt = session.attempt().number()
    );
    let started = std::time::Instant::now();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let produce = transport.stream(tx);
    tokio::pin!(produce);
    let mut producing = true;

    let mut markers = MarkerSchedule::default();
    let mut debounce = Debouncer::new(session.options().debounce_delay());

    loop {
        let marker_due = markers.next(session);
        let debounce_due = debounce.deadline;

        tokio::select! {
            biased;

            event = rx.recv() => match event {
                Some(TransportEvent::Snapshot { value }) => {
                    if let Some(value) = debounce.offer(value) {
                        session.on_transport_snapshot(value);
                    }
                }
                Some(terminal) => {
                    if let Some(value) = debounce.take() {
                        session.on_transport_snapshot(value);
                    }
                    session.handle(terminal);
                    break;
                }
                None => {
                    if let Some(value) = debounce.take() {
                        session.on_transport_snapshot(value);
                    }
                    session.on_transport_error(TransportError::Interrupted {
                        message: "transport closed without a terminal event".to_string(),
                    });
                    break;
                }
            },

            _ = &mut produce, if producing => {
                // The sender is dropped with the future; rx drains what is buffered.
                producing = false;
            }

            _ = sleep_until(debounce_due.unwrap_or_else(TokioInstant::now)), if debounce_due.is_some() => {
                if let Some(value) = debounce.take() {
                    session.on_transport_snapshot(value);
                }
            }

            _ = sleep_until(marker_due.map(|(_, at)| at).unwrap_or_else(TokioInstant::now)), if marker_due.is_some() => {
                if let Some((token, _)) = marker_due {
                    session.expire_markers(token);
                }
            }
        }
    }

    let duration_ms = started.elapsed().as_millis() as u64;
    match (session.state(), session.error()) {
        (StreamingState::Error, Some(err)) => {
            log_op_error!(
                "stream_attempt",
                ExError::from(err.clone()).with_session_id(session.id().clone()),
                duration_ms = duration_ms,
                session_id = %session.id(),
                attempt = session.attempt().number()
            );
        }
        (state, _) => {
            log_op_end!(
                "stream_attempt",
                duration_ms = duration_ms,
                session_id = %session.id(),
                attempt = session.attempt().number(),
                state = %state
            );
        }
    }
    session.state()
}

/// Drive attempts until completion, retrying after each failure while the
/// budget allows, sleeping `backoff` before each retry
///
/// # Errors
///
/// - `Transport` - the last failure, once retries are exhausted
/// - `SessionDisposed` - the session was disposed before completing
pub async fn run_with_retries<T>(
    session: &mut ReconciliationSession,
    transport: &T,
    backoff: Duration,
) -> Result<Value>
where
    T: Transport + ?Sized,
{
    loop {
        let state = run_attempt(session, transport).await;
        if session.is_disposed() {
            return Err(ReconcileError::SessionDisposed);
        }
        if state == StreamingState::Complete {
            return session
                .snapshot()
                .cloned()
                .ok_or(ReconcileError::Transport(TransportError::Decode {
                    message: "completed without a final object".to_string(),
                }));
        }

        let last_error = session.error().cloned();
        if let Err(refused) = session.retry() {
            return Err(last_error.map(ReconcileError::Transport).unwrap_or(refused));
        }
        if !backoff.is_zero() {
            tokio::time::sleep(backoff).await;
        }
    }
}

/// Wait for the pending update marker expiry (if any) and fire it
///
/// Returns true if markers were cleared.
pub async fn settle_markers(session: &mut ReconciliationSession) -> bool {
    let mut markers = MarkerSchedule::default();
    match markers.next(session) {
        Some((token, at)) => {
            sleep_until(at).await;
            session.expire_markers(token)
        }
        None => false,
    }
}
