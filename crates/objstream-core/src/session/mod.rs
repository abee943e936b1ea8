//! Reconciliation session
//!
//! The session is the single owner of one streamed object's state. Transport
//! events are fed in one at a time, in arrival order; each accepted event
//! updates the snapshot, progress, update markers and retry state, then fires
//! the matching callback and notifies subscribers, all before returning.
//!
//! ```
//! use objstream_core::session::ReconciliationSession;
//! use objstream_core::options::StreamOptions;
//! use objstream_core::retry::StreamingState;
//! use serde_json::json;
//!
//! let mut session = ReconciliationSession::new(StreamOptions::default());
//! session.start(None).unwrap();
//! session.on_transport_snapshot(json!({ "title": "Dra" }));
//! session.on_transport_complete(json!({ "title": "Draft" }));
//! assert_eq!(session.state(), StreamingState::Complete);
//! assert_eq!(session.progress(), Some(100));
//! ```

pub mod callbacks;
pub mod view;

pub use callbacks::StreamCallbacks;
pub use view::SessionView;

use objstream_core_types::{AttemptId, SessionId};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::diff::compute_changes;
use crate::errors::{ExError, ReconcileError, Result};
use crate::markers::{Clock, SystemClock, TimerToken, UpdateMarkerTracker};
use crate::model::{ChangeSet, SchemaDescriptor};
use crate::options::StreamOptions;
use crate::present::{present, FieldSelection, Node, PresentOptions};
use crate::progress::{self, COMPLETE};
use crate::retry::{RetryController, RetryState, StreamingState};
use crate::transport::{TransportError, TransportEvent};
use crate::{log_op_end, log_op_error, log_op_start};

type Listener = Box<dyn FnMut(&SessionView<'_>) + Send>;

/// Handle returned by [`ReconciliationSession::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Orchestrates differ, progress, markers and retry for one streamed object
pub struct ReconciliationSession {
    id: SessionId,
    attempt: AttemptId,
    options: StreamOptions,
    schema: Option<SchemaDescriptor>,
    callbacks: StreamCallbacks,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    clock: Arc<dyn Clock>,
    retry: RetryController,
    markers: UpdateMarkerTracker,
    initial: Option<Value>,
    snapshot: Option<Value>,
    last_changes: ChangeSet,
    progress: u8,
    started: bool,
    disposed: bool,
}

impl ReconciliationSession {
    pub fn new(options: StreamOptions) -> Self {
        let retry = RetryController::new(options.max_retries);
        let markers = UpdateMarkerTracker::new(options.enable_animations, options.marker_window());
        Self {
            id: SessionId::new(),
            attempt: AttemptId::FIRST,
            options,
            schema: None,
            callbacks: StreamCallbacks::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            clock: Arc::new(SystemClock),
            retry,
            markers,
            initial: None,
            snapshot: None,
            last_changes: ChangeSet::new(),
            progress: 0,
            started: false,
            disposed: false,
        }
    }

    /// Schema used as the progress denominator
    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_callbacks(mut self, callbacks: StreamCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Time source for marker expiry
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ----- lifecycle -----

    /// Begin the first stream attempt
    ///
    /// Sets the snapshot to `initial` (or nothing), progress to 0, and fires
    /// `on_stream_start`. A session runs a single stream: later attempts go
    /// through [`retry`](Self::retry), and a restart needs a new session.
    ///
    /// # Errors
    ///
    /// - `SessionDisposed` - the session was disposed
    /// - `AlreadyStarted` - `start` was already called on this session
    pub fn start(&mut self, initial: Option<Value>) -> Result<()> {
        if self.disposed {
            return Err(ReconcileError::SessionDisposed);
        }
        if self.started {
            return Err(ReconcileError::AlreadyStarted {
                state: self.retry.state().to_string(),
            });
        }
        self.attempt = AttemptId::FIRST;
        self.initial = initial;
        self.started = true;
        self.begin_attempt();
        Ok(())
    }

    /// Leave the error state and start the next attempt
    ///
    /// On success the caller must re-issue the transport request.
    ///
    /// # Errors
    ///
    /// - `SessionDisposed` - the session was disposed
    /// - `RetryNotAllowed` - the session is not in the error state
    /// - `RetryExhausted` - the retry budget is spent
    pub fn retry(&mut self) -> Result<()> {
        log_op_start!(
            "retry",
            session_id = %self.id,
            retry_count = self.retry.budget().retry_count,
            max_retries = self.retry.budget().max_retries
        );
        let start = Instant::now();

        let result = if self.disposed {
            Err(ReconcileError::SessionDisposed)
        } else {
            self.retry.retry()
        };
        if let Err(e) = result {
            log_op_error!(
                "retry",
                ExError::from(e.clone()).with_session_id(self.id.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                session_id = %self.id
            );
            return Err(e);
        }

        self.attempt = self.attempt.next();
        self.begin_attempt();

        log_op_end!(
            "retry",
            duration_ms = start.elapsed().as_millis() as u64,
            session_id = %self.id,
            attempt = self.attempt.number()
        );
        Ok(())
    }

    /// Cancel pending marker expiry, drop listeners, ignore later events
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.markers.dispose();
        self.listeners.clear();
        self.disposed = true;
        tracing::debug!(session_id = %self.id, "session disposed");
    }

    fn begin_attempt(&mut self) {
        self.snapshot = self.initial.clone();
        self.progress = 0;
        self.last_changes = ChangeSet::new();
        self.markers.clear();

        tracing::debug!(
            session_id = %self.id,
            attempt = self.attempt.number(),
            "stream attempt started"
        );
        if let Some(cb) = self.callbacks.on_stream_start.as_mut() {
            cb();
        }
        self.notify();
    }

    // ----- transport events -----

    /// Dispatch one transport event; returns whether it was accepted
    pub fn handle(&mut self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::Snapshot { value } => self.on_transport_snapshot(value),
            TransportEvent::Complete { value } => self.on_transport_complete(value),
            TransportEvent::Error { error } => self.on_transport_error(error),
        }
    }

    /// Reconcile a new partial snapshot
    ///
    /// Dropped (returns false) unless the session is started, not disposed
    /// and streaming.
    pub fn on_transport_snapshot(&mut self, next: Value) -> bool {
        if !self.accepts_events() || self.retry.state() != StreamingState::Streaming {
            tracing::debug!(session_id = %self.id, state = %self.retry.state(), "snapshot dropped");
            return false;
        }

        let changes = self.replace_snapshot(next);
        self.progress = progress::estimate(self.snapshot.as_ref(), self.schema.as_ref());

        tracing::debug!(
            session_id = %self.id,
            attempt = self.attempt.number(),
            path_count = changes.len(),
            progress = self.progress,
            "snapshot reconciled"
        );
        if let (Some(cb), Some(snapshot)) = (
            self.callbacks.on_object_update.as_mut(),
            self.snapshot.as_ref(),
        ) {
            cb(snapshot, &changes);
        }
        self.notify();
        true
    }

    /// Accept the final object; only valid while streaming
    pub fn on_transport_complete(&mut self, final_value: Value) -> bool {
        if !self.accepts_events() || !self.retry.on_transport_complete() {
            tracing::debug!(session_id = %self.id, "duplicate completion ignored");
            return false;
        }

        let changes = self.replace_snapshot(final_value);
        self.progress = COMPLETE;

        tracing::info!(
            session_id = %self.id,
            attempt = self.attempt.number(),
            path_count = changes.len(),
            "stream complete"
        );
        if let (Some(cb), Some(snapshot)) = (
            self.callbacks.on_stream_complete.as_mut(),
            self.snapshot.as_ref(),
        ) {
            cb(snapshot);
        }
        self.notify();
        true
    }

    /// Record a transport failure
    pub fn on_transport_error(&mut self, err: TransportError) -> bool {
        if !self.accepts_events() || !self.retry.on_transport_error(err) {
            tracing::debug!(session_id = %self.id, "transport error ignored");
            return false;
        }

        let budget = self.retry.budget();
        tracing::warn!(
            session_id = %self.id,
            attempt = self.attempt.number(),
            retry_count = budget.retry_count,
            max_retries = budget.max_retries,
            terminal = budget.is_exhausted(),
            "stream failed"
        );
        if let (Some(cb), Some(err)) = (self.callbacks.on_stream_error.as_mut(), self.retry.error()) {
            cb(err);
        }
        self.notify();
        true
    }

    fn accepts_events(&self) -> bool {
        self.started && !self.disposed
    }

    fn replace_snapshot(&mut self, next: Value) -> ChangeSet {
        let changes = compute_changes(self.snapshot.as_ref(), &next);
        self.snapshot = Some(next);
        self.markers.mark_changed(changes.clone(), self.clock.now());
        self.last_changes = changes.clone();
        changes
    }

    // ----- markers -----

    /// Expire update markers whose window has elapsed on the session clock
    ///
    /// Returns true (and notifies subscribers) if markers were cleared.
    pub fn tick(&mut self) -> bool {
        if self.disposed || !self.markers.poll(self.clock.now()) {
            return false;
        }
        self.notify();
        true
    }

    /// Fire a scheduled marker expiry; stale tokens are ignored
    pub fn expire_markers(&mut self, token: TimerToken) -> bool {
        if self.disposed || !self.markers.expire(token) {
            return false;
        }
        self.notify();
        true
    }

    /// Deadline and token of the pending marker expiry
    pub fn pending_marker_expiry(&self) -> Option<(Instant, TimerToken)> {
        self.markers.pending_expiry()
    }

    /// Current instant on the session clock
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    // ----- host interaction -----

    /// Route a selection from the presented tree to `on_field_update`
    pub fn select_field(&mut self, selection: &FieldSelection) {
        if self.disposed {
            return;
        }
        if let Some(cb) = self.callbacks.on_field_update.as_mut() {
            cb(&selection.path, &selection.value);
        }
    }

    /// Present the current snapshot with its update markers
    pub fn present(&self, options: &PresentOptions) -> Node {
        present(self.snapshot.as_ref(), self.markers.updated_paths(), options)
    }

    /// Register a listener called after every state transition
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionView<'_>) + Send + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        if !self.disposed {
            self.listeners.push((id, Box::new(listener)));
        }
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        let view = self.view();
        for (_, listener) in listeners.iter_mut() {
            listener(&view);
        }
        self.listeners = listeners;
    }

    // ----- observable state -----

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            session_id: &self.id,
            attempt: self.attempt,
            snapshot: self.snapshot.as_ref(),
            state: self.retry.state(),
            progress: self.progress(),
            updated_paths: self.markers.updated_paths(),
            error: self.retry.error(),
            retry: self.retry.budget(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    pub fn schema(&self) -> Option<&SchemaDescriptor> {
        self.schema.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Value> {
        self.snapshot.as_ref()
    }

    pub fn state(&self) -> StreamingState {
        self.retry.state()
    }

    /// Current progress, or `None` when `show_progress` is off
    pub fn progress(&self) -> Option<u8> {
        self.options.show_progress.then_some(self.progress)
    }

    /// Paths still inside their marker window
    pub fn updated_paths(&self) -> &ChangeSet {
        self.markers.updated_paths()
    }

    /// Change set of the most recent snapshot, regardless of marker expiry
    pub fn last_changes(&self) -> &ChangeSet {
        &self.last_changes
    }

    pub fn error(&self) -> Option<&TransportError> {
        self.retry.error()
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry.budget()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for ReconciliationSession {
    fn drop(&mut self) {
        self.markers.dispose();
    }
}

impl std::fmt::Debug for ReconciliationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationSession")
            .field("id", &self.id)
            .field("attempt", &self.attempt)
            .field("state", &self.retry.state())
            .field("progress", &self.progress)
            .field("listeners", &self.listeners.len())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
