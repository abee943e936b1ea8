//! Async driver tests
//!
//! All tests run on paused tokio time, so sleeps inside transports and the
//! marker/debounce deadlines advance instantly and deterministically.

mod common;

use async_trait::async_trait;
use common::{complete, failure, snapshot, Recorder};
use objstream_core::driver::{run_attempt, run_with_retries, settle_markers};
use objstream_core::errors::ReconcileError;
use objstream_core::{
    ReconciliationSession, ScriptedTransport, StreamCallbacks, StreamOptions, StreamingState,
    Transport, TransportError, TransportEvent,
};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

/// Sends each event after waiting the given number of milliseconds
struct TimedTransport {
    events: Vec<(u64, TransportEvent)>,
}

#[async_trait]
impl Transport for TimedTransport {
    async fn stream(&self, tx: mpsc::UnboundedSender<TransportEvent>) {
        for (delay_ms, event) in &self.events {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
            if tx.send(event.clone()).is_err() {
                return;
            }
        }
    }
}

fn recording_session(options: StreamOptions, recorder: &Recorder) -> ReconciliationSession {
    let (updates, starts, errors) = (recorder.clone(), recorder.clone(), recorder.clone());
    ReconciliationSession::new(options).with_callbacks(
        StreamCallbacks::new()
            .on_stream_start(move || starts.push("start"))
            .on_object_update(move |value, _| updates.push(format!("update {}", value)))
            .on_stream_error(move |err| errors.push(format!("error {}", err))),
    )
}

#[tokio::test(start_paused = true)]
async fn test_attempt_applies_events_in_order() {
    let recorder = Recorder::default();
    let mut session = recording_session(StreamOptions::default(), &recorder);
    let transport = ScriptedTransport::new(vec![vec![
        snapshot(json!({ "a": 1 })),
        snapshot(json!({ "a": 1, "b": 2 })),
        complete(json!({ "a": 1, "b": 2, "c": 3 })),
    ]]);

    let state = run_attempt(&mut session, &transport).await;

    assert_eq!(state, StreamingState::Complete);
    assert_eq!(session.progress(), Some(100));
    assert_eq!(
        recorder.entries(),
        vec!["start", "update {\"a\":1}", "update {\"a\":1,\"b\":2}"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_debounce_applies_only_latest_snapshot() {
    let recorder = Recorder::default();
    let options = StreamOptions::default().with_debounce(Duration::from_millis(50));
    let mut session = recording_session(options, &recorder);
    let transport = TimedTransport {
        events: vec![
            (0, snapshot(json!({ "a": 1 }))),
            (10, snapshot(json!({ "a": 2 }))),
            (10, snapshot(json!({ "a": 3 }))),
            (200, snapshot(json!({ "a": 4 }))),
            (300, complete(json!({ "a": 4 }))),
        ],
    };

    run_attempt(&mut session, &transport).await;

    assert_eq!(
        recorder.entries(),
        vec!["start", "update {\"a\":3}", "update {\"a\":4}"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_terminal_event_flushes_pending_snapshot() {
    let recorder = Recorder::default();
    let options = StreamOptions::default().with_debounce(Duration::from_millis(100));
    let mut session = recording_session(options, &recorder);
    let transport = TimedTransport {
        events: vec![
            (0, snapshot(json!({ "a": 1 }))),
            (10, failure("dropped")),
        ],
    };

    let state = run_attempt(&mut session, &transport).await;

    assert_eq!(state, StreamingState::Error);
    assert_eq!(
        recorder.entries(),
        vec!["start", "update {\"a\":1}", "error request failed: dropped"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_closed_channel_is_interrupted() {
    let mut session = ReconciliationSession::new(StreamOptions::default());
    let transport = ScriptedTransport::new(vec![vec![snapshot(json!({ "a": 1 }))]]);

    let state = run_attempt(&mut session, &transport).await;

    assert_eq!(state, StreamingState::Error);
    assert!(matches!(
        session.error(),
        Some(TransportError::Interrupted { .. })
    ));
    assert_eq!(session.snapshot(), Some(&json!({ "a": 1 })));
}

#[tokio::test(start_paused = true)]
async fn test_markers_expire_mid_stream() {
    let mut session = ReconciliationSession::new(StreamOptions::default());
    let counts = Recorder::default();
    let sink = counts.clone();
    session.subscribe(move |view| sink.push(view.updated_paths.len().to_string()));
    let transport = TimedTransport {
        events: vec![
            (0, snapshot(json!({ "a": 1 }))),
            (1500, complete(json!({ "a": 1, "b": 2 }))),
        ],
    };

    run_attempt(&mut session, &transport).await;

    // start, snapshot, marker expiry, completion
    assert_eq!(counts.entries(), vec!["0", "1", "0", "1"]);
    assert!(session.updated_paths().contains_str("b"));

    assert!(settle_markers(&mut session).await);
    assert!(session.updated_paths().is_empty());
    assert!(!settle_markers(&mut session).await);
}

#[tokio::test(start_paused = true)]
async fn test_run_with_retries_recovers() {
    let recorder = Recorder::default();
    let mut session = recording_session(StreamOptions::default(), &recorder);
    let transport = ScriptedTransport::new(vec![
        vec![snapshot(json!({ "a": 1 })), failure("reset")],
        vec![snapshot(json!({ "a": 1 })), complete(json!({ "a": 1, "b": 2 }))],
    ]);

    let started = tokio::time::Instant::now();
    let value = run_with_retries(&mut session, &transport, Duration::from_millis(250))
        .await
        .unwrap();

    assert_eq!(value, json!({ "a": 1, "b": 2 }));
    assert_eq!(session.attempt().number(), 2);
    assert_eq!(session.retry_state().retry_count, 1);
    assert_eq!(recorder.count("start"), 2);
    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_with_retries_reports_last_failure_when_exhausted() {
    let mut session = ReconciliationSession::new(StreamOptions::default().with_max_retries(2));
    let transport = ScriptedTransport::new(vec![vec![failure("first")], vec![failure("second")]]);

    let err = run_with_retries(&mut session, &transport, Duration::ZERO)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ReconcileError::Transport(TransportError::Failed {
            message: "second".into()
        })
    );
    assert_eq!(session.state(), StreamingState::Error);
    assert!(session.view().is_retry_exhausted());
}

#[tokio::test(start_paused = true)]
async fn test_disposed_session_is_not_driven() {
    let mut session = ReconciliationSession::new(StreamOptions::default());
    session.dispose();
    let transport = ScriptedTransport::new(vec![vec![complete(json!({}))]]);

    let err = run_with_retries(&mut session, &transport, Duration::ZERO)
        .await
        .unwrap_err();

    assert_eq!(err, ReconcileError::SessionDisposed);
    assert_eq!(transport.remaining(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_attempt_skips_transport_when_start_is_refused() {
    let recorder = Recorder::default();
    let mut session = recording_session(StreamOptions::default(), &recorder);
    session.dispose();
    let transport = ScriptedTransport::new(vec![vec![complete(json!({ "a": 1 }))]]);

    let state = run_attempt(&mut session, &transport).await;

    assert_eq!(state, session.state());
    assert!(!session.is_started());
    assert!(recorder.entries().is_empty());
    assert_eq!(transport.remaining(), 1);
}
