use objstream_core::errors::{ExError, ExErrorKind, ReconcileError};
use objstream_core::{ReconciliationSession, StreamOptions, TransportError};
use objstream_core_types::SessionId;
use std::io::Write;

#[test]
fn test_retry_exhausted_verifiable_by_kind() {
    let err = ReconcileError::RetryExhausted {
        retry_count: 2,
        max_retries: 2,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::RetryExhausted);
    assert_eq!(ex_err.code(), "ERR_RETRY_EXHAUSTED");
    assert_eq!(ex_err.op(), Some("retry"));
    assert_eq!(ex_err.retry_count(), Some(2));
    assert_eq!(ex_err.max_retries(), Some(2));
}

#[test]
fn test_not_allowed_distinct_from_exhausted() {
    let ex_err: ExError = ReconcileError::RetryNotAllowed {
        state: "streaming".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::RetryNotAllowed);
    assert_ne!(ex_err.kind(), ExErrorKind::RetryExhausted);
    assert!(ex_err.message().contains("streaming"));
}

#[test]
fn test_second_start_maps_to_already_started() {
    let mut session = ReconciliationSession::new(StreamOptions::default());
    session.start(None).unwrap();

    let ex_err: ExError = session.start(None).unwrap_err().into();

    assert_eq!(ex_err.kind(), ExErrorKind::AlreadyStarted);
    assert_eq!(ex_err.code(), "ERR_ALREADY_STARTED");
    assert_eq!(ex_err.op(), Some("start"));
    assert!(ex_err.message().contains("streaming"));
}

#[test]
fn test_transport_errors_map_by_kind() {
    let cases = [
        (
            TransportError::Failed {
                message: "503".into(),
            },
            ExErrorKind::Transport,
        ),
        (
            TransportError::Interrupted {
                message: "reset".into(),
            },
            ExErrorKind::Transport,
        ),
        (
            TransportError::Decode {
                message: "bad json".into(),
            },
            ExErrorKind::Transport,
        ),
        (TransportError::Timeout { after_ms: 10 }, ExErrorKind::Timeout),
    ];

    for (transport, kind) in cases {
        let ex_err: ExError = transport.clone().into();
        assert_eq!(ex_err.kind(), kind, "Wrong kind for {:?}", transport);
    }
}

#[test]
fn test_builder_context_in_display() {
    let session_id = SessionId::from_string("s-42".to_string());
    let err = ExError::new(ExErrorKind::Disposed)
        .with_op("retry")
        .with_session_id(session_id.clone())
        .with_message("Session was disposed");

    assert_eq!(err.session_id(), Some(&session_id));
    let rendered = err.to_string();
    assert!(rendered.contains("[ERR_DISPOSED]"), "{}", rendered);
    assert!(rendered.contains("'retry'"), "{}", rendered);
}

#[test]
fn test_config_errors_from_toml_and_io() {
    let err = StreamOptions::from_toml_str("max_retries = \"three\"").unwrap_err();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::InvalidConfig);

    let err = StreamOptions::from_path("/definitely/not/here.toml").unwrap_err();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::Io);
    assert_eq!(ex_err.path(), Some("/definitely/not/here.toml"));
}

#[test]
fn test_options_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_retries = 1\nenable_animations = false\nmarker_window_ms = 0").unwrap();

    let options = StreamOptions::from_path(file.path()).unwrap();

    assert_eq!(options.max_retries, 1);
    assert!(!options.enable_animations);
}

#[test]
fn test_serialization_error_conversion() {
    let err: ReconcileError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
}
