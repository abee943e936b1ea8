//! Boundary logging macros
//!
//! `stream_attempt` and `retry` are the boundary operations: each logs one
//! `start` and exactly one of `end` or `end_error`. Work inside an attempt
//! (reconciled snapshots, dropped events, marker expiry) uses plain
//! `tracing::debug!` instead.

/// Log the start of a boundary operation
///
/// # Example
///
/// ```
/// # use objstream_core::log_op_start;
/// # use objstream_core::{ReconciliationSession, StreamOptions};
/// let session = ReconciliationSession::new(StreamOptions::default());
/// log_op_start!(
///     "stream_attempt",
///     session_id = %session.id(),
///     attempt = session.attempt().number()
/// );
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = objstream_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = objstream_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of a boundary operation
///
/// # Example
///
/// ```
/// # use objstream_core::log_op_end;
/// # use objstream_core::StreamingState;
/// log_op_end!(
///     "stream_attempt",
///     duration_ms = 1_250,
///     attempt = 2,
///     state = %StreamingState::Complete
/// );
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = objstream_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = objstream_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log a failed boundary operation
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError).
/// The event carries its kind, its code and its rendered message, so
/// context attached with the builder (session, retry budget) is kept.
///
/// # Example
///
/// ```
/// # use objstream_core::log_op_error;
/// # use objstream_core::errors::{ExError, ReconcileError};
/// # use objstream_core_types::SessionId;
/// let refused = ReconcileError::RetryExhausted { retry_count: 3, max_retries: 3 };
/// let session_id = SessionId::from_string("s-7".to_string());
/// log_op_error!(
///     "retry",
///     ExError::from(refused).with_session_id(session_id.clone()),
///     duration_ms = 0,
///     session_id = %session_id
/// );
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = objstream_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = %ex_err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = objstream_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = %ex_err,
            $($field)*
        );
    }};
}
