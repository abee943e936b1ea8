use objstream_core_types::SessionId;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias using ReconcileError
pub type Result<T> = std::result::Result<T, ReconcileError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// surfaced by the reconciliation engine. Each kind maps to a stable error
/// code that can be used for programmatic handling, testing, and host display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Retry gating
    /// Retry budget is spent; the current error is terminal
    RetryExhausted,
    /// Retry requested while the session is not in the error state
    RetryNotAllowed,

    // Lifecycle
    /// Operation attempted on a disposed session
    Disposed,
    /// `start` called on a session that already ran an attempt
    AlreadyStarted,

    // Transport
    /// The streaming transport reported a failure
    Transport,
    /// The streaming transport did not respond in time
    Timeout,

    // Configuration
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::RetryExhausted => "ERR_RETRY_EXHAUSTED",
            ExErrorKind::RetryNotAllowed => "ERR_RETRY_NOT_ALLOWED",
            ExErrorKind::Disposed => "ERR_DISPOSED",
            ExErrorKind::AlreadyStarted => "ERR_ALREADY_STARTED",
            ExErrorKind::Transport => "ERR_TRANSPORT",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    session_id: Option<SessionId>,
    path: Option<String>,
    retry_count: Option<u32>,
    max_retries: Option<u32>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            session_id: None,
            path: None,
            retry_count: None,
            max_retries: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add session context
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Add field path or file path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add retry budget context
    pub fn with_retry_budget(mut self, retry_count: u32, max_retries: u32) -> Self {
        self.retry_count = Some(retry_count);
        self.max_retries = Some(max_retries);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the session context, if any
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the retry count context, if any
    pub fn retry_count(&self) -> Option<u32> {
        self.retry_count
    }

    /// Get the retry limit context, if any
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let (Some(count), Some(max)) = (self.retry_count, self.max_retries) {
            write!(f, " (retries: {}/{})", count, max)?;
        }
        if let Some(session_id) = &self.session_id {
            write!(f, " (session: {})", session_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for reconciliation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// No retries remain; the stored transport error is terminal
    #[error("Retry budget exhausted: {retry_count}/{max_retries}")]
    RetryExhausted { retry_count: u32, max_retries: u32 },

    /// Retry is only meaningful from the error state
    #[error("Retry not allowed while {state}")]
    RetryNotAllowed { state: String },

    /// The session has been disposed and no longer accepts operations
    #[error("Session was disposed")]
    SessionDisposed,

    /// A session runs one stream; restarting needs a new session
    #[error("Session already started (state: {state})")]
    AlreadyStarted { state: String },

    /// Stream options failed validation or parsing
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A transport failure surfaced outside the session (e.g. by the driver)
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// JSON (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Reading or writing a file failed
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

impl From<ReconcileError> for ExError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::RetryExhausted {
                retry_count,
                max_retries,
            } => ExError::new(ExErrorKind::RetryExhausted)
                .with_op("retry")
                .with_retry_budget(retry_count, max_retries)
                .with_message("No retries remain"),

            ReconcileError::RetryNotAllowed { state } => {
                ExError::new(ExErrorKind::RetryNotAllowed)
                    .with_op("retry")
                    .with_message(format!("Session is {}", state))
            }

            ReconcileError::SessionDisposed => {
                ExError::new(ExErrorKind::Disposed).with_message("Session was disposed")
            }

            ReconcileError::AlreadyStarted { state } => {
                ExError::new(ExErrorKind::AlreadyStarted)
                    .with_op("start")
                    .with_message(format!("Session is {}", state))
            }

            ReconcileError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            ReconcileError::Transport(TransportError::Timeout { after_ms }) => {
                ExError::new(ExErrorKind::Timeout)
                    .with_message(format!("Transport timed out after {}ms", after_ms))
            }

            ReconcileError::Transport(transport) => {
                ExError::new(ExErrorKind::Transport).with_message(transport.to_string())
            }

            ReconcileError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            ReconcileError::Io { path, message } => ExError::new(ExErrorKind::Io)
                .with_path(path)
                .with_message(message),
        }
    }
}

impl From<TransportError> for ExError {
    fn from(err: TransportError) -> Self {
        ReconcileError::Transport(err).into()
    }
}

/// Conversion from serde_json::Error to ReconcileError
impl From<serde_json::Error> for ReconcileError {
    fn from(err: serde_json::Error) -> Self {
        ReconcileError::Serialization {
            message: err.to_string(),
        }
    }
}

/// I/O errors without a known path; prefer building `Io` with the path
impl From<std::io::Error> for ReconcileError {
    fn from(err: std::io::Error) -> Self {
        ReconcileError::Io {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ReconcileError {
    fn from(err: toml::de::Error) -> Self {
        ReconcileError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<TransportError> for ReconcileError {
    fn from(err: TransportError) -> Self {
        ReconcileError::Transport(err)
    }
}
