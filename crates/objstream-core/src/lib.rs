//! ObjStream Core - incremental reconciliation of streamed structured objects
//!
//! A transport delivers successive partial snapshots of one JSON object. This
//! crate turns that stream into:
//! - precise change sets between consecutive snapshots ([`diff`])
//! - a schema-driven completion estimate ([`progress`])
//! - time-bounded "recently updated" markers ([`markers`])
//! - a bounded retry state machine ([`retry`])
//! - a session that orchestrates all of the above ([`session`])
//! - a renderable tree of the current object ([`present`])
//!
//! [`driver`] runs a [`transport::Transport`] against a session on tokio.

pub mod diff;
pub mod driver;
pub mod errors;
pub mod logging_facility;
pub mod markers;
pub mod model;
pub mod options;
pub mod present;
pub mod progress;
pub mod retry;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use diff::compute_changes;
pub use driver::{run_attempt, run_with_retries, settle_markers};
pub use errors::{ExError, ExErrorKind, ReconcileError, Result};
pub use model::{ChangeSet, FieldPath, SchemaDescriptor, Snapshot};
pub use options::StreamOptions;
pub use present::{present, render_text, Node, PresentOptions};
pub use retry::{RetryState, StreamingState};
pub use session::{ReconciliationSession, SessionView, StreamCallbacks};
pub use transport::{ScriptedTransport, Transport, TransportError, TransportEvent};
