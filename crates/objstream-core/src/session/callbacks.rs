//! Outbound callbacks fired by a session

use serde_json::Value;

use crate::model::{ChangeSet, FieldPath};
use crate::transport::TransportError;

type ObjectUpdateFn = Box<dyn FnMut(&Value, &ChangeSet) + Send>;
type StreamStartFn = Box<dyn FnMut() + Send>;
type StreamCompleteFn = Box<dyn FnMut(&Value) + Send>;
type StreamErrorFn = Box<dyn FnMut(&TransportError) + Send>;
type FieldUpdateFn = Box<dyn FnMut(&FieldPath, &Value) + Send>;

/// Caller hooks; every hook is optional
///
/// Hooks run synchronously inside the session event that triggers them.
#[derive(Default)]
pub struct StreamCallbacks {
    pub(crate) on_object_update: Option<ObjectUpdateFn>,
    pub(crate) on_stream_start: Option<StreamStartFn>,
    pub(crate) on_stream_complete: Option<StreamCompleteFn>,
    pub(crate) on_stream_error: Option<StreamErrorFn>,
    pub(crate) on_field_update: Option<FieldUpdateFn>,
}

impl StreamCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the new snapshot and its change set after each snapshot
    pub fn on_object_update(mut self, f: impl FnMut(&Value, &ChangeSet) + Send + 'static) -> Self {
        self.on_object_update = Some(Box::new(f));
        self
    }

    /// Called when an attempt starts (initially and after each retry)
    pub fn on_stream_start(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_stream_start = Some(Box::new(f));
        self
    }

    /// Called once with the final object
    pub fn on_stream_complete(mut self, f: impl FnMut(&Value) + Send + 'static) -> Self {
        self.on_stream_complete = Some(Box::new(f));
        self
    }

    /// Called for each accepted transport failure
    pub fn on_stream_error(mut self, f: impl FnMut(&TransportError) + Send + 'static) -> Self {
        self.on_stream_error = Some(Box::new(f));
        self
    }

    /// Called when the host selects a field in the presented tree
    pub fn on_field_update(mut self, f: impl FnMut(&FieldPath, &Value) + Send + 'static) -> Self {
        self.on_field_update = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("on_object_update", &self.on_object_update.is_some())
            .field("on_stream_start", &self.on_stream_start.is_some())
            .field("on_stream_complete", &self.on_stream_complete.is_some())
            .field("on_stream_error", &self.on_stream_error.is_some())
            .field("on_field_update", &self.on_field_update.is_some())
            .finish()
    }
}
