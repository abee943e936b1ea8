use objstream_core::markers::ManualClock;
use objstream_core::{
    ReconciliationSession, SchemaDescriptor, StreamOptions, TransportError, TransportEvent,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Schema declaring the given top-level properties
#[allow(dead_code)]
pub fn schema_of(names: &[&str]) -> SchemaDescriptor {
    SchemaDescriptor::object_with(names.iter().copied())
}

/// Session on a manual clock, already started with no initial snapshot
#[allow(dead_code)]
pub fn started_session(options: StreamOptions) -> (ReconciliationSession, ManualClock) {
    let clock = ManualClock::new();
    let mut session = ReconciliationSession::new(options).with_clock(Arc::new(clock.clone()));
    session.start(None).unwrap();
    (session, clock)
}

#[allow(dead_code)]
pub fn snapshot(value: Value) -> TransportEvent {
    TransportEvent::Snapshot { value }
}

#[allow(dead_code)]
pub fn complete(value: Value) -> TransportEvent {
    TransportEvent::Complete { value }
}

#[allow(dead_code)]
pub fn failure(message: &str) -> TransportEvent {
    TransportEvent::Error {
        error: TransportError::Failed {
            message: message.to_string(),
        },
    }
}

/// Shared log of strings written by callbacks and listeners
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}
