//! Correlation types for session tracking and tracing
//!
//! Every reconciliation session gets a [`SessionId`]; each transport request
//! issued on its behalf (the first one and every retry) gets an [`AttemptId`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single reconciliation session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random SessionId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one transport attempt within a session
///
/// Attempts are numbered from 1; each permitted retry yields the next number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(u32);

impl AttemptId {
    /// The first attempt of a session
    pub const FIRST: AttemptId = AttemptId(1);

    /// The attempt issued after this one
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Get the 1-based attempt number
    pub fn number(self) -> u32 {
        self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
