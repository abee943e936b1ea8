//! Stream options
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! show_progress = true
//! enable_animations = true
//! max_retries = 3
//! debounce_delay_ms = 50
//! marker_window_ms = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::{ReconcileError, Result};
use crate::markers::DEFAULT_MARKER_WINDOW;
use crate::retry::DEFAULT_MAX_RETRIES;

/// Recognised session options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamOptions {
    /// Expose the progress value in the session view
    pub show_progress: bool,
    /// Track recently changed paths for animation
    pub enable_animations: bool,
    /// Bound enforced by the retry controller
    pub max_retries: u32,
    /// Coalesce snapshots arriving within this many milliseconds (driver only)
    pub debounce_delay_ms: Option<u64>,
    /// How long changed paths stay marked
    pub marker_window_ms: u64,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
            enable_animations: true,
            max_retries: DEFAULT_MAX_RETRIES,
            debounce_delay_ms: None,
            marker_window_ms: DEFAULT_MARKER_WINDOW.as_millis() as u64,
        }
    }
}

impl StreamOptions {
    /// Parse options from a TOML document
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` - malformed TOML, unknown keys, or a zero marker window
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: StreamOptions = toml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file
    ///
    /// # Errors
    ///
    /// - `Io` - the file cannot be read
    /// - `InvalidConfig` - see [`StreamOptions::from_toml_str`]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ReconcileError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Check option combinations that the type system cannot
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` - `marker_window_ms` is zero while animations are enabled
    pub fn validate(&self) -> Result<()> {
        if self.enable_animations && self.marker_window_ms == 0 {
            return Err(ReconcileError::InvalidConfig {
                reason: "marker_window_ms must be positive when animations are enabled"
                    .to_string(),
            });
        }
        Ok(())
    }

    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.enable_animations = enabled;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    pub fn with_marker_window(mut self, window: Duration) -> Self {
        self.marker_window_ms = window.as_millis() as u64;
        self
    }

    pub fn marker_window(&self) -> Duration {
        Duration::from_millis(self.marker_window_ms)
    }

    /// Debounce delay, if configured and non-zero
    pub fn debounce_delay(&self) -> Option<Duration> {
        self.debounce_delay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}
