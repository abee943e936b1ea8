//! Update marker tracking
//!
//! Holds the change set of the most recent snapshot for a fixed window so the
//! presenter can flag freshly changed fields, then clears it.

pub mod clock;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use timer::{ExpiryTimer, TimerToken};

use std::time::{Duration, Instant};

use crate::model::ChangeSet;

/// Default window during which changed paths stay marked
pub const DEFAULT_MARKER_WINDOW: Duration = Duration::from_millis(1000);

/// Holds the latest change set until its expiry window elapses
#[derive(Debug)]
pub struct UpdateMarkerTracker {
    enabled: bool,
    window: Duration,
    changes: ChangeSet,
    last_update: Option<Instant>,
    timer: ExpiryTimer,
}

impl UpdateMarkerTracker {
    /// Create a tracker; a disabled tracker never holds markers
    pub fn new(enabled: bool, window: Duration) -> Self {
        Self {
            enabled,
            window,
            changes: ChangeSet::new(),
            last_update: None,
            timer: ExpiryTimer::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Paths currently marked as recently changed
    pub fn updated_paths(&self) -> &ChangeSet {
        &self.changes
    }

    /// When markers were last replaced
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    /// Replace the held markers and restart the expiry window
    ///
    /// Markers are replaced, not merged. Returns the token of the new arming,
    /// or `None` when disabled or `changes` is empty (an empty change set
    /// clears the markers immediately).
    pub fn mark_changed(&mut self, changes: ChangeSet, now: Instant) -> Option<TimerToken> {
        if !self.enabled {
            return None;
        }
        self.last_update = Some(now);
        if changes.is_empty() {
            self.clear();
            return None;
        }
        self.changes = changes;
        Some(self.clear_after(self.window, now))
    }

    /// (Re)arm expiry so the held markers clear `duration` after `now`
    pub fn clear_after(&mut self, duration: Duration, now: Instant) -> TimerToken {
        self.timer.arm(now + duration)
    }

    /// Deadline and token of the pending expiry, if any
    pub fn pending_expiry(&self) -> Option<(Instant, TimerToken)> {
        self.timer.pending()
    }

    /// Expire markers for a scheduled callback
    ///
    /// Stale tokens (superseded by a later mark, or cancelled) do nothing.
    /// Returns true if markers were cleared.
    pub fn expire(&mut self, token: TimerToken) -> bool {
        if self.timer.fire(token) {
            self.changes.clear();
            true
        } else {
            false
        }
    }

    /// Expire markers if the window has elapsed at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.timer.fire_if_due(now) {
            self.changes.clear();
            true
        } else {
            false
        }
    }

    /// Drop all markers and cancel any pending expiry
    pub fn clear(&mut self) {
        self.timer.cancel();
        self.changes.clear();
    }

    /// Cancel any pending expiry; safe to call repeatedly
    pub fn dispose(&mut self) {
        self.timer.cancel();
    }
}

impl Default for UpdateMarkerTracker {
    fn default() -> Self {
        Self::new(true, DEFAULT_MARKER_WINDOW)
    }
}
