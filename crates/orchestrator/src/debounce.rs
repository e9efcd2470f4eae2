//! Palette toggle debouncing.

use std::time::{Duration, Instant};

/// Suppresses toggle events that arrive within the debounce window of the
/// last accepted one. Both the global shortcut and the in-page key
/// combination funnel through the same instance, which is the point: the two
/// paths can fire for a single user gesture.
pub struct ToggleDebouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl ToggleDebouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, last_accepted: None }
    }

    /// Returns whether this toggle should be acted on.
    pub fn accept(&mut self) -> bool {
        self.accept_at(Instant::now())
    }

    fn accept_at(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted
            && now.duration_since(last) < self.window
        {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }
}
