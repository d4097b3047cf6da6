//! Trailing-edge debounce for settings writes.
//!
//! Call [`Debouncer::request_at`] whenever the record changes through a
//! continuous control. Each request pushes the deadline to `window` after the
//! latest call, so a burst collapses into a single write that fires once the
//! burst has been quiet for a full window. The owner polls
//! [`Debouncer::due_at`] from its event loop; nothing here spawns timers.

use std::time::{Duration, Instant};

/// Default coalescing window for continuous controls.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

/// Deadline-based trailing-edge debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Debouncer {
    /// Create a debouncer with the given window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Coalescing window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Schedule (or reschedule) the trailing write relative to `now`.
    pub fn request_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Whether a write is scheduled.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the scheduled write becomes due.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the scheduled write if its deadline has passed.
    pub fn due_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the scheduled write regardless of its deadline. Used when an
    /// immediate write supersedes it and on shutdown.
    pub fn take(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
