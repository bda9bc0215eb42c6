//! Debounced search input.
//!
//! Keystrokes update the pending text; the text is applied to the screen's
//! query only once no keystroke arrived for the quiet interval. The clock is
//! passed in so callers (and tests) control time.

use std::time::{Duration, Instant};

use tracing::trace;

/// Default quiet interval.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    applied: String,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

impl SearchDebouncer {
    pub fn new(quiet: Duration) -> Self {
        SearchDebouncer {
            quiet,
            applied: String::new(),
            pending: None,
        }
    }

    /// Records new input text at `now`, restarting the quiet interval.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    /// When the pending text becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.quiet)
    }

    /// Applies the pending text if the quiet interval has passed.
    ///
    /// Returns the newly applied text, or `None` when nothing is due or the
    /// due text equals what is already applied.
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        let due = self.deadline().is_some_and(|deadline| now >= deadline);
        if !due {
            return None;
        }
        self.apply_pending()
    }

    /// Applies the pending text immediately, e.g. when the user presses Enter.
    pub fn flush(&mut self) -> Option<&str> {
        self.apply_pending()
    }

    fn apply_pending(&mut self) -> Option<&str> {
        let (text, _) = self.pending.take()?;
        if text == self.applied {
            return None;
        }
        trace!(search = %text, "search applied");
        self.applied = text;
        Some(&self.applied)
    }

    /// The text the query currently runs with.
    pub fn applied(&self) -> &str {
        &self.applied
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
