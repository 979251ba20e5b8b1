//! Single-slot debounce timer for the search box.
//!
//! Time is passed in explicitly so the owner (the browser's tick handler) and
//! tests drive it deterministically.

use std::time::{Duration, Instant};

/// At most one pending application; each `schedule` replaces the previous one.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(Instant, String)>,
}

impl SearchDebouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Restart the timer with `query` as the value to apply.
    pub fn schedule(&mut self, query: impl Into<String>, now: Instant) {
        self.pending = Some((now + self.delay, query.into()));
    }

    /// Return the pending query once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, query)| query),
            _ => None,
        }
    }

    /// Apply the pending query now, skipping the rest of the wait.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(_, query)| query)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn fires_after_delay() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(DELAY);
        d.schedule("cam", t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(d.poll(t0 + DELAY).as_deref(), Some("cam"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + DELAY * 2), None);
    }

    #[test]
    fn reschedule_replaces_pending() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(DELAY);
        d.schedule("c", t0);
        d.schedule("ca", t0 + Duration::from_millis(200));
        // Original deadline passes without firing.
        assert_eq!(d.poll(t0 + DELAY), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(500)).as_deref(), Some("ca"));
    }

    #[test]
    fn cancel_and_flush() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(DELAY);
        d.schedule("x", t0);
        d.cancel();
        assert_eq!(d.poll(t0 + DELAY), None);

        d.schedule("y", t0);
        assert_eq!(d.flush().as_deref(), Some("y"));
        assert!(!d.is_pending());
    }
}
