//! Single-slot debounce state machine
//!
//! The debouncer holds at most one pending value. Every [`Debouncer::notify`]
//! replaces it and pushes the deadline out by the quiet interval; the value
//! comes out of [`Debouncer::poll`] only once the deadline has passed with
//! no further notification. Time is passed in by the caller, so the state
//! machine needs no runtime and no real clock.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Debounce timer with one pending slot
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Arm the timer with `value`, replacing any pending one
    ///
    /// Returns `true` when a pending value was superseded.
    pub fn notify(&mut self, now: Instant, value: T) -> bool {
        let superseded = self.pending.is_some();
        self.pending = Some(Pending {
            value,
            deadline: now + self.quiet,
        });
        superseded
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its quiet interval has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Disarm without firing
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Take the pending value regardless of its deadline
    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[test]
    fn test_fires_after_quiet_interval() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        assert!(!debouncer.notify(start, "a"));
        assert_eq!(debouncer.poll(start + Duration::from_millis(499)), None);
        assert_eq!(debouncer.poll(start + QUIET), Some("a"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + QUIET * 2), None);
    }

    #[test]
    fn test_burst_coalesces_to_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        let mut fired = Vec::new();

        for (i, text) in ["h", "he", "hel", "hell", "hello"].into_iter().enumerate() {
            let now = start + Duration::from_millis(100 * i as u64);
            if let Some(v) = debouncer.poll(now) {
                fired.push(v);
            }
            debouncer.notify(now, text);
        }

        let last = start + Duration::from_millis(400);
        assert_eq!(debouncer.deadline(), Some(last + QUIET));
        if let Some(v) = debouncer.poll(last + QUIET) {
            fired.push(v);
        }
        assert_eq!(fired, vec!["hello"]);
    }

    #[test]
    fn test_notify_reports_supersede() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        assert!(!debouncer.notify(now, 1));
        assert!(debouncer.notify(now, 2));
    }

    #[test]
    fn test_cancel_disarms() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.notify(now, "draft");
        assert_eq!(debouncer.cancel(), Some("draft"));
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(now + QUIET), None);
    }

    #[test]
    fn test_flush_ignores_deadline() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.notify(now, "draft");
        assert_eq!(debouncer.flush(), Some("draft"));
        assert!(!debouncer.is_pending());
    }
}
