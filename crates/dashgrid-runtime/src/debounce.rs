#![forbid(unsafe_code)]

//! Trailing-edge debounce timer.
//!
//! Every [`schedule_at`](Debouncer::schedule_at) pushes the deadline to
//! `now + delay`; [`poll_at`](Debouncer::poll_at) fires once the deadline has
//! passed with no further scheduling. The last schedule always wins.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the window at `now`.
    pub fn schedule_at(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.delay));
    }

    /// Whether the window has elapsed. Firing clears the timer.
    pub fn poll_at(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Remaining time until the timer fires, `None` when idle.
    #[must_use]
    pub fn time_until_due(&self, now: Duration) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_sub(now))
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_after_quiet_window() {
        let mut d = Debouncer::new(MS * 1000);
        d.schedule_at(MS * 0);
        assert!(!d.poll_at(MS * 999));
        assert!(d.poll_at(MS * 1000));
        assert!(!d.poll_at(MS * 5000), "fires once");
    }

    #[test]
    fn rescheduling_extends_window() {
        let mut d = Debouncer::new(MS * 1000);
        d.schedule_at(MS * 0);
        d.schedule_at(MS * 800);
        assert!(!d.poll_at(MS * 1200));
        assert_eq!(d.time_until_due(MS * 1200), Some(MS * 600));
        assert!(d.poll_at(MS * 1800));
    }

    #[test]
    fn idle_and_cancel() {
        let mut d = Debouncer::new(MS * 10);
        assert_eq!(d.time_until_due(MS * 0), None);
        assert!(!d.poll_at(MS * 100));
        d.schedule_at(MS * 0);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.poll_at(MS * 100));
    }
}
