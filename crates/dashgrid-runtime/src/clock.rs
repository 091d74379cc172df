#![forbid(unsafe_code)]

//! Monotonic time sources.
//!
//! The store never reads wall-clock time directly. Timestamps are
//! [`Duration`]s since an unspecified epoch, supplied by a [`MonotonicClock`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use web_time::Instant;

/// Monotonic time since an unspecified epoch.
pub trait MonotonicClock: Send {
    fn now_mono(&self) -> Duration;
}

/// Real time, measured from construction. Works in browsers via `web-time`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Host-advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct DeterministicClock {
    nanos: Arc<AtomicU64>,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set current monotonic time. Earlier values are ignored.
    pub fn set(&self, now: Duration) {
        self.nanos.fetch_max(as_nanos(now), Ordering::SeqCst);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&self, dt: Duration) {
        let dt = as_nanos(dt);
        // fetch_update with Some(..) never fails.
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(dt))
            });
    }
}

impl MonotonicClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn as_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
