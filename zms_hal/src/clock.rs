//! Clock implementations.
//!
//! - [`SystemClock`] - monotonic wall time since construction
//! - [`ManualClock`] - test clock that only moves when told to

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use zms_common::hal::Clock;

/// Monotonic clock starting at zero on construction.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock advanced explicitly. `delay` advances it instead of sleeping.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    /// Clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }

    /// Jump to `now`.
    pub fn set(&self, now: Duration) {
        *self.now.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }

    fn delay(&self, duration: Duration) {
        self.advance(duration);
    }
}
