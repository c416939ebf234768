//! Fixed-cadence poll loop.
//!
//! Runs a cycle body every `cycle_time`, sleeping for what remains of the
//! period. Overruns are counted and logged but never abort the loop: the
//! link timeout is the only hard deadline in the system.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Cycles that took longer than the period.
    pub timing_violations: u64,
    /// Last cycle duration [µs].
    pub last_cycle_us: u64,
    /// Maximum cycle duration [µs].
    pub max_cycle_us: u64,
    /// Running sum for average computation [µs].
    pub total_cycle_us: u64,
}

impl CycleStats {
    /// Record one cycle. Returns `true` if it overran `budget`.
    #[inline]
    pub fn record(&mut self, duration: Duration, budget: Duration) -> bool {
        let us = duration.as_micros() as u64;
        self.cycle_count += 1;
        self.last_cycle_us = us;
        self.total_cycle_us += us;
        self.max_cycle_us = self.max_cycle_us.max(us);

        let overrun = duration > budget;
        if overrun {
            self.timing_violations += 1;
        }
        overrun
    }

    /// Average cycle time [µs] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_us(&self) -> u64 {
        self.total_cycle_us.checked_div(self.cycle_count).unwrap_or(0)
    }
}

/// Drives a cycle body at a fixed period until stopped.
pub struct CycleRunner {
    cycle_time: Duration,
    running: Arc<AtomicBool>,
    stats: CycleStats,
}

impl CycleRunner {
    /// Runner with period `cycle_time`.
    pub fn new(cycle_time: Duration) -> Self {
        Self {
            cycle_time,
            running: Arc::new(AtomicBool::new(true)),
            stats: CycleStats::default(),
        }
    }

    /// Flag that stops the loop when cleared. Share it with signal handlers
    /// and helper threads.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Timing statistics so far.
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Configured period.
    pub fn cycle_time(&self) -> Duration {
        self.cycle_time
    }

    /// Run `body` once per period until the running flag is cleared.
    pub fn run<F: FnMut()>(&mut self, mut body: F) {
        info!(
            "Starting poll loop (cycle_time={}ms)",
            self.cycle_time.as_millis()
        );

        while self.running.load(Ordering::SeqCst) {
            let cycle_start = Instant::now();
            body();
            let elapsed = cycle_start.elapsed();

            if self.stats.record(elapsed, self.cycle_time) {
                let n = self.stats.timing_violations;
                if n <= 10 || n % 1000 == 0 {
                    warn!(
                        "Timing violation #{}: cycle took {}us (target {}us)",
                        n,
                        elapsed.as_micros(),
                        self.cycle_time.as_micros()
                    );
                }
            }

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Poll loop: {} cycles, avg={}us, max={}us, violations={}",
                    self.stats.cycle_count,
                    self.stats.avg_cycle_us(),
                    self.stats.max_cycle_us,
                    self.stats.timing_violations
                );
            }

            if let Some(remaining) = self.cycle_time.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }

        info!(
            "Poll loop stopped after {} cycles ({} timing violations, max {}us)",
            self.stats.cycle_count, self.stats.timing_violations, self.stats.max_cycle_us
        );
    }
}
