//! Wait budget for one record's acknowledgment.
//!
//! The sender never blocks in a single long read.  Instead it issues short
//! reads, each bounded by the read-timeout slice, inside an outer budget:
//!
//! ```text
//!  write ─┬─ slice ─┬─ slice ─┬─ slice ─┬─ ... ─┬─ budget spent → AckTimeout
//!         │ timeout │ noise   │ timeout │       │
//! ```
//!
//! A slice timeout only means "nothing yet".  The budget is measured on the
//! monotonic clock ([`Instant`]) from just after the frame was written, so
//! wall-clock adjustments cannot end a wait early or stretch it.

use std::time::{Duration, Instant};

/// Default bound on one read attempt.
pub const DEFAULT_READ_SLICE: Duration = Duration::from_secs(3);
/// Default total wait for one acknowledgment (5 minutes).
pub const DEFAULT_ACK_BUDGET: Duration = Duration::from_secs(300);

/// Running budget for one record.
#[derive(Debug, Clone)]
pub struct AckBudget {
    started: Instant,
    total: Duration,
    /// Number of read slices that expired with no data.
    pub idle_slices: u32,
    /// Number of inbound chunks that were not an acknowledgment.
    pub ignored: u32,
}

impl AckBudget {
    /// Start the clock now.
    pub fn start(total: Duration) -> Self {
        Self {
            started: Instant::now(),
            total,
            idle_slices: 0,
            ignored: 0,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time spent waiting so far.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the wait must be abandoned.
    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Timeout for the next read attempt: `slice`, clamped to what remains.
    ///
    /// Returns `None` once the budget is spent.
    pub fn next_slice(&self, slice: Duration) -> Option<Duration> {
        let remaining = self.remaining();
        if remaining.is_zero() {
            None
        } else {
            Some(slice.min(remaining))
        }
    }

    /// Record a read slice that expired with nothing received.
    pub fn on_idle_slice(&mut self) {
        self.idle_slices += 1;
    }

    /// Record an inbound chunk that was not an acknowledgment.
    pub fn on_ignored(&mut self) {
        self.ignored += 1;
    }
}
