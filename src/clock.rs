//! Wall-clock sources
//!
//! Timestamps are plain `f64` seconds so durations, percentages and
//! throughput can be computed without unit juggling. `ManualClock` lets
//! tests drive time deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of wall-clock seconds
pub trait Clock: Send + Sync {
    /// Current time in seconds, sub-millisecond resolution
    fn now(&self) -> f64;
}

/// System wall clock (seconds since the Unix epoch)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

/// Manually advanced clock
///
/// # Example
/// ```
/// use flopwatch::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(100.0);
/// clock.advance(0.25);
/// assert_eq!(clock.now(), 100.25);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        // Single writer in tests; a load/store pair is enough.
        let next = self.now() + seconds;
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Process epoch: the first clock reading ever taken, memoized
#[derive(Debug, Default)]
pub struct Epoch {
    start: OnceLock<f64>,
}

impl Epoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized epoch, capturing it from `clock` on first use
    pub fn get(&self, clock: &dyn Clock) -> f64 {
        *self.start.get_or_init(|| clock.now())
    }

    /// Seconds elapsed between the epoch and `now`
    pub fn elapsed(&self, clock: &dyn Clock) -> f64 {
        let start = self.get(clock);
        clock.now() - start
    }
}
