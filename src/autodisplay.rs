//! Throttle for automatic report dumps
//!
//! Checked opportunistically on every stop; fires at most once per interval
//! and only as often as stops actually happen.

use std::sync::Mutex;

/// Timestamp of the last automatic dump
#[derive(Debug, Default)]
pub struct AutodisplayScheduler {
    last_triggered: Mutex<Option<f64>>,
}

impl AutodisplayScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a dump is due at `now`; records `now` as the new trigger time.
    ///
    /// The first query only sets the reference time.
    pub fn should_trigger(&self, now: f64, min_interval: f64) -> bool {
        let mut last = self
            .last_triggered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match *last {
            None => {
                *last = Some(now);
                false
            }
            Some(previous) if now - previous > min_interval => {
                *last = Some(now);
                true
            }
            Some(_) => false,
        }
    }

    pub fn last_triggered(&self) -> Option<f64> {
        *self
            .last_triggered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn reset(&self) {
        *self
            .last_triggered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
