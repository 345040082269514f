//! Per-call-site accumulator
//!
//! A record is created once per unique name and lives as long as the
//! registry that owns it. The running flag is atomic so that a second start
//! on an already running record (recursion, or another thread) is rejected
//! without a lock; the statistics sit behind a mutex.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to a registered record
pub type RecordHandle = Arc<TimerRecord>;

/// Accumulated statistics for one call site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordStats {
    /// Duration of the most recent completed measurement (NaN before the first)
    pub last_duration: f64,
    /// Sum of all completed durations
    pub total_duration: f64,
    /// Operations attributed to the most recent completed measurement
    pub last_operations: i64,
    /// Sum of all attributed operations
    pub total_operations: i64,
    /// Number of accepted starts
    pub calls: u64,
}

impl Default for RecordStats {
    fn default() -> Self {
        Self {
            last_duration: f64::NAN,
            total_duration: 0.0,
            last_operations: 0,
            total_operations: 0,
            calls: 0,
        }
    }
}

impl RecordStats {
    /// Mean duration per call (0 before the first call)
    pub fn average_duration(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_duration / self.calls as f64
        }
    }

    /// Mean operations per call (0 before the first call)
    pub fn average_operations(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_operations as f64 / self.calls as f64
        }
    }
}

/// One named call site
#[derive(Debug)]
pub struct TimerRecord {
    name: String,
    index: usize,
    running: AtomicBool,
    stats: Mutex<RecordStats>,
}

impl TimerRecord {
    pub(crate) fn new(name: String, index: usize) -> Self {
        Self {
            name,
            index,
            running: AtomicBool::new(false),
            stats: Mutex::new(RecordStats::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration position, stable for the record's lifetime
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Copy of the current statistics
    pub fn stats(&self) -> RecordStats {
        *self.lock_stats()
    }

    /// Mark running; false if it already was
    pub(crate) fn try_begin(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn end(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Count an accepted start and return the updated statistics
    pub(crate) fn record_call(&self) -> RecordStats {
        let mut stats = self.lock_stats();
        stats.calls += 1;
        *stats
    }

    /// Fold one completed measurement in and return the updated statistics
    pub(crate) fn record_completion(&self, duration: f64, operations: i64) -> RecordStats {
        let mut stats = self.lock_stats();
        stats.last_duration = duration;
        stats.last_operations = operations;
        stats.total_duration += duration;
        stats.total_operations = stats.total_operations.wrapping_add(operations);
        *stats
    }

    fn lock_stats(&self) -> MutexGuard<'_, RecordStats> {
        // Plain counters stay consistent even if a holder panicked.
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_zeroed() {
        let record = TimerRecord::new("solve".to_string(), 3);
        let stats = record.stats();
        assert_eq!(record.name(), "solve");
        assert_eq!(record.index(), 3);
        assert!(!record.is_running());
        assert!(stats.last_duration.is_nan());
        assert_eq!(stats.total_duration, 0.0);
        assert_eq!(stats.calls, 0);
    }

    #[test]
    fn test_try_begin_rejects_reentry() {
        let record = TimerRecord::new("solve".to_string(), 0);
        assert!(record.try_begin());
        assert!(!record.try_begin());
        record.end();
        assert!(record.try_begin());
    }

    #[test]
    fn test_completion_accumulates() {
        let record = TimerRecord::new("solve".to_string(), 0);
        record.record_call();
        record.record_completion(0.5, 100);
        record.record_call();
        let stats = record.record_completion(0.25, 50);

        assert_eq!(stats.calls, 2);
        assert_eq!(stats.last_duration, 0.25);
        assert_eq!(stats.last_operations, 50);
        assert_eq!(stats.total_duration, 0.75);
        assert_eq!(stats.total_operations, 150);
    }

    #[test]
    fn test_operation_totals_wrap_instead_of_panicking() {
        let record = TimerRecord::new("solve".to_string(), 0);
        record.record_call();
        record.record_completion(0.1, i64::MAX);
        record.record_call();
        let stats = record.record_completion(0.1, 2);

        assert_eq!(stats.last_operations, 2);
        assert_eq!(stats.total_operations, i64::MIN + 1);
    }

    #[test]
    fn test_averages() {
        let stats = RecordStats {
            total_duration: 0.6,
            total_operations: 300,
            calls: 3,
            ..Default::default()
        };
        assert!((stats.average_duration() - 0.2).abs() < 1e-12);
        assert_eq!(stats.average_operations(), 100.0);
    }

    #[test]
    fn test_averages_without_calls() {
        let stats = RecordStats::default();
        assert_eq!(stats.average_duration(), 0.0);
        assert_eq!(stats.average_operations(), 0.0);
    }
}
