//! Scoped start/stop measurements
//!
//! A [`Timer`] names a call site; a [`Measurement`] is one span on it. The
//! measurement stops itself when dropped, so early returns, `?` and panics
//! all close the span exactly once.
//!
//! Re-entering a call site that is already running (recursion, or the same
//! name on another thread) is a no-op: the nested start is not counted and
//! its measurement will not stop the record.

use crate::profiler::Profiler;
use crate::record::RecordHandle;

/// Call-site handle: a record plus its operation-counting policy
#[derive(Debug, Clone)]
pub struct Timer {
    record: RecordHandle,
    counts_operations: bool,
}

impl Timer {
    pub(crate) fn new(record: RecordHandle, counts_operations: bool) -> Self {
        Self {
            record,
            counts_operations,
        }
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn record(&self) -> &RecordHandle {
        &self.record
    }

    /// Whether spans query the profiler's operation counter
    pub fn counts_operations(&self) -> bool {
        self.counts_operations
    }

    pub fn with_operation_counting(mut self, enabled: bool) -> Self {
        self.counts_operations = enabled;
        self
    }

    /// A measurement that has not been started yet
    pub fn measurement<'p>(&self, profiler: &'p Profiler) -> Measurement<'p> {
        Measurement {
            profiler,
            timer: self.clone(),
            verbose: false,
            running: false,
            start_time: 0.0,
            start_operations: 0,
            manual_operations: 0,
        }
    }

    /// Start a measurement that stops when the returned guard drops
    pub fn scope<'p>(&self, profiler: &'p Profiler, verbose: bool) -> Measurement<'p> {
        let mut measurement = self.measurement(profiler);
        measurement.verbose = verbose;
        measurement.start(verbose);
        measurement
    }
}

/// One start/stop span bound to a timer
#[must_use = "a measurement stops as soon as it is dropped"]
#[derive(Debug)]
pub struct Measurement<'p> {
    profiler: &'p Profiler,
    timer: Timer,
    verbose: bool,
    running: bool,
    start_time: f64,
    start_operations: i64,
    manual_operations: i64,
}

impl Measurement<'_> {
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// True if this measurement owns the running span of its record
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin the span. Returns false (and does nothing) if the record is
    /// already running.
    pub fn start(&mut self, verbose: bool) -> bool {
        let record = &self.timer.record;
        if !record.try_begin() {
            return false;
        }
        self.running = true;

        let stats = record.record_call();
        let config = self.profiler.config();
        if verbose || stats.calls == 1 || stats.last_duration >= config.min_start_log_duration {
            self.profiler.show_last(record, "start");
        }

        self.start_operations = if self.timer.counts_operations {
            self.profiler.total_operations()
        } else {
            0
        };
        self.manual_operations = 0;
        self.start_time = self.profiler.now();
        true
    }

    /// Attribute `ops` operations to the current span explicitly.
    ///
    /// A nonzero manual total replaces the counter delta at stop.
    pub fn add_operations(&mut self, ops: i64) {
        self.manual_operations = self.manual_operations.wrapping_add(ops);
    }

    /// End the span.
    ///
    /// # Panics
    ///
    /// If this measurement did not start the record's running span. Stopping
    /// a timer that is not running is a bug in the instrumented code.
    pub fn stop(&mut self, verbose: bool) {
        let stop_time = self.profiler.now();
        let record = &self.timer.record;
        if !self.running || !record.is_running() {
            panic!(
                "timer protocol violation: stop() on {:?} which is not running",
                record.name()
            );
        }

        let operations = if self.manual_operations != 0 {
            self.manual_operations
        } else if self.timer.counts_operations {
            self.profiler
                .total_operations()
                .wrapping_sub(self.start_operations)
        } else {
            0
        };
        let duration = stop_time - self.start_time;
        let stats = record.record_completion(duration, operations);

        let config = self.profiler.config();
        if verbose || stats.calls == 1 || duration >= config.min_stop_log_duration {
            self.profiler.show_last(record, "stop ");
        }

        self.running = false;
        self.profiler.autodisplay(stop_time);
        record.end();
    }
}

impl Drop for Measurement<'_> {
    fn drop(&mut self) {
        if self.running {
            self.stop(self.verbose);
        }
    }
}

/// Measure the rest of the enclosing scope under `name`.
///
/// Uses [`Profiler::global`] unless a profiler reference is given first.
///
/// ```
/// use flopwatch::{timer, Profiler};
///
/// let profiler = Profiler::builder().quiet().build();
/// {
///     let _t = timer!(&profiler, "assemble");
/// }
/// assert_eq!(profiler.registry().get("assemble").unwrap().stats().calls, 1);
/// ```
#[macro_export]
macro_rules! timer {
    ($name:expr) => {
        $crate::Profiler::scope($crate::Profiler::global(), $name)
    };
    ($profiler:expr, $name:expr) => {
        $crate::Profiler::scope($profiler, $name)
    };
}

/// Like [`timer!`], with an analytically known operation count instead of
/// the hardware counter.
#[macro_export]
macro_rules! timer_ops {
    ($name:expr, $ops:expr) => {
        $crate::Profiler::scope_with_operations($crate::Profiler::global(), $name, $ops)
    };
    ($profiler:expr, $name:expr, $ops:expr) => {
        $crate::Profiler::scope_with_operations($profiler, $name, $ops)
    };
}

/// Like [`timer!`], printing start and stop lines unconditionally.
#[macro_export]
macro_rules! timer_verbose {
    ($name:expr) => {
        $crate::Profiler::scope_verbose($crate::Profiler::global(), $name)
    };
    ($profiler:expr, $name:expr) => {
        $crate::Profiler::scope_verbose($profiler, $name)
    };
}
