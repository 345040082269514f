//! Operation ("flop") counters
//!
//! The profiler queries a counter at start and stop and attributes the
//! difference to the measured span. The delta is only an approximation when
//! other threads bump the counter concurrently.

use crate::output::OutputGate;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Once};

/// Source of an aggregate operation count since initialisation
pub trait OperationCounter: Send + Sync {
    /// One-time setup; called at most once per adapter
    fn init(&self) {}

    /// Total operations counted so far across all threads
    fn total_operations(&self) -> i64;

    /// Name shown in the initialisation log lines
    fn name(&self) -> &str {
        "Counters"
    }

    /// False for counters that never count anything
    fn enabled(&self) -> bool {
        true
    }
}

/// Counting disabled: every query returns 0
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCounter;

impl OperationCounter for DisabledCounter {
    fn total_operations(&self) -> i64 {
        0
    }

    fn name(&self) -> &str {
        "Disabled"
    }

    fn enabled(&self) -> bool {
        false
    }
}

/// Software counter that instrumented code bumps explicitly
///
/// # Example
/// ```
/// use flopwatch::counters::{OperationCounter, SharedCounter};
///
/// let counter = SharedCounter::new();
/// counter.add(2 * 64 * 64 * 64);
/// assert_eq!(counter.total_operations(), 524_288);
/// ```
#[derive(Debug, Default, Clone)]
pub struct SharedCounter {
    total: Arc<AtomicI64>,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, ops: i64) {
        self.total.fetch_add(ops, Ordering::Relaxed);
    }
}

impl OperationCounter for SharedCounter {
    fn total_operations(&self) -> i64 {
        self.total.load(Ordering::Relaxed)
    }

    fn name(&self) -> &str {
        "SharedCounter"
    }
}

/// Wraps a counter so that its `init` runs exactly once
pub struct CounterAdapter {
    counter: Arc<dyn OperationCounter>,
    init: Once,
}

impl CounterAdapter {
    pub fn new(counter: Arc<dyn OperationCounter>) -> Self {
        Self {
            counter,
            init: Once::new(),
        }
    }

    /// Initialise the underlying counter; no-op after the first call
    pub fn init(&self, gate: &OutputGate) {
        self.init.call_once(|| {
            if !self.counter.enabled() {
                return;
            }
            let name = self.counter.name();
            gate.report(name, "init", "Start.");
            self.counter.init();
            tracing::debug!("Operation counter {} initialised", name);
            gate.report(name, "init", "Finish.");
        });
    }

    pub fn total_operations(&self) -> i64 {
        self.counter.total_operations()
    }
}

impl Default for CounterAdapter {
    fn default() -> Self {
        Self::new(Arc::new(DisabledCounter))
    }
}

impl std::fmt::Debug for CounterAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterAdapter")
            .field("counter", &self.counter.name())
            .field("initialised", &self.init.is_completed())
            .finish()
    }
}
