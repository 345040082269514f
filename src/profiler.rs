//! The profiler context
//!
//! A `Profiler` owns the record registry together with everything the timers
//! need from the outside world: a clock, the process epoch, the rank-gated
//! console, the operation counter and the autodisplay throttle. Tests build
//! isolated instances with [`ProfilerBuilder`]; instrumented programs that do
//! not want to thread a context through can use [`Profiler::global`].

use crate::autodisplay::AutodisplayScheduler;
use crate::clock::{Clock, Epoch, SystemClock};
use crate::config::TimerConfig;
use crate::counters::{CounterAdapter, DisabledCounter, OperationCounter};
use crate::error::Result;
use crate::measurement::{Measurement, Timer};
use crate::output::OutputGate;
use crate::rank::{EnvRank, RankProvider};
use crate::registry::Registry;
use crate::sink::{Sink, StdoutSink};
use std::sync::{Arc, OnceLock, RwLock};

static GLOBAL: OnceLock<Profiler> = OnceLock::new();

/// Registry plus collaborators for one profiling session
pub struct Profiler {
    registry: Registry,
    config: RwLock<TimerConfig>,
    clock: Arc<dyn Clock>,
    epoch: Epoch,
    output: OutputGate,
    counters: CounterAdapter,
    autodisplay: AutodisplayScheduler,
}

impl Profiler {
    /// Profiler with the system clock, launcher rank, stdout and no counter
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ProfilerBuilder {
        ProfilerBuilder::default()
    }

    /// Process-wide profiler used by the call-site macros.
    ///
    /// Built on first use from [`TimerConfig::default`] with `FLOPWATCH_*`
    /// environment overrides; a malformed override is logged and ignored.
    pub fn global() -> &'static Profiler {
        GLOBAL.get_or_init(|| {
            let config = TimerConfig::default()
                .with_env_overrides()
                .unwrap_or_else(|e| {
                    tracing::warn!("Ignoring timer environment overrides: {}", e);
                    TimerConfig::default()
                });
            Profiler::builder().config(config).build()
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Copy of the active configuration
    pub fn config(&self) -> TimerConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the configuration after validating it
    pub fn set_config(&self, config: TimerConfig) -> Result<()> {
        config.validate()?;
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
        Ok(())
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// First clock reading taken by this profiler
    pub fn process_epoch(&self) -> f64 {
        self.epoch.get(self.clock.as_ref())
    }

    pub fn elapsed_since_epoch(&self) -> f64 {
        self.epoch.elapsed(self.clock.as_ref())
    }

    pub fn rank(&self) -> usize {
        self.output.rank()
    }

    /// Print `<component>::<tag> : <message>` on rank 0 only
    pub fn report(&self, component: &str, tag: &str, message: &str) {
        self.output.report(component, tag, message);
    }

    /// Aggregate operation count from the configured counter
    pub fn total_operations(&self) -> i64 {
        self.counters.total_operations()
    }

    /// Call-site handle for `name`, registering the record on first use
    pub fn timer(&self, name: &str) -> Timer {
        self.process_epoch();
        self.counters.init(&self.output);
        Timer::new(self.registry.get_or_create(name), true)
    }

    /// Call-site handle named `category::name`
    pub fn timer_in(&self, category: &str, name: &str) -> Timer {
        self.timer(&format!("{}::{}", category, name))
    }

    /// Call-site handle that never queries the operation counter
    pub fn timer_without_operations(&self, name: &str) -> Timer {
        self.timer(name).with_operation_counting(false)
    }

    /// Start measuring `name` until the returned guard drops
    pub fn scope(&self, name: &str) -> Measurement<'_> {
        self.timer(name).scope(self, false)
    }

    pub fn scope_verbose(&self, name: &str) -> Measurement<'_> {
        self.timer(name).scope(self, true)
    }

    /// Start measuring `name` with a known operation count
    pub fn scope_with_operations(&self, name: &str, ops: i64) -> Measurement<'_> {
        let mut measurement = self.timer_without_operations(name).scope(self, false);
        measurement.add_operations(ops);
        measurement
    }

    /// Measure a closure under `name`
    ///
    /// # Example
    /// ```
    /// use flopwatch::Profiler;
    ///
    /// let profiler = Profiler::builder().quiet().build();
    /// let result = profiler.measure("format", || format!("test"));
    /// assert_eq!(result, "test");
    /// ```
    pub fn measure<F, R>(&self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _measurement = self.scope(name);
        f()
    }

    /// Dump the full report if the autodisplay interval has passed
    pub fn autodisplay(&self, now: f64) {
        let config = self.config();
        if !config.autodisplay_enabled {
            return;
        }
        if self
            .autodisplay
            .should_trigger(now, config.min_autodisplay_interval)
        {
            tracing::debug!("Autodisplay triggered at {:.3}", now);
            self.dump("autodisplay");
        }
    }

    /// [`Profiler::autodisplay`] at the current time
    pub fn autodisplay_now(&self) {
        self.autodisplay(self.now());
    }

    /// Forget all records and the autodisplay reference time
    pub fn reset(&self) {
        self.registry.reset();
        self.autodisplay.reset();
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("records", &self.registry.len())
            .field("config", &self.config())
            .field("output", &self.output)
            .field("counters", &self.counters)
            .finish()
    }
}

/// Injects the collaborators of a [`Profiler`]
#[derive(Default)]
pub struct ProfilerBuilder {
    clock: Option<Arc<dyn Clock>>,
    rank: Option<Arc<dyn RankProvider>>,
    sink: Option<Arc<dyn Sink>>,
    counter: Option<Arc<dyn OperationCounter>>,
    config: Option<TimerConfig>,
}

impl ProfilerBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn rank(mut self, rank: Arc<dyn RankProvider>) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn counter(mut self, counter: Arc<dyn OperationCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn config(mut self, config: TimerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Shorthand for [`TimerConfig::quiet`]
    pub fn quiet(self) -> Self {
        self.config(TimerConfig::quiet())
    }

    pub fn build(self) -> Profiler {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let rank = self
            .rank
            .unwrap_or_else(|| Arc::new(EnvRank::from_env()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(StdoutSink));
        let counter = self.counter.unwrap_or_else(|| Arc::new(DisabledCounter));

        let profiler = Profiler {
            registry: Registry::new(),
            config: RwLock::new(self.config.unwrap_or_default()),
            clock,
            epoch: Epoch::new(),
            output: OutputGate::new(rank, sink),
            counters: CounterAdapter::new(counter),
            autodisplay: AutodisplayScheduler::new(),
        };
        profiler.process_epoch();
        profiler
    }
}
