//! Flopwatch - named call-site timers with operation accounting
//!
//! This library wraps code regions in named, scoped measurements that
//! accumulate wall-clock time and optional operation ("flop") counts across
//! calls, and prints a table of all call sites sorted by cost, on demand or
//! automatically at most once per configured interval.

pub mod autodisplay;
pub mod cli;
pub mod clock;
pub mod config;
pub mod counters;
pub mod error;
pub mod measurement;
pub mod output;
pub mod profiler;
pub mod rank;
pub mod record;
pub mod registry;
pub mod report;
pub mod sink;

pub use config::TimerConfig;
pub use error::{FlopwatchError, Result};
pub use measurement::{Measurement, Timer};
pub use profiler::{Profiler, ProfilerBuilder};
