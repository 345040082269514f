//! Report lines and sorted dumps
//!
//! Line layouts are fixed-width so that scripts can parse them:
//!
//! ```text
//! Timer::stop  :                           work :  2.0%        3 calls. Last 3.000E-01 secs   0.000 Gflops (0.000E+00 per call)
//! Timer::display :                           work : 60.000%        3 calls. Avg 2.00E-01(6.00E-01) secs  0.00 Gflops (0.00E+00(0.00E+00)flops)
//! Timer::display-start : final ------------ total 1.0000e+00 secs -----------------------
//! ```

use crate::profiler::Profiler;
use crate::record::{RecordHandle, RecordStats};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Names longer than this are cut in report lines
pub const NAME_WIDTH: usize = 30;

/// Component prefix of every timer report line
pub const COMPONENT: &str = "Timer";

/// Format like C's `%.<precision>E` / `%.<precision>e`: mantissa, signed
/// exponent of at least two digits.
///
/// ```
/// use flopwatch::report::format_sci;
///
/// assert_eq!(format_sci(0.00123, 3, true), "1.230E-03");
/// assert_eq!(format_sci(12345.0, 4, false), "1.2345e+04");
/// ```
pub fn format_sci(value: f64, precision: usize, upper: bool) -> String {
    if value.is_nan() {
        return if upper { "NAN" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        let s = if value > 0.0 { "inf" } else { "-inf" };
        return if upper { s.to_uppercase() } else { s.to_string() };
    }

    let formatted = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = formatted
        .split_once('e')
        .unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:02}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

/// Right-aligned name cut to [`NAME_WIDTH`] characters
fn display_name(name: &str) -> String {
    let cut: String = name.chars().take(NAME_WIDTH).collect();
    format!("{:>width$}", cut, width = NAME_WIDTH)
}

/// Share of `elapsed` spent in `total_duration`, in percent
pub fn percent_of(total_duration: f64, elapsed: f64) -> f64 {
    if elapsed > 0.0 {
        total_duration / elapsed * 100.0
    } else {
        0.0
    }
}

/// Gflop/s; zero when nothing was counted or no time passed
pub fn gflops(operations: f64, duration: f64) -> f64 {
    if operations == 0.0 || duration.is_nan() || duration <= 0.0 || duration.is_infinite() {
        0.0
    } else {
        operations / duration / 1.0e9
    }
}

/// Start/stop line describing the most recent measurement
pub fn format_last(name: &str, stats: &RecordStats, elapsed: f64) -> String {
    format!(
        "{} :{:5.1}%{:9} calls. Last {} secs{:8.3} Gflops ({} per call)",
        display_name(name),
        percent_of(stats.total_duration, elapsed),
        stats.calls,
        format_sci(stats.last_duration, 3, true),
        gflops(stats.last_operations as f64, stats.last_duration),
        format_sci(stats.last_operations as f64, 3, true),
    )
}

/// Dump line with per-call averages and totals
pub fn format_average(name: &str, stats: &RecordStats, elapsed: f64) -> String {
    format!(
        "{} :{:7.3}%{:9} calls. Avg {}({}) secs{:6.2} Gflops ({}({})flops)",
        display_name(name),
        percent_of(stats.total_duration, elapsed),
        stats.calls,
        format_sci(stats.average_duration(), 2, true),
        format_sci(stats.total_duration, 2, true),
        gflops(stats.total_operations as f64, stats.total_duration),
        format_sci(stats.average_operations(), 2, true),
        format_sci(stats.total_operations as f64, 2, true),
    )
}

/// Banner printed before and after a dump
pub fn format_banner(tag: &str, elapsed: f64) -> String {
    format!(
        "{} ------------ total {} secs -----------------------",
        tag,
        format_sci(elapsed, 4, false)
    )
}

/// Registry snapshot ordered by descending total duration; ties keep
/// registration order
pub fn sorted_by_cost(records: Vec<RecordHandle>) -> Vec<(RecordHandle, RecordStats)> {
    let mut with_stats: Vec<_> = records
        .into_iter()
        .map(|record| {
            let stats = record.stats();
            (record, stats)
        })
        .collect();
    // sort_by is stable
    with_stats.sort_by(|a, b| {
        b.1.total_duration
            .partial_cmp(&a.1.total_duration)
            .unwrap_or(Ordering::Equal)
    });
    with_stats
}

/// Serializable view of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub name: String,
    pub calls: u64,
    pub total_duration_secs: f64,
    pub average_duration_secs: f64,
    /// Absent before the first completed measurement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_duration_secs: Option<f64>,
    pub total_operations: i64,
    pub last_operations: i64,
    pub average_operations: f64,
    pub percent_of_elapsed: f64,
    pub gflops: f64,
}

impl RecordSummary {
    pub fn new(name: &str, stats: &RecordStats, elapsed: f64) -> Self {
        Self {
            name: name.to_string(),
            calls: stats.calls,
            total_duration_secs: stats.total_duration,
            average_duration_secs: stats.average_duration(),
            last_duration_secs: (!stats.last_duration.is_nan()).then_some(stats.last_duration),
            total_operations: stats.total_operations,
            last_operations: stats.last_operations,
            average_operations: stats.average_operations(),
            percent_of_elapsed: percent_of(stats.total_duration, elapsed),
            gflops: gflops(stats.total_operations as f64, stats.total_duration),
        }
    }
}

/// Whole-report JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub elapsed_secs: f64,
    pub records: Vec<RecordSummary>,
}

/// Render summaries as pretty JSON
pub fn to_json(elapsed: f64, records: Vec<RecordSummary>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        elapsed_secs: elapsed,
        records,
    })
}

impl Profiler {
    /// Print the most recent measurement of `record`
    pub fn show_last(&self, record: &RecordHandle, tag: &str) {
        let line = format_last(record.name(), &record.stats(), self.elapsed_since_epoch());
        self.report(COMPONENT, tag, &line);
    }

    /// Print averages and totals of `record`
    pub fn show_average(&self, record: &RecordHandle, tag: &str) {
        let line = format_average(record.name(), &record.stats(), self.elapsed_since_epoch());
        self.report(COMPONENT, tag, &line);
    }

    /// Print every record, most expensive first, between two banners.
    ///
    /// The dump measures itself through three bookkeeping timers so that
    /// reporting overhead shows up in its own output.
    pub fn dump(&self, tag: &str) {
        self.measure_reporting_overhead();

        let elapsed = self.elapsed_since_epoch();
        let sorted = sorted_by_cost(self.registry().snapshot());

        self.report(COMPONENT, "display-start", &format_banner(tag, elapsed));
        for (record, stats) in &sorted {
            self.report(
                COMPONENT,
                "display",
                &format_average(record.name(), stats, elapsed),
            );
        }
        self.report(COMPONENT, "display-end  ", &format_banner(tag, elapsed));
    }

    /// Summaries in dump order
    pub fn summaries(&self) -> Vec<RecordSummary> {
        let elapsed = self.elapsed_since_epoch();
        sorted_by_cost(self.registry().snapshot())
            .iter()
            .map(|(record, stats)| RecordSummary::new(record.name(), stats, elapsed))
            .collect()
    }

    /// JSON document of [`Profiler::summaries`]
    pub fn to_json(&self) -> serde_json::Result<String> {
        to_json(self.elapsed_since_epoch(), self.summaries())
    }

    // "Timer" times a probe span that queries the counter, "Timer-noflop" one
    // that does not; "Timer-test" is the probe itself.
    fn measure_reporting_overhead(&self) {
        let with_flops = self.timer_without_operations("Timer");
        let without_flops = self.timer_without_operations("Timer-noflop");
        let probe = self.timer_without_operations("Timer-test");
        let counting_probe = probe.clone().with_operation_counting(true);

        drop(probe.scope(self, false));
        {
            let _outer = with_flops.scope(self, false);
            let _probe = counting_probe.scope(self, false);
        }
        {
            let _outer = without_flops.scope(self, false);
            let _probe = probe.scope(self, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::TimerConfig;
    use crate::sink::MemorySink;
    use std::sync::Arc;

    fn quiet_profiler() -> (Profiler, Arc<ManualClock>, MemorySink) {
        let clock = Arc::new(ManualClock::new(0.0));
        let sink = MemorySink::new();
        let profiler = Profiler::builder()
            .clock(clock.clone())
            .sink(Arc::new(sink.clone()))
            .config(TimerConfig::quiet())
            .build();
        (profiler, clock, sink)
    }

    fn run(profiler: &Profiler, clock: &ManualClock, name: &str, duration: f64) {
        let _t = profiler.scope(name);
        clock.advance(duration);
    }

    #[test]
    fn test_format_sci() {
        assert_eq!(format_sci(0.0, 3, true), "0.000E+00");
        assert_eq!(format_sci(1.0, 2, true), "1.00E+00");
        assert_eq!(format_sci(-2.5e-7, 2, true), "-2.50E-07");
        assert_eq!(format_sci(6.02e123, 3, true), "6.020E+123");
        assert_eq!(format_sci(f64::NAN, 3, true), "NAN");
        assert_eq!(format_sci(f64::INFINITY, 3, false), "inf");
    }

    #[test]
    fn test_display_name_pads_and_cuts() {
        assert_eq!(display_name("abc").len(), NAME_WIDTH);
        assert!(display_name("abc").ends_with("abc"));

        let long = "x".repeat(45);
        assert_eq!(display_name(&long), "x".repeat(NAME_WIDTH));
    }

    #[test]
    fn test_format_last_layout() {
        let stats = RecordStats {
            last_duration: 0.5,
            total_duration: 1.0,
            last_operations: 2_000_000_000,
            total_operations: 4_000_000_000,
            calls: 2,
        };
        let line = format_last("solve", &stats, 4.0);
        assert_eq!(
            line,
            format!(
                "{:>30} : 25.0%        2 calls. Last 5.000E-01 secs   4.000 Gflops (2.000E+09 per call)",
                "solve"
            )
        );
    }

    #[test]
    fn test_format_average_layout() {
        let stats = RecordStats {
            last_duration: 0.3,
            total_duration: 0.6,
            last_operations: 0,
            total_operations: 0,
            calls: 3,
        };
        let line = format_average("work", &stats, 1.2);
        assert_eq!(
            line,
            format!(
                "{:>30} : 50.000%        3 calls. Avg 2.00E-01(6.00E-01) secs  0.00 Gflops (0.00E+00(0.00E+00)flops)",
                "work"
            )
        );
    }

    #[test]
    fn test_format_banner() {
        assert_eq!(
            format_banner("final", 12.5),
            "final ------------ total 1.2500e+01 secs -----------------------"
        );
    }

    #[test]
    fn test_gflops_degrades_to_zero() {
        assert_eq!(gflops(0.0, 1.0), 0.0);
        assert_eq!(gflops(100.0, 0.0), 0.0);
        assert_eq!(gflops(100.0, f64::NAN), 0.0);
        assert_eq!(gflops(3.0e9, 1.5), 2.0);
    }

    #[test]
    fn test_percent_of_zero_elapsed() {
        assert_eq!(percent_of(1.0, 0.0), 0.0);
        assert_eq!(percent_of(1.0, 4.0), 25.0);
    }

    #[test]
    fn test_dump_sorted_descending_and_stable() {
        let (profiler, clock, sink) = quiet_profiler();
        run(&profiler, &clock, "A", 5.0);
        run(&profiler, &clock, "B", 5.0);
        run(&profiler, &clock, "C", 3.0);
        run(&profiler, &clock, "D", 7.0);
        sink.clear();

        profiler.dump("final");

        let order: Vec<String> = sink
            .lines()
            .iter()
            .filter(|l| l.starts_with("Timer::display : "))
            .map(|l| l["Timer::display : ".len()..][..NAME_WIDTH].trim().to_string())
            .filter(|name| ["A", "B", "C", "D"].contains(&name.as_str()))
            .collect();
        assert_eq!(order, vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn test_dump_banners_and_bookkeeping_records() {
        let (profiler, clock, sink) = quiet_profiler();
        run(&profiler, &clock, "work", 1.0);
        sink.clear();

        profiler.dump("final");

        let lines: Vec<String> = sink
            .lines()
            .into_iter()
            .filter(|l| l.starts_with("Timer::display"))
            .collect();
        assert_eq!(
            lines.first().unwrap(),
            "Timer::display-start : final ------------ total 1.0000e+00 secs -----------------------"
        );
        assert_eq!(
            lines.last().unwrap(),
            "Timer::display-end   : final ------------ total 1.0000e+00 secs -----------------------"
        );
        // work + Timer + Timer-noflop + Timer-test
        assert_eq!(lines.len(), 2 + 4);

        let probe = profiler.registry().get("Timer-test").unwrap().stats();
        assert_eq!(probe.calls, 3);
        assert_eq!(profiler.registry().get("Timer").unwrap().stats().calls, 1);
        assert_eq!(
            profiler.registry().get("Timer-noflop").unwrap().stats().calls,
            1
        );
    }

    #[test]
    fn test_dump_does_not_reorder_registry() {
        let (profiler, clock, _sink) = quiet_profiler();
        run(&profiler, &clock, "cheap", 1.0);
        run(&profiler, &clock, "costly", 9.0);
        profiler.dump("x");

        let names: Vec<String> = profiler
            .registry()
            .snapshot()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(&names[..2], &["cheap", "costly"]);
    }

    #[test]
    fn test_summaries_and_json() {
        let (profiler, clock, _sink) = quiet_profiler();
        run(&profiler, &clock, "work", 2.0);
        clock.advance(2.0);

        let summaries = profiler.summaries();
        assert_eq!(summaries[0].name, "work");
        assert_eq!(summaries[0].calls, 1);
        assert_eq!(summaries[0].percent_of_elapsed, 50.0);
        assert_eq!(summaries[0].last_duration_secs, Some(2.0));

        let json = profiler.to_json().unwrap();
        let parsed: JsonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.elapsed_secs, 4.0);
        assert_eq!(parsed.records[0], summaries[0]);
    }

    #[test]
    fn test_summary_omits_last_duration_before_first_stop() {
        let summary = RecordSummary::new("pending", &RecordStats::default(), 1.0);
        assert_eq!(summary.last_duration_secs, None);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("last_duration_secs"));
    }
}
