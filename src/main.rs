use anyhow::{Context, Result};
use clap::Parser;
use flopwatch::cli::{Cli, OutputFormat};
use flopwatch::counters::SharedCounter;
use flopwatch::sink::{Sink, StderrSink, StdoutSink};
use flopwatch::{Profiler, TimerConfig};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config file, then environment, then command-line flags
fn load_config(args: &Cli) -> Result<TimerConfig> {
    let base = match &args.config {
        Some(path) => TimerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TimerConfig::default(),
    };
    let mut config = base.with_env_overrides()?;

    if let Some(interval) = args.autodisplay_interval {
        config.min_autodisplay_interval = interval;
    }
    if let Some(stop) = args.min_stop_log {
        config.min_stop_log_duration = stop;
    }
    if let Some(start) = args.min_start_log {
        config.min_start_log_duration = start;
    }
    config.validate()?;
    Ok(config)
}

/// Sleep-based work with a known operation count per site
fn run_workload(profiler: &Profiler, counter: &SharedCounter, args: &Cli) {
    let sites: Vec<_> = (0..args.sites)
        .map(|s| profiler.timer_in("workload", &format!("site-{}", s)))
        .collect();
    let iteration = profiler.timer("workload::iteration");
    let setup = profiler.timer_without_operations("workload::setup");

    for _ in 0..args.iterations {
        let _iteration = iteration.scope(profiler, args.verbose);
        {
            let _setup = setup.scope(profiler, args.verbose);
            thread::sleep(Duration::from_millis(args.work_ms / 2));
        }
        for (units, site) in (1..).zip(&sites) {
            let _site = site.scope(profiler, args.verbose);
            thread::sleep(Duration::from_millis(args.work_ms * units));
            counter.add(args.ops_per_unit * units as i64);
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let counter = SharedCounter::new();
    // Keep stdout clean for the JSON document
    let sink: Arc<dyn Sink> = match args.format {
        OutputFormat::Text => Arc::new(StdoutSink),
        OutputFormat::Json => Arc::new(StderrSink),
    };
    let profiler = Profiler::builder()
        .config(config)
        .counter(Arc::new(counter.clone()))
        .sink(sink)
        .build();

    run_workload(&profiler, &counter, &args);

    match args.format {
        OutputFormat::Text => profiler.dump("final"),
        OutputFormat::Json => println!("{}", profiler.to_json()?),
    }

    Ok(())
}
