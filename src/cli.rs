//! CLI argument parsing for the flopwatch demo runner

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Sorted text table (default)
    Text,
    /// JSON summaries on stdout; report lines move to stderr
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "flopwatch")]
#[command(version)]
#[command(about = "Run an instrumented synthetic workload and report per-site timings", long_about = None)]
pub struct Cli {
    /// Number of workload iterations
    #[arg(
        short = 'n',
        long = "iterations",
        value_name = "N",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub iterations: u32,

    /// Number of distinct measured call sites
    #[arg(
        long = "sites",
        value_name = "N",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub sites: u32,

    /// Base amount of work per site in milliseconds (site k does k+1 times this)
    #[arg(long = "work-ms", value_name = "MS", default_value = "5")]
    pub work_ms: u64,

    /// Operations attributed to each unit of work
    #[arg(long = "ops", value_name = "OPS", default_value = "1000000")]
    pub ops_per_unit: i64,

    /// TOML file with timer configuration
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum seconds between automatic dumps
    #[arg(long = "autodisplay-interval", value_name = "SECS")]
    pub autodisplay_interval: Option<f64>,

    /// Minimum duration for a stop line to be printed
    #[arg(long = "min-stop-log", value_name = "SECS")]
    pub min_stop_log: Option<f64>,

    /// Minimum previous duration for a start line to be printed
    #[arg(long = "min-start-log", value_name = "SECS")]
    pub min_start_log: Option<f64>,

    /// Print start and stop lines for every measurement
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Final report format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["flopwatch"]);
        assert_eq!(cli.iterations, 3);
        assert_eq!(cli.sites, 3);
        assert_eq!(cli.work_ms, 5);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "flopwatch",
            "-n",
            "10",
            "--sites",
            "2",
            "--autodisplay-interval",
            "0.5",
            "--min-stop-log",
            "0",
            "--format",
            "json",
            "--verbose",
        ]);
        assert_eq!(cli.iterations, 10);
        assert_eq!(cli.sites, 2);
        assert_eq!(cli.autodisplay_interval, Some(0.5));
        assert_eq!(cli.min_stop_log, Some(0.0));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_zero_iterations() {
        assert!(Cli::try_parse_from(["flopwatch", "-n", "0"]).is_err());
    }
}
