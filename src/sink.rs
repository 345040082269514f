//! Console sinks for report lines

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Destination for formatted report lines (without trailing newline)
pub trait Sink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not take the instrumented program down.
        let _ = writeln!(out, "{}", line);
    }
}

/// Writes lines to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write_line(&self, line: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", line);
    }
}

/// Collects lines in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line written so far
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.lines.lock() {
            Ok(mut lines) => lines.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl Sink for MemorySink {
    fn write_line(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        sink.write_line("first");
        sink.write_line("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        handle.write_line("shared");
        assert_eq!(sink.lines(), vec!["shared"]);

        sink.clear();
        assert!(handle.lines().is_empty());
    }

    #[test]
    fn test_stdout_sink_does_not_panic() {
        StdoutSink.write_line("flopwatch stdout sink test");
        StderrSink.write_line("flopwatch stderr sink test");
    }
}
