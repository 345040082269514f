//! Rank-gated console output
//!
//! Every report line goes through [`OutputGate::report`]. Non-primary ranks
//! print nothing.

use crate::rank::RankProvider;
use crate::sink::Sink;
use std::sync::Arc;

/// Messages longer than this many bytes are truncated
pub const MAX_MESSAGE_BYTES: usize = 2047;

/// Rank check plus sink
#[derive(Clone)]
pub struct OutputGate {
    rank: Arc<dyn RankProvider>,
    sink: Arc<dyn Sink>,
}

impl OutputGate {
    pub fn new(rank: Arc<dyn RankProvider>, sink: Arc<dyn Sink>) -> Self {
        Self { rank, sink }
    }

    pub fn rank(&self) -> usize {
        self.rank.rank()
    }

    /// Write `<component>::<tag> : <message>` if this is rank 0
    pub fn report(&self, component: &str, tag: &str, message: &str) {
        if self.rank() != 0 {
            return;
        }
        let message = truncate_to_boundary(message, MAX_MESSAGE_BYTES);
        self.sink
            .write_line(&format!("{}::{} : {}", component, tag, message));
    }
}

impl std::fmt::Debug for OutputGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputGate")
            .field("rank", &self.rank())
            .finish()
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char
pub fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::FixedRank;
    use crate::sink::MemorySink;

    fn gate(rank: usize) -> (OutputGate, MemorySink) {
        let sink = MemorySink::new();
        let gate = OutputGate::new(Arc::new(FixedRank(rank)), Arc::new(sink.clone()));
        (gate, sink)
    }

    #[test]
    fn test_report_prefixes_component_and_tag() {
        let (gate, sink) = gate(0);
        gate.report("Timer", "start", "hello");
        assert_eq!(sink.lines(), vec!["Timer::start : hello"]);
    }

    #[test]
    fn test_report_suppressed_on_nonzero_rank() {
        let (gate, sink) = gate(1);
        gate.report("Timer", "stop ", "hidden");
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_long_message_truncated() {
        let (gate, sink) = gate(0);
        let long = "x".repeat(5000);
        gate.report("Timer", "display", &long);

        let line = &sink.lines()[0];
        assert_eq!(line.len(), "Timer::display : ".len() + MAX_MESSAGE_BYTES);
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; cutting at 3 would split the second one
        let s = "éé";
        assert_eq!(truncate_to_boundary(s, 3), "é");
        assert_eq!(truncate_to_boundary(s, 4), "éé");
        assert_eq!(truncate_to_boundary("abc", 10), "abc");
    }
}
