//! Event-sink channel between the engine and its caller.
//!
//! The engine never performs direct user interaction. Everything a front-end
//! needs to display (log lines and batch progress) flows through a single
//! [`EventSink`] passed into each operation, so a headless batch tool and an
//! interactive shell can drive the same conversion code.

use std::sync::Mutex;

/// Receiver for human-readable log lines and batch progress notifications.
///
/// Implementations must be cheap to call; the engine may emit a line per
/// file, per part, and per degraded fallback.
pub trait EventSink {
    /// Receive one human-readable log line.
    fn log(&self, line: &str);

    /// Receive a progress notification for a batch operation.
    ///
    /// `completed` counts finished items out of `total`. The default
    /// implementation ignores progress, which suits single-file callers.
    fn progress(&self, completed: usize, total: usize) {
        let _ = (completed, total);
    }
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn log(&self, _line: &str) {}
}

/// A sink that collects log lines and progress updates in memory.
///
/// Used by tests to assert that degraded outcomes are logged, and useful
/// for callers that render the log after the fact.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    progress: Mutex<Vec<(usize, usize)>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all log lines received so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Snapshot of all progress notifications received so far.
    pub fn progress_updates(&self) -> Vec<(usize, usize)> {
        self.progress.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Whether any received line contains the given fragment.
    pub fn contains(&self, fragment: &str) -> bool {
        self.lines().iter().any(|l| l.contains(fragment))
    }
}

impl EventSink for MemorySink {
    fn log(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }

    fn progress(&self, completed: usize, total: usize) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.push((completed, total));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_collects_lines() {
        let sink = MemorySink::new();
        sink.log("first");
        sink.log("second");
        assert_eq!(sink.lines(), vec!["first".to_string(), "second".to_string()]);
        assert!(sink.contains("sec"));
    }

    #[test]
    fn memory_sink_collects_progress() {
        let sink = MemorySink::new();
        sink.progress(1, 4);
        sink.progress(2, 4);
        assert_eq!(sink.progress_updates(), vec![(1, 4), (2, 4)]);
    }

    #[test]
    fn null_sink_ignores_everything() {
        let sink = NullSink;
        sink.log("ignored");
        sink.progress(1, 1);
    }
}
