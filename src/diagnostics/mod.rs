//! # Diagnostic Sink
//!
//! Every phase of the front end reports problems through the narrow
//! [`DiagnosticSink`] contract instead of talking to a logging backend
//! directly. The sink only has to count what it receives; rendering is an
//! implementation detail.
//!
//! Two sinks are provided:
//!
//! - [`Logger`] forwards each record to `tracing`, prefixed with the name of
//!   the input file, and counts errors and warnings.
//! - [`LoggerMock`] only counts. It is the sink used throughout the tests and
//!   by `--quiet`.
//!
//! [`Buffer`] keeps records for later: the driver collects into one on the
//! compiler thread and replays it into the caller's sink.
//!
//! A compilation unit is successful iff [`DiagnosticSink::success`] holds
//! once analysis is over, i.e. zero errors were recorded. Warnings do not
//! affect success, only [`DiagnosticSink::perfect_success`].

use std::fmt;

/// The reporting contract consumed by the parser, the type table and the
/// semantic analyzer.
pub trait DiagnosticSink {
    /// Record an error.
    fn error(&mut self, args: fmt::Arguments<'_>);

    /// Record a warning.
    fn warning(&mut self, args: fmt::Arguments<'_>);

    /// Informational message; does not affect the counts.
    fn info(&mut self, _args: fmt::Arguments<'_>) {}

    /// Debug message; does not affect the counts.
    fn debug(&mut self, _args: fmt::Arguments<'_>) {}

    /// Number of errors recorded since the last [`DiagnosticSink::clear`].
    fn errors(&self) -> usize;

    /// Number of warnings recorded since the last [`DiagnosticSink::clear`].
    fn warnings(&self) -> usize;

    /// Reset both counters.
    fn clear(&mut self);

    /// Zero errors recorded.
    fn success(&self) -> bool {
        self.errors() == 0
    }

    /// Zero errors and zero warnings recorded.
    fn perfect_success(&self) -> bool {
        self.errors() == 0 && self.warnings() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counts {
    errors: usize,
    warnings: usize,
}

/// Count-only sink. Never renders anything.
#[derive(Debug, Clone, Default)]
pub struct LoggerMock {
    counts: Counts,
}

impl LoggerMock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for LoggerMock {
    fn error(&mut self, _args: fmt::Arguments<'_>) {
        self.counts.errors += 1;
    }

    fn warning(&mut self, _args: fmt::Arguments<'_>) {
        self.counts.warnings += 1;
    }

    fn errors(&self) -> usize {
        self.counts.errors
    }

    fn warnings(&self) -> usize {
        self.counts.warnings
    }

    fn clear(&mut self) {
        self.counts = Counts::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
    Debug,
}

/// Sink that keeps every record, in order, until it is replayed.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    records: Vec<(Level, String)>,
    counts: Counts,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[(Level, String)] {
        &self.records
    }

    /// Forward every record to `sink`.
    pub fn replay(self, sink: &mut dyn DiagnosticSink) {
        for (level, message) in self.records {
            match level {
                Level::Error => sink.error(format_args!("{message}")),
                Level::Warning => sink.warning(format_args!("{message}")),
                Level::Info => sink.info(format_args!("{message}")),
                Level::Debug => sink.debug(format_args!("{message}")),
            }
        }
    }
}

impl DiagnosticSink for Buffer {
    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.records.push((Level::Error, args.to_string()));
        self.counts.errors += 1;
    }

    fn warning(&mut self, args: fmt::Arguments<'_>) {
        self.records.push((Level::Warning, args.to_string()));
        self.counts.warnings += 1;
    }

    fn info(&mut self, args: fmt::Arguments<'_>) {
        self.records.push((Level::Info, args.to_string()));
    }

    fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.records.push((Level::Debug, args.to_string()));
    }

    fn errors(&self) -> usize {
        self.counts.errors
    }

    fn warnings(&self) -> usize {
        self.counts.warnings
    }

    fn clear(&mut self) {
        self.records.clear();
        self.counts = Counts::default();
    }
}

/// Sink that renders through `tracing`.
///
/// Messages are emitted as `"<file>: <message>"` under the `llamac` target,
/// so a subscriber filter such as `LLAMA_LOG=llamac=debug` controls what is
/// visible. Counting happens regardless of the active filter.
#[derive(Debug, Clone)]
pub struct Logger {
    file_name: String,
    counts: Counts,
}

impl Logger {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            counts: Counts::default(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("<stdin>")
    }
}

impl DiagnosticSink for Logger {
    fn error(&mut self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "llamac", "{}: {}", self.file_name, args);
        self.counts.errors += 1;
    }

    fn warning(&mut self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "llamac", "{}: {}", self.file_name, args);
        self.counts.warnings += 1;
    }

    fn info(&mut self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "llamac", "{}: {}", self.file_name, args);
    }

    fn debug(&mut self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "llamac", "{}: {}", self.file_name, args);
    }

    fn errors(&self) -> usize {
        self.counts.errors
    }

    fn warnings(&self) -> usize {
        self.counts.warnings
    }

    fn clear(&mut self) {
        self.counts = Counts::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(sink: &mut dyn DiagnosticSink) {
        assert!(sink.perfect_success());

        sink.debug(format_args!("debug message No {}", 42));
        sink.info(format_args!("info message No {}", 42));
        assert!(sink.perfect_success());

        sink.warning(format_args!("warning message No {}", 42));
        assert!(sink.success());
        assert!(!sink.perfect_success());

        sink.error(format_args!("error message No {}", 42));
        assert!(!sink.success());
        assert_eq!(sink.errors(), 1);
        assert_eq!(sink.warnings(), 1);

        sink.clear();
        assert!(sink.success());
        assert!(sink.perfect_success());
    }

    #[test]
    fn test_mock_counts() {
        exercise(&mut LoggerMock::new());
    }

    #[test]
    fn test_logger_counts() {
        exercise(&mut Logger::new("test.lla"));
    }

    #[test]
    fn test_buffer_counts() {
        exercise(&mut Buffer::new());
    }

    #[test]
    fn test_buffer_replays_in_order() {
        let mut buffer = Buffer::new();
        buffer.warning(format_args!("first"));
        buffer.debug(format_args!("second"));
        buffer.error(format_args!("third {}", 3));
        assert_eq!(
            buffer.records(),
            &[
                (Level::Warning, "first".to_string()),
                (Level::Debug, "second".to_string()),
                (Level::Error, "third 3".to_string()),
            ]
        );

        let mut mock = LoggerMock::new();
        buffer.replay(&mut mock);
        assert_eq!(mock.errors(), 1);
        assert_eq!(mock.warnings(), 1);
    }

    #[test]
    fn test_loggers_are_independent() {
        let mut first = LoggerMock::new();
        let second = LoggerMock::new();
        first.error(format_args!("boom"));
        assert!(!first.success());
        assert!(second.success());
        assert!(second.perfect_success());
    }
}
