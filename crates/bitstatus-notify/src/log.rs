//! The build log sink.
//!
//! Every skip and failure is written to the build's own log output in
//! addition to process-level tracing, so operators can see why a status
//! update was skipped without digging through server logs.

use std::io::Write;

/// Destination for human-readable progress lines of one notification call.
pub trait BuildLog {
    fn line(&mut self, message: &str);
}

/// Build log writing to any `io::Write` (the usual case: the build's own
/// console output). Write errors are ignored; a broken log sink must not
/// fail the notification.
pub struct WriterLog<W: Write> {
    inner: W,
}

impl<W: Write> WriterLog<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> BuildLog for WriterLog<W> {
    fn line(&mut self, message: &str) {
        let _ = writeln!(self.inner, "{message}");
    }
}

/// Build log that drops everything.
#[derive(Debug, Default)]
pub struct NullLog;

impl BuildLog for NullLog {
    fn line(&mut self, _message: &str) {}
}

/// Build log capturing lines in memory, for assertions in tests and for
/// callers that surface the lines elsewhere.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Vec<String>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl BuildLog for MemoryLog {
    fn line(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}
