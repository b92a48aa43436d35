//! Per-launch output buffer

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::launch::pure::LineClass;
use crate::launch::types::OutputChannel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub channel: OutputChannel,
    pub class: LineClass,
    pub text: String,
}

/// Lines delivered for one launch, in delivery order.
#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    entries: Vec<LogEntry>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel: OutputChannel, class: LineClass, text: impl Into<String>) {
        self.entries.push(LogEntry {
            channel,
            class,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write every line verbatim, newline-terminated.
    pub fn export(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for line in self.lines() {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }
}
