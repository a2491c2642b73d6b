//! Results log sinks

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::error::{Error, Result};

/// Receives the human-readable progress and results lines of a batch
///
/// Writing a line never fails from the caller's point of view; sinks that can
/// fail report the problem through `tracing` and carry on.
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str);
}

/// Forwards every line to `tracing` at info level
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn log(&self, line: &str) {
        tracing::info!(target: "refactorml::results", "{line}");
    }
}

/// Appends timestamped lines to a file and mirrors them to `tracing`
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLog {
    /// Open `path` for appending, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLog {
    fn log(&self, line: &str) {
        TracingLog.log(line);
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let written = match self.file.lock() {
            Ok(mut file) => writeln!(file, "[{stamp}] {line}"),
            Err(poisoned) => writeln!(poisoned.into_inner(), "[{stamp}] {line}"),
        };
        if let Err(e) = written {
            tracing::warn!(path = %self.path.display(), error = %e, "could not write results log");
        }
    }
}

/// Keeps lines in memory; clones share the same buffer
#[derive(Clone, Debug, Default)]
pub struct MemoryLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of lines containing every one of `needles`
    pub fn count_matching(&self, needles: &[&str]) -> usize {
        self.entries()
            .iter()
            .filter(|line| needles.iter().all(|n| line.contains(n)))
            .count()
    }
}

impl LogSink for MemoryLog {
    fn log(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
