//! Event log for synchronization runs
//!
//! The synchronizer reports every discrete event (run start and end, each
//! copy and delete, each failure) as one message to a [`Logger`]. Delivery is
//! ordered, one message per call; the logger's own failures are its concern.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;

use crate::Result;

/// Receiver of synchronization events.
pub trait Logger: Send + Sync {
    /// Record one event message.
    fn log(&self, message: &str);
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

/// Writes timestamped lines to a per-session log file and echoes them to
/// stdout.
///
/// Each instance owns a fresh `sync_<YYYYMMDD_HHMMSS>.log` file in the log
/// directory. Lines have the form `YYYY-MM-DD HH:MM:SS | <message>`.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    file: Mutex<File>,
    echo: bool,
}

impl FileLogger {
    /// Create a logger writing into `log_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the log file cannot be created.
    pub fn create(log_dir: &Path) -> Result<Self> {
        if !log_dir.is_dir() {
            mirror_fs::io::ensure_dir(log_dir)?;
        }

        let file_name = format!("sync_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
        let path = log_dir.join(file_name);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| mirror_fs::Error::io(&path, e))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
            echo: true,
        })
    }

    /// Disable the stdout echo.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Path of the log file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Logger for FileLogger {
    fn log(&self, message: &str) {
        let line = format!("{} | {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message);

        if self.echo {
            println!("{line}");
        }

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(file, "{line}") {
            tracing::warn!(path = %self.path.display(), "Failed to write log line: {}", e);
        }
    }
}

/// Records messages in memory, in call order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    messages: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages logged so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
