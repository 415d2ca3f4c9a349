//! Rolling Logger
//!
//! Console and daily log file output. `log` records are bridged into
//! `tracing`, so library code can keep using the `log` macros.
//!
//! Files are named `<app>.<YYYY-MM-DD>.log`; only the newest
//! `max_files` of them are kept.

use chrono::{Local, NaiveDate};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Number of daily files kept by [`init_logger`]
pub const DEFAULT_MAX_FILES: usize = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to prepare log directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to install logger: {0}")]
    Init(String),
}

/// Install the global subscriber: stdout plus a rolling file in `log_dir`.
///
/// The level filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    let log_dir = log_dir.as_ref();
    let file = RollingFile::new(log_dir, app_name, DEFAULT_MAX_FILES)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file),
        )
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    tracing::info!(app = app_name, dir = %log_dir.display(), "logger installed");
    Ok(())
}

struct OpenFile {
    date: NaiveDate,
    file: File,
}

/// Append-only log file that switches to a new file each day
pub struct RollingFile {
    dir: PathBuf,
    prefix: String,
    max_files: usize,
    current: Mutex<Option<OpenFile>>,
}

impl RollingFile {
    pub fn new(dir: &Path, prefix: &str, max_files: usize) -> Result<Self, LoggerError> {
        fs::create_dir_all(dir).map_err(|source| LoggerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            max_files: max_files.max(1),
            current: Mutex::new(None),
        })
    }

    /// Path of the file used for `date`
    pub fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}.{}.log", self.prefix, date.format(DATE_FORMAT)))
    }

    /// Append `buf` to the file for `date`, rolling over when the date changes
    pub fn write_for_date(&self, date: NaiveDate, buf: &[u8]) -> io::Result<usize> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;

        let open = match current.take() {
            Some(open) if open.date == date => open,
            _ => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.file_path(date))?;
                // Logging from inside the writer would re-enter the subscriber
                if let Err(e) = self.prune() {
                    eprintln!("rolling-logger: failed to prune {}: {}", self.dir.display(), e);
                }
                OpenFile { date, file }
            }
        };

        current.insert(open).file.write(buf)
    }

    fn flush_current(&self) -> io::Result<()> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        match current.as_mut() {
            Some(open) => open.file.flush(),
            None => Ok(()),
        }
    }

    /// Remove the oldest files beyond `max_files`
    fn prune(&self) -> io::Result<()> {
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| self.is_own_log(path))
            .collect();

        if logs.len() <= self.max_files {
            return Ok(());
        }

        // ISO dates sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_files;
        for path in logs.into_iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn is_own_log(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(self.prefix.as_str()))
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|rest| rest.strip_suffix(".log"))
            .is_some_and(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok())
    }
}

/// Per-event writer handed out to the fmt layer
pub struct RollingWriter<'a> {
    file: &'a RollingFile,
}

impl Write for RollingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_for_date(Local::now().date_naive(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush_current()
    }
}

impl<'a> MakeWriter<'a> for RollingFile {
    type Writer = RollingWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter { file: self }
    }
}
