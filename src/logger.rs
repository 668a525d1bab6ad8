use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::types::Title;

/// Log target used for per-request access records
pub const ACCESS_TARGET: &str = "quill::access";

pub struct Logger {
    pub to_stderr: bool,
    pub severity: Level,
    pub file: Option<Arc<Mutex<File>>>,
    pub enable_colors: bool,
}

impl Logger {
    /// Create a new logger
    ///
    /// The log file, when given, is opened in append mode; its parent directory
    /// is created if needed. A file that cannot be opened disables file output.
    pub fn new(file_path: Option<PathBuf>, severity: Option<Level>, to_stderr: bool, enable_colors: bool) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .ok()
                .map(|f| Arc::new(Mutex::new(f)))
        });

        Logger {
            to_stderr,
            severity: severity.unwrap_or(Level::Info),
            file,
            enable_colors,
        }
    }

    fn get_timestamp() -> String {
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("-"))
    }

    /// ANSI colour for the level tag
    fn level_color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }

    /// One log line, `[<rfc3339>] <LEVEL> <target>: <message>`
    fn format_line(timestamp: &str, record: &Record, colored: bool) -> String {
        let level = record.level();
        let (open, close) = if colored { (Self::level_color(level), "\x1b[0m") } else { ("", "") };
        format!("{open}[{timestamp}] {level}{close} {}: {}\n", record.target(), record.args())
    }

    /// Initialize logger with environment variables
    ///
    /// `QUILL_LOG` (falling back to `RUST_LOG`) picks the level, `QUILL_LOG_FILE`
    /// adds a file sink and `NO_COLOR` turns off ANSI colours.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("QUILL_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::Info);

        let file_path = std::env::var_os("QUILL_LOG_FILE").map(PathBuf::from);
        let enable_colors = std::env::var_os("NO_COLOR").is_none();

        let logger = Logger::new(file_path, Some(severity), true, enable_colors);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))?;
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Self::get_timestamp();
        if self.to_stderr {
            let line = Self::format_line(&timestamp, record, self.enable_colors);
            let _ = std::io::stderr().lock().write_all(line.as_bytes());
        }

        // The file sink never gets colour codes
        if let Some(mut sink) = self.file.as_ref().and_then(|file| file.lock().ok()) {
            let _ = sink.write_all(Self::format_line(&timestamp, record, false).as_bytes());
        }
    }

    fn flush(&self) {
        if self.to_stderr {
            let _ = std::io::stderr().flush();
        }
        if let Some(mut sink) = self.file.as_ref().and_then(|file| file.lock().ok()) {
            let _ = sink.flush();
        }
    }
}

/// Request kinds recorded by the access log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Save,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::View => "view",
            Action::Edit => "edit",
            Action::Save => "save",
        })
    }
}

/// Access log for title-bearing requests.
///
/// Records go through the `log` facade and never fail the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLogger;

impl RequestLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, title: &Title, action: Action, origin: &str) {
        log::info!(target: ACCESS_TARGET, "{} {} from {}", action, title, origin);
    }
}
