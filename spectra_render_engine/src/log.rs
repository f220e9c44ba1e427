//! Logging for the Spectra render engine
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information for detailed ERROR logs
//!
//! There is no global logger. Every engine component receives a [`LogSink`]
//! at construction, so tests can capture or silence diagnostics
//! deterministically ([`CapturingLogger`], [`NullLogger`]).

use colored::*;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to create custom loggers (file logging, network
/// logging, etc.)
///
/// # Example
///
/// ```no_run
/// use spectra_render_engine::spectra::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The log entry to process
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "spectra::Camera", "spectra::headless::Scene")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose debug information (typically disabled in release)
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (potential issues)
    Warn,

    /// Error messages (critical issues with file:line details)
    Error,
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        // Format timestamp as YYYY-MM-DD HH:MM:SS.mmm
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

/// Logger that discards every entry.
///
/// Used by `LogSink::null()` to silence a component entirely.
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _entry: &LogEntry) {}
}

/// Logger that records entries in memory so tests can assert on diagnostics.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use spectra_render_engine::spectra::log::CapturingLogger;
/// use spectra_render_engine::log::LogSink;
///
/// let logger = Arc::new(CapturingLogger::new());
/// let sink = LogSink::new(logger.clone());
/// // ... hand `sink` to a component, then:
/// assert_eq!(logger.entry_count(), 0);
/// ```
pub struct CapturingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl CapturingLogger {
    /// Create an empty capturing logger
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Number of entries recorded so far
    pub fn entry_count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Snapshot of all recorded entries
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// True if any recorded message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|entry| entry.message.contains(needle))
    }

    /// Highest severity recorded, if any
    pub fn max_severity(&self) -> Option<LogSeverity> {
        self.entries().iter().map(|entry| entry.severity).max()
    }
}

impl Default for CapturingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

/// Cloneable handle to an injected logger.
///
/// Engine components never reach for a global console; they log through the
/// sink they were constructed with. Cloning the sink shares the underlying
/// logger.
#[derive(Clone)]
pub struct LogSink {
    logger: Arc<dyn Logger>,
}

impl LogSink {
    /// Create a sink around any logger
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Sink that discards all output
    pub fn null() -> Self {
        Self {
            logger: Arc::new(NullLogger),
        }
    }

    /// Log a message without file:line information
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "spectra::Camera")
    /// * `message` - Log message
    pub fn log(&self, severity: LogSeverity, source: &str, message: impl Into<String>) {
        self.logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message: message.into(),
            file: None,
            line: None,
        });
    }

    /// Log a message with file:line information (used by `sink_error!`)
    pub fn log_detailed(
        &self,
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        self.logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    /// Log a TRACE message
    pub fn trace(&self, source: &str, message: impl Into<String>) {
        self.log(LogSeverity::Trace, source, message);
    }

    /// Log a DEBUG message
    pub fn debug(&self, source: &str, message: impl Into<String>) {
        self.log(LogSeverity::Debug, source, message);
    }

    /// Log an INFO message
    pub fn info(&self, source: &str, message: impl Into<String>) {
        self.log(LogSeverity::Info, source, message);
    }

    /// Log a WARN message
    pub fn warn(&self, source: &str, message: impl Into<String>) {
        self.log(LogSeverity::Warn, source, message);
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self {
            logger: Arc::new(DefaultLogger),
        }
    }
}

/// Log an ERROR message with file:line information through a [`LogSink`]
///
/// # Example
///
/// ```no_run
/// # use spectra_render_engine::{sink_error, log::LogSink};
/// # let sink = LogSink::null();
/// sink_error!(sink, "spectra::Camera", "no render target for camera '{}'", "main");
/// ```
#[macro_export]
macro_rules! sink_error {
    ($sink:expr, $source:expr, $($arg:tt)*) => {
        $sink.log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
