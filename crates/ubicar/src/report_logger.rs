//! Report logger for locator resolution.
//!
//! Records log entries for attachment to a test report while also emitting
//! them through `tracing`. All child loggers created from one root share the
//! same level and entry buffer, so raising the level to debug on any handle
//! (for example during a test retry) enables nested-locator evaluation
//! records everywhere at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Log verbosity levels, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic detail, including per-step nested-locator evaluation
    Debug,
    /// Normal progress
    Info,
    /// Recoverable problems
    Warn,
    /// Contract violations, logged before being raised
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// One recorded log statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the statement was recorded
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub level: LogLevel,
    /// Context chain of the logger that recorded it (`root -> child -> ...`)
    pub prefix: String,
    /// The message body
    pub message: String,
}

#[derive(Debug)]
struct Shared {
    current: LogLevel,
    initial: LogLevel,
    entries: Vec<LogEntry>,
}

/// A context-chained logger whose level and entry buffer are shared with
/// every child cloned off the same root.
#[derive(Debug, Clone)]
pub struct ReportLogger {
    shared: Arc<Mutex<Shared>>,
    context: String,
}

impl ReportLogger {
    /// Create a root logger with the given level and context name.
    #[must_use]
    pub fn new(level: LogLevel, context: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                current: level,
                initial: level,
                entries: Vec::new(),
            })),
            context: context.into(),
        }
    }

    /// Create a child logger with an extended context chain. Level and
    /// entries stay shared with the parent: changing the level on one
    /// changes it for all.
    #[must_use]
    pub fn child(&self, prefix: &str) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            context: format!("{} -> {prefix}", self.context),
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        match level {
            LogLevel::Debug => tracing::debug!(context = %self.context, "{message}"),
            LogLevel::Info => tracing::info!(context = %self.context, "{message}"),
            LogLevel::Warn => tracing::warn!(context = %self.context, "{message}"),
            LogLevel::Error => tracing::error!(context = %self.context, "{message}"),
        }
        if let Ok(mut shared) = self.shared.lock() {
            shared.entries.push(LogEntry {
                timestamp: Utc::now(),
                level,
                prefix: self.context.clone(),
                message: message.to_string(),
            });
        }
    }

    /// Record a debug-level message
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Record an info-level message
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Record a warn-level message
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Record an error-level message
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Change the shared level at runtime.
    pub fn set_level(&self, level: LogLevel) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.current = level;
        }
    }

    /// The current shared level.
    #[must_use]
    pub fn current_level(&self) -> LogLevel {
        self.shared.lock().map_or(LogLevel::Info, |s| s.current)
    }

    /// Restore the level the root logger was created with.
    pub fn reset_level(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.current = shared.initial;
        }
    }

    /// True if statements at `level` would be recorded.
    #[must_use]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.current_level()
    }

    /// All recorded entries, chronologically sorted.
    #[must_use]
    pub fn export(&self) -> Vec<LogEntry> {
        let mut entries = self
            .shared
            .lock()
            .map_or_else(|_| Vec::new(), |s| s.entries.clone());
        entries.sort_by_key(|e| e.timestamp);
        entries
    }

    /// A formatted, report-ready rendering of every recorded entry.
    #[must_use]
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        for entry in self.export() {
            out.push_str(&format!(
                "{} - {} : [{}]\n{}\n",
                entry.timestamp.format("%H:%M:%S %d.%m.%Y"),
                entry.level,
                entry.prefix,
                entry.message
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_shares_level_with_parent() {
        let root = ReportLogger::new(LogLevel::Info, "TestCase");
        let child = root.child("GetBy");

        assert!(!child.is_enabled(LogLevel::Debug));
        child.set_level(LogLevel::Debug);
        assert!(root.is_enabled(LogLevel::Debug));

        root.reset_level();
        assert_eq!(child.current_level(), LogLevel::Info);
    }

    #[test]
    fn test_entries_are_shared_and_context_chained() {
        let root = ReportLogger::new(LogLevel::Debug, "TestCase");
        let child = root.child("Builder");

        root.info("starting");
        child.debug("step one");

        let entries = root.export();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].prefix, "TestCase");
        assert_eq!(entries[1].prefix, "TestCase -> Builder");
    }

    #[test]
    fn test_level_gating_drops_entries() {
        let log = ReportLogger::new(LogLevel::Warn, "quiet");
        log.debug("hidden");
        log.info("hidden");
        log.error("kept");
        assert_eq!(log.export().len(), 1);
    }

    #[test]
    fn test_render_report_contains_level_and_prefix() {
        let log = ReportLogger::new(LogLevel::Info, "Report");
        log.warn("watch out");
        let rendered = log.render_report();
        assert!(rendered.contains("WARN"));
        assert!(rendered.contains("[Report]"));
        assert!(rendered.contains("watch out"));
    }
}
