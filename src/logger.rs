//! Two-channel logger used by the resolver
//!
//! - flash: short user-facing messages (shown to whoever triggered the load)
//! - system: the audit log, with a structured context
//!
//! `TracingLogger` routes both channels through `tracing`;
//! `RecordingLogger` keeps records in memory for tests.

use std::sync::{Mutex, PoisonError};

use tracing::{error, info};

/// Tracing target for the user-facing channel
pub const FLASH_TARGET: &str = "extconf::flash";

/// Tracing target for the system channel
pub const SYSTEM_TARGET: &str = "extconf::system";

/// Structured context attached to a system log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    /// Event name (`exception`, `extensions`)
    pub event: &'static str,
    /// Rendered error, when the entry reports one
    pub exception: Option<String>,
}

impl LogContext {
    /// Context with only an event name
    pub fn event(event: &'static str) -> Self {
        Self {
            event,
            exception: None,
        }
    }

    /// Context reporting an error
    pub fn exception(error: &dyn std::error::Error) -> Self {
        Self {
            event: "exception",
            exception: Some(format!("{:?}", error)),
        }
    }
}

/// Logger with a flash channel and a system channel
pub trait ConfigLogger: Send + Sync {
    fn flash_error(&self, message: &str);

    fn system_error(&self, message: &str, context: &LogContext);

    fn system_info(&self, message: &str, context: &LogContext);
}

/// Logger that emits through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ConfigLogger for TracingLogger {
    fn flash_error(&self, message: &str) {
        error!(target: FLASH_TARGET, "{}", message);
    }

    fn system_error(&self, message: &str, context: &LogContext) {
        error!(
            target: SYSTEM_TARGET,
            event = context.event,
            exception = context.exception.as_deref().unwrap_or(""),
            "{}",
            message
        );
    }

    fn system_info(&self, message: &str, context: &LogContext) {
        info!(target: SYSTEM_TARGET, event = context.event, "{}", message);
    }
}

/// Channel a record was written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Flash,
    System,
}

/// Severity of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// A captured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub channel: Channel,
    pub level: Level,
    pub message: String,
    pub context: Option<LogContext>,
}

/// Logger that keeps every record in memory
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records written to one channel
    pub fn on(&self, channel: Channel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.channel == channel)
            .collect()
    }

    fn push(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl ConfigLogger for RecordingLogger {
    fn flash_error(&self, message: &str) {
        self.push(LogRecord {
            channel: Channel::Flash,
            level: Level::Error,
            message: message.to_string(),
            context: None,
        });
    }

    fn system_error(&self, message: &str, context: &LogContext) {
        self.push(LogRecord {
            channel: Channel::System,
            level: Level::Error,
            message: message.to_string(),
            context: Some(context.clone()),
        });
    }

    fn system_info(&self, message: &str, context: &LogContext) {
        self.push(LogRecord {
            channel: Channel::System,
            level: Level::Info,
            message: message.to_string(),
            context: Some(context.clone()),
        });
    }
}
