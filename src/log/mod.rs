//! Kernel-style logging
//!
//! `pr_*` macros format into fixed-size [`LogEntry`] records. A global level
//! decides what is buffered; a console level decides what is forwarded to the
//! installed [`LogSink`]. Logging never fails and never changes control flow.

mod buffer;
pub mod config;
mod entry;
mod level;
mod log_core;
#[macro_use]
pub mod macros;

#[cfg(test)]
mod tests;

pub use entry::LogEntry;
pub use level::LogLevel;
pub use log_core::LogCore;

use alloc::sync::Arc;

/// Destination for console-level log entries
pub trait LogSink: Send + Sync {
    /// Receives one formatted entry
    fn write_entry(&self, entry: &LogEntry);
}

static GLOBAL_LOG: LogCore = LogCore::default();

#[doc(hidden)]
pub fn log_impl(level: LogLevel, args: core::fmt::Arguments) {
    GLOBAL_LOG._log(level, args);
}

#[doc(hidden)]
#[inline(always)]
pub fn is_level_enabled(level: LogLevel) -> bool {
    GLOBAL_LOG.is_level_enabled(level)
}

/// Installs the console sink for the global logger
pub fn set_sink(sink: Arc<dyn LogSink>) {
    GLOBAL_LOG._set_sink(Some(sink));
}

/// Removes the console sink from the global logger
pub fn clear_sink() {
    GLOBAL_LOG._set_sink(None);
}

/// Sets the global log level threshold
pub fn set_global_level(level: LogLevel) {
    GLOBAL_LOG._set_global_level(level);
}

/// Gets the current global log level
pub fn get_global_level() -> LogLevel {
    GLOBAL_LOG._get_global_level()
}

/// Sets the console output level threshold
pub fn set_console_level(level: LogLevel) {
    GLOBAL_LOG._set_console_level(level);
}

/// Gets the current console output level
pub fn get_console_level() -> LogLevel {
    GLOBAL_LOG._get_console_level()
}

/// Reads the oldest entry from the global buffer
pub fn read_log() -> Option<LogEntry> {
    GLOBAL_LOG._read_log()
}

/// Returns the number of unread entries in the global buffer
pub fn log_len() -> usize {
    GLOBAL_LOG._log_len()
}

/// Returns the count of global entries dropped due to overflow
pub fn log_dropped_count() -> usize {
    GLOBAL_LOG._log_dropped_count()
}
