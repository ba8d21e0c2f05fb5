//! Log system core implementation
//!
//! This module encapsulates all logging state and logic into a single
//! `LogCore` struct that can be instantiated independently for testing.

use super::LogSink;
use super::buffer::LogBuffer;
use super::config::{DEFAULT_CONSOLE_LEVEL, DEFAULT_LOG_LEVEL};
use super::entry::LogEntry;
use super::level::LogLevel;
use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use spin::RwLock;

/// Core logging system
///
/// Owns the ring buffer, the two filter thresholds and the optional sink
/// that receives entries at or above the console level.
pub struct LogCore {
    /// Ring buffer for log storage
    buffer: LogBuffer,

    /// Sequence counter handed to each new entry
    next_seq: AtomicUsize,

    /// Global log level threshold (controls buffering)
    global_level: AtomicU8,

    /// Console output level threshold (controls immediate forwarding)
    console_level: AtomicU8,

    /// Destination for console-level entries
    sink: RwLock<Option<Arc<dyn LogSink>>>,
}

impl LogCore {
    /// Creates a new LogCore instance with default log levels
    ///
    /// This is a `const fn`, so the global instance needs no lazy init.
    pub const fn default() -> Self {
        Self {
            buffer: LogBuffer::new(),
            next_seq: AtomicUsize::new(1),
            global_level: AtomicU8::new(DEFAULT_LOG_LEVEL as u8),
            console_level: AtomicU8::new(DEFAULT_CONSOLE_LEVEL as u8),
            sink: RwLock::new(None),
        }
    }

    /// Creates a new LogCore instance with custom log levels
    ///
    /// # Parameters
    ///
    /// * `global_level` - Minimum level for logs to be buffered
    /// * `console_level` - Minimum level for logs to be forwarded to the sink
    pub fn new(global_level: LogLevel, console_level: LogLevel) -> Self {
        let core = Self::default();
        core._set_global_level(global_level);
        core._set_console_level(console_level);
        core
    }

    /// Core logging implementation
    ///
    /// 1. Early return if filtered by the global level
    /// 2. Format into a fixed-size entry
    /// 3. Forward to the sink if the console level allows it
    /// 4. Store in the ring buffer
    pub fn _log(&self, level: LogLevel, args: fmt::Arguments) {
        if !self.is_level_enabled(level) {
            return;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = LogEntry::from_args(level, seq, args);

        if self.is_console_level(level) {
            if let Some(sink) = self.sink.read().as_ref() {
                sink.write_entry(&entry);
            }
        }

        self.buffer.write(entry);
    }

    /// Reads the oldest buffered entry
    pub fn _read_log(&self) -> Option<LogEntry> {
        self.buffer.read()
    }

    /// Returns the number of unread log entries
    pub fn _log_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the count of logs dropped due to buffer overflow
    pub fn _log_dropped_count(&self) -> usize {
        self.buffer.dropped_count()
    }

    /// Installs (or removes, with `None`) the console sink
    pub fn _set_sink(&self, sink: Option<Arc<dyn LogSink>>) {
        *self.sink.write() = sink;
    }

    /// Sets the global log level threshold
    pub fn _set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Release);
    }

    /// Gets the current global log level
    pub fn _get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Acquire))
    }

    /// Sets the console output level threshold
    pub fn _set_console_level(&self, level: LogLevel) {
        self.console_level.store(level as u8, Ordering::Release);
    }

    /// Gets the current console output level
    pub fn _get_console_level(&self) -> LogLevel {
        LogLevel::from_u8(self.console_level.load(Ordering::Acquire))
    }

    /// Checks if a log level is enabled (global filter)
    #[inline(always)]
    pub fn is_level_enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.global_level.load(Ordering::Acquire)
    }

    #[inline(always)]
    fn is_console_level(&self, level: LogLevel) -> bool {
        level as u8 <= self.console_level.load(Ordering::Acquire)
    }
}
