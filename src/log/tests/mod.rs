use super::LogSink;
use super::entry::LogEntry;
use super::level::LogLevel;
use super::log_core::LogCore;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

/// 测试专用日志宏，操作独立的 LogCore 实例
macro_rules! test_log {
    ($logger:expr, $level:expr, $($arg:tt)*) => {
        $logger._log($level, format_args!($($arg)*))
    };
}

/// 记录所有转发过来的消息
#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl LogSink for RecordingSink {
    fn write_entry(&self, entry: &LogEntry) {
        self.lines.lock().push(entry.message().to_string());
    }
}

mod basic;
