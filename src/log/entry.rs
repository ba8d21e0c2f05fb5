use super::config::MAX_LOG_MESSAGE_LENGTH;
use super::level::LogLevel;
use core::fmt::{self, Write};

/// 一条日志记录
///
/// 消息保存在定长数组里，超长部分在字符边界处截断。
#[derive(Debug, Clone)]
pub struct LogEntry {
    seq: usize,
    level: LogLevel,
    length: usize,
    message: [u8; MAX_LOG_MESSAGE_LENGTH],
}

impl LogEntry {
    /// 由格式化参数构造日志记录
    pub fn from_args(level: LogLevel, seq: usize, args: fmt::Arguments) -> Self {
        let mut entry = Self {
            seq,
            level,
            length: 0,
            message: [0; MAX_LOG_MESSAGE_LENGTH],
        };

        let mut writer = MessageWriter::new(&mut entry.message);
        let _ = fmt::write(&mut writer, args);
        entry.length = writer.len();

        entry
    }

    /// 消息正文
    pub fn message(&self) -> &str {
        // MessageWriter 只在字符边界处截断
        core::str::from_utf8(&self.message[..self.length]).unwrap_or("")
    }

    /// 日志级别
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// 写入序号（从 1 开始单调递增）
    pub fn seq(&self) -> usize {
        self.seq
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:8}] {} {}", self.seq, self.level.as_str(), self.message())
    }
}

/// a helper to write message from args to [u8; MAX_LOG_MESSAGE_LENGTH]
struct MessageWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> MessageWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    fn len(&self) -> usize {
        self.pos
    }
}

impl Write for MessageWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = self.buffer.len() - self.pos;
        let mut to_copy = s.len().min(remaining);
        while !s.is_char_boundary(to_copy) {
            to_copy -= 1;
        }

        self.buffer[self.pos..self.pos + to_copy].copy_from_slice(&s.as_bytes()[..to_copy]);
        self.pos += to_copy;
        Ok(())
    }
}
