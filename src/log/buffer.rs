//! 日志环形缓冲区
//!
//! 保留最新的 [`LOG_BUFFER_ENTRIES`] 条记录，满了以后覆盖最旧的一条并计入丢弃数。

use alloc::collections::VecDeque;
use spin::Mutex;

use super::config::LOG_BUFFER_ENTRIES;
use super::entry::LogEntry;

/// 固定容量的日志缓冲区
pub(super) struct LogBuffer {
    inner: Mutex<Ring>,
}

struct Ring {
    entries: VecDeque<LogEntry>,
    dropped: usize,
}

impl LogBuffer {
    /// 在编译期构造空缓冲区（存储在首次写入时才分配）
    pub(super) const fn new() -> Self {
        Self {
            inner: Mutex::new(Ring {
                entries: VecDeque::new(),
                dropped: 0,
            }),
        }
    }

    /// 追加一条记录，缓冲区满时丢弃最旧的记录
    pub(super) fn write(&self, entry: LogEntry) {
        let mut ring = self.inner.lock();
        if ring.entries.len() == LOG_BUFFER_ENTRIES {
            ring.entries.pop_front();
            ring.dropped += 1;
        }
        ring.entries.push_back(entry);
    }

    /// 取出最旧的一条记录
    pub(super) fn read(&self) -> Option<LogEntry> {
        self.inner.lock().entries.pop_front()
    }

    /// 未读记录数
    pub(super) fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// 因溢出被覆盖的记录总数
    pub(super) fn dropped_count(&self) -> usize {
        self.inner.lock().dropped
    }
}
