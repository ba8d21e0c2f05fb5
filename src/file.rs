//! 打开句柄
//!
//! [`PcdFile`] 是一次 `open` 得到的会话：保存访问模式和读写游标，
//! 通过 [`DeviceRef`] 弱引用找到所属设备。设备被移除后，句柄上的
//! 每个操作都返回 `Gone`，而不会触碰已释放的缓冲区。

use bitflags::bitflags;
use spin::Mutex;

use crate::device::DeviceRef;
use crate::error::DevError;

bitflags! {
    /// 打开时请求的访问模式
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessMode: u32 {
        /// 请求读
        const READ = 0x1;
        /// 请求写
        const WRITE = 0x2;
    }
}

impl AccessMode {
    /// 是否请求了读
    pub fn readable(&self) -> bool {
        self.contains(AccessMode::READ)
    }

    /// 是否请求了写
    pub fn writable(&self) -> bool {
        self.contains(AccessMode::WRITE)
    }
}

/// lseek 的基准位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SeekWhence {
    /// 从缓冲区开头计算
    Set = 0,
    /// 从当前位置计算
    Cur = 1,
    /// 从缓冲区末尾计算
    End = 2,
}

/// 设备文件句柄
///
/// # 并发安全
///
/// 游标用 `Mutex` 保护，句柄可以在线程间共享；
/// 游标的边界检查在设备锁内完成，与 resize 互斥。
#[derive(Debug)]
pub struct PcdFile {
    device: DeviceRef,
    mode: AccessMode,
    cursor: Mutex<u64>,
}

impl PcdFile {
    pub(crate) fn new(device: DeviceRef, mode: AccessMode) -> Self {
        Self {
            device,
            mode,
            cursor: Mutex::new(0),
        }
    }

    /// 打开时的访问模式
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// 所属设备的弱引用
    pub fn device(&self) -> &DeviceRef {
        &self.device
    }

    /// 从当前位置读取，读到末尾时截断，不回绕
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, DevError> {
        if !self.mode.readable() {
            return Err(DevError::PermissionDenied);
        }
        let device = self.device.upgrade()?;
        let mut cursor = self.cursor.lock();
        device.read(&mut cursor, buf)
    }

    /// 从当前位置写入，剩余空间为 0 时返回 `OutOfSpace`
    pub fn write(&self, buf: &[u8]) -> Result<usize, DevError> {
        if !self.mode.writable() {
            return Err(DevError::PermissionDenied);
        }
        let device = self.device.upgrade()?;
        let mut cursor = self.cursor.lock();
        device.write(&mut cursor, buf)
    }

    /// 移动游标，目标必须落在 `[0, size]` 内
    pub fn lseek(&self, offset: i64, whence: SeekWhence) -> Result<u64, DevError> {
        let device = self.device.upgrade()?;
        let mut cursor = self.cursor.lock();
        device.seek(&mut cursor, offset, whence)
    }

    /// 当前游标
    ///
    /// 缓冲区被缩小后，返回值会被限制在新的大小以内。
    pub fn offset(&self) -> u64 {
        let cursor = *self.cursor.lock();
        match self.device.upgrade() {
            Ok(device) => cursor.min(device.size() as u64),
            Err(_) => cursor,
        }
    }

    /// 关闭句柄，对缓冲区没有影响
    pub fn release(self) {
        pr_debug!("[pcd] release was successful");
    }
}
