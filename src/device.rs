//! 设备运行时状态
//!
//! 每个 [`Device`] 独占自己的缓冲区。`{descriptor, buffer}` 放在同一把
//! 读写锁里：
//! - 读操作持共享锁
//! - 写操作、resize、detach 持独占锁
//!
//! 因此任何时刻从外部看 `buffer.len() == descriptor.size`。
//! 打开句柄只持有 [`DeviceRef`]（弱引用），每次操作前在锁内检查
//! `attached`，设备移除后返回 `Gone`。

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use spin::{Mutex, RwLock};

use crate::descriptor::{ClassConfig, ClassId, DeviceDescriptor, Permission, class_by_id};
use crate::devno::{major, minor};
use crate::error::DevError;
use crate::file::{AccessMode, PcdFile, SeekWhence};
use crate::node::NodeHandle;

/// 分配一块清零的缓冲区，失败时返回 `OutOfMemory`
pub fn alloc_buffer(len: usize) -> Result<Vec<u8>, DevError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| DevError::OutOfMemory)?;
    buffer.resize(len, 0);
    Ok(buffer)
}

struct DeviceState {
    descriptor: DeviceDescriptor,
    buffer: Vec<u8>,
}

/// 一个已 attach 的伪字符设备
pub struct Device {
    devno: u64,
    platform_id: u32,
    name: String,
    state: RwLock<DeviceState>,
    attached: AtomicBool,
    node: Mutex<Option<NodeHandle>>,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("devno", &format_args!("{}:{}", major(self.devno), minor(self.devno)))
            .field("platform_id", &self.platform_id)
            .field("name", &self.name)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Device {
    /// 创建设备，`buffer` 的长度必须等于 `descriptor.size`
    pub fn new(
        devno: u64,
        platform_id: u32,
        name: String,
        descriptor: DeviceDescriptor,
        buffer: Vec<u8>,
    ) -> Result<Arc<Self>, DevError> {
        if buffer.len() != descriptor.size as usize {
            return Err(DevError::InvalidArgument);
        }
        Ok(Arc::new(Self {
            devno,
            platform_id,
            name,
            state: RwLock::new(DeviceState { descriptor, buffer }),
            attached: AtomicBool::new(true),
            node: Mutex::new(None),
        }))
    }

    /// 设备号
    pub fn devno(&self) -> u64 {
        self.devno
    }

    /// 绑定的平台设备 id
    pub fn platform_id(&self) -> u32 {
        self.platform_id
    }

    /// 节点名（`pcdev-<index>`）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 是否仍处于 attach 状态
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// 当前缓冲区大小
    pub fn size(&self) -> u32 {
        self.state.read().descriptor.size
    }

    /// 序列号
    pub fn serial_number(&self) -> String {
        self.state.read().descriptor.serial_number.clone()
    }

    /// 访问权限
    pub fn permission(&self) -> Permission {
        self.state.read().descriptor.permission
    }

    /// 设备类
    pub fn class_id(&self) -> ClassId {
        self.state.read().descriptor.class_id
    }

    /// 设备类的配置预设
    pub fn class_config(&self) -> Option<ClassConfig> {
        class_by_id(self.class_id()).map(|c| c.config)
    }

    /// 在同一把锁下读取 `(descriptor.size, buffer.len())`
    pub fn geometry(&self) -> (u32, usize) {
        let state = self.state.read();
        (state.descriptor.size, state.buffer.len())
    }

    /// 已发布的节点
    pub fn node(&self) -> Option<NodeHandle> {
        *self.node.lock()
    }

    pub(crate) fn set_node(&self, node: NodeHandle) {
        *self.node.lock() = Some(node);
    }

    pub(crate) fn take_node(&self) -> Option<NodeHandle> {
        self.node.lock().take()
    }

    /// 以给定模式打开设备
    pub fn open(self: &Arc<Self>, mode: AccessMode) -> Result<PcdFile, DevError> {
        let state = self.state.read();
        if !self.is_attached() {
            return Err(DevError::Gone);
        }
        pr_debug!(
            "[pcd] minor access = {}",
            minor(self.devno)
        );
        if !state.descriptor.permission.permits(mode) {
            pr_debug!("[pcd] open was unsuccessful");
            return Err(DevError::PermissionDenied);
        }
        pr_debug!("[pcd] open was successful");
        Ok(PcdFile::new(DeviceRef::new(self), mode))
    }

    pub(crate) fn read(&self, cursor: &mut u64, buf: &mut [u8]) -> Result<usize, DevError> {
        let state = self.state.read();
        if !self.is_attached() {
            return Err(DevError::Gone);
        }
        let size = state.buffer.len() as u64;
        let pos = (*cursor).min(size);
        pr_debug!("[pcd] {} byte(s) read requested", buf.len());
        pr_debug!("[pcd] current file position = {}", pos);

        let count = (buf.len() as u64).min(size - pos) as usize;
        let start = pos as usize;
        buf[..count].copy_from_slice(&state.buffer[start..start + count]);
        *cursor = pos + count as u64;

        pr_debug!("[pcd] number of bytes successfully read = {}", count);
        pr_debug!("[pcd] updated file position = {}", *cursor);
        Ok(count)
    }

    pub(crate) fn write(&self, cursor: &mut u64, buf: &[u8]) -> Result<usize, DevError> {
        let mut state = self.state.write();
        if !self.is_attached() {
            return Err(DevError::Gone);
        }
        let size = state.buffer.len() as u64;
        let pos = (*cursor).min(size);
        pr_debug!("[pcd] {} byte(s) write requested", buf.len());
        pr_debug!("[pcd] current file position = {}", pos);

        let count = (buf.len() as u64).min(size - pos) as usize;
        if count == 0 {
            *cursor = pos;
            pr_err!("[pcd] no space left on the device");
            return Err(DevError::OutOfSpace);
        }
        let start = pos as usize;
        state.buffer[start..start + count].copy_from_slice(&buf[..count]);
        *cursor = pos + count as u64;

        pr_debug!("[pcd] number of bytes successfully written = {}", count);
        pr_debug!("[pcd] updated file position = {}", *cursor);
        Ok(count)
    }

    pub(crate) fn seek(
        &self,
        cursor: &mut u64,
        offset: i64,
        whence: SeekWhence,
    ) -> Result<u64, DevError> {
        let state = self.state.read();
        if !self.is_attached() {
            return Err(DevError::Gone);
        }
        let size = state.buffer.len() as i64;
        let current = (*cursor).min(size as u64) as i64;
        pr_debug!("[pcd] lseek requested");
        pr_debug!("[pcd] current file position = {}", current);

        let target = match whence {
            SeekWhence::Set => Some(offset),
            SeekWhence::Cur => current.checked_add(offset),
            SeekWhence::End => size.checked_add(offset),
        };
        let target = match target {
            Some(t) if (0..=size).contains(&t) => t as u64,
            _ => return Err(DevError::InvalidSeek),
        };
        *cursor = target;

        pr_debug!("[pcd] updated file position = {}", target);
        Ok(target)
    }

    /// 调整缓冲区大小
    ///
    /// 保留 `[0, min(old, new))` 的内容，扩大部分清零。大小与缓冲区在
    /// 同一次独占加锁内更新；分配失败时状态不变。
    pub fn resize(&self, new_size: u32) -> Result<(), DevError> {
        if new_size == 0 {
            return Err(DevError::InvalidArgument);
        }
        let mut state = self.state.write();
        if !self.is_attached() {
            return Err(DevError::Gone);
        }
        let new_len = new_size as usize;
        let old_len = state.buffer.len();
        if new_len > old_len {
            state
                .buffer
                .try_reserve_exact(new_len - old_len)
                .map_err(|_| DevError::OutOfMemory)?;
            state.buffer.resize(new_len, 0);
        } else {
            state.buffer.truncate(new_len);
            state.buffer.shrink_to_fit();
        }
        state.descriptor.size = new_size;
        dev_info!(self.name, "buffer resized {} -> {} bytes", old_len, new_len);
        Ok(())
    }

    /// 标记为已移除并释放缓冲区
    ///
    /// 与所有 I/O 互斥；之后经 [`DeviceRef`] 到达的操作返回 `Gone`。
    pub(crate) fn detach(&self) {
        let mut state = self.state.write();
        self.attached.store(false, Ordering::Release);
        state.buffer = Vec::new();
    }
}

/// 设备的弱引用
///
/// 不延长设备生命周期；`upgrade` 在设备已被移除时返回 `Gone`。
#[derive(Debug, Clone)]
pub struct DeviceRef(Weak<Device>);

impl DeviceRef {
    /// 从强引用构造
    pub fn new(device: &Arc<Device>) -> Self {
        Self(Arc::downgrade(device))
    }

    /// 获取仍处于 attach 状态的设备
    pub fn upgrade(&self) -> Result<Arc<Device>, DevError> {
        let device = self.0.upgrade().ok_or(DevError::Gone)?;
        if !device.is_attached() {
            return Err(DevError::Gone);
        }
        Ok(device)
    }
}
