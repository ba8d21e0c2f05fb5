//! 设备注册表
//!
//! 持有预留的设备号区间和 `设备号 → 设备` 映射。结构性修改
//! （attach / detach）由驱动在独占锁内进行；已打开的句柄直接持有设备的
//! 弱引用，I/O 不经过注册表。

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::device::Device;
use crate::devno::ChrdevRegion;
use crate::error::DevError;

/// 注册表
#[derive(Debug)]
pub struct Registry {
    /// 预留的设备号区间
    pub(crate) region: ChrdevRegion,
    /// 已注册的设备
    pub(crate) entries: BTreeMap<u64, Arc<Device>>,
    /// 已 attach 的设备数
    pub(crate) count: usize,
}

impl Registry {
    /// 预留 `capacity` 个设备号
    pub fn new(major: u32, base_minor: u32, capacity: usize) -> Self {
        Self {
            region: ChrdevRegion::new(major, base_minor, capacity),
            entries: BTreeMap::new(),
            count: 0,
        }
    }

    /// 已 attach 的设备数
    pub fn count(&self) -> usize {
        self.count
    }

    /// 区间容量
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// 查找设备
    pub fn get(&self, devno: u64) -> Option<&Arc<Device>> {
        self.entries.get(&devno)
    }

    /// 按平台 id 查找设备
    pub fn find_platform(&self, platform_id: u32) -> Option<&Arc<Device>> {
        self.entries.values().find(|d| d.platform_id() == platform_id)
    }

    /// 已注册的设备号（升序）
    pub fn identities(&self) -> Vec<u64> {
        self.entries.keys().copied().collect()
    }

    /// 节点名中的下标
    pub fn index_of(&self, devno: u64) -> Option<usize> {
        self.region.index_of(devno)
    }

    /// 移除设备并归还设备号，调用方负责撤销节点
    pub(crate) fn remove(&mut self, devno: u64) -> Result<Arc<Device>, DevError> {
        let device = self.entries.remove(&devno).ok_or(DevError::NotFound)?;
        self.count = self.count.saturating_sub(1);
        self.region.free(devno)?;
        Ok(device)
    }
}
