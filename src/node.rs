//! 设备节点发布
//!
//! [`NodePublisher`] 是生命周期控制器调用的外部协作者接口：让设备以
//! 可寻址节点的形式出现，并挂上属性。[`DevClass`] 是一个内存实现，
//! 相当于 `/dev` 加 `/sys/class/pcd_class` 的合体，可以按节点名打开设备、
//! 读写属性。

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::RwLock;

use crate::attr::{self, AttrInfo};
use crate::config::CLASS_NAME;
use crate::device::DeviceRef;
use crate::error::DevError;
use crate::file::{AccessMode, PcdFile};

/// 已发布节点的不透明句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(u64);

impl NodeHandle {
    /// 由发布者分配的 id 构造
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// 句柄 id
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// 节点发布者
pub trait NodePublisher: Send + Sync {
    /// 发布设备节点
    fn publish_node(&self, devno: u64, name: &str, device: DeviceRef)
    -> Result<NodeHandle, DevError>;

    /// 撤销设备节点，未知句柄忽略
    fn unpublish_node(&self, node: NodeHandle);

    /// 在节点上发布属性
    fn publish_attributes(&self, node: NodeHandle, attrs: &[AttrInfo]) -> Result<(), DevError>;
}

struct ClassNode {
    handle: NodeHandle,
    devno: u64,
    device: DeviceRef,
    attrs: Vec<AttrInfo>,
}

/// 设备类命名空间
pub struct DevClass {
    name: &'static str,
    next_id: AtomicU64,
    nodes: RwLock<BTreeMap<String, ClassNode>>,
}

impl Default for DevClass {
    fn default() -> Self {
        Self::new(CLASS_NAME)
    }
}

impl DevClass {
    /// 创建空的设备类
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(1),
            nodes: RwLock::new(BTreeMap::new()),
        }
    }

    /// 类名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 所有节点名（有序）
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.read().keys().cloned().collect()
    }

    /// 节点是否存在
    pub fn contains(&self, node: &str) -> bool {
        self.nodes.read().contains_key(node)
    }

    /// 节点对应的设备号
    pub fn devno_of(&self, node: &str) -> Option<u64> {
        self.nodes.read().get(node).map(|n| n.devno)
    }

    /// 节点上已发布的属性
    pub fn attributes_of(&self, node: &str) -> Option<Vec<AttrInfo>> {
        self.nodes.read().get(node).map(|n| n.attrs.clone())
    }

    /// 打开节点
    pub fn open(&self, node: &str, mode: AccessMode) -> Result<PcdFile, DevError> {
        let device = self.device_of(node)?.upgrade()?;
        device.open(mode)
    }

    /// 读属性，返回 sysfs 文本
    pub fn read_attr(&self, node: &str, name: &str) -> Result<String, DevError> {
        let (device, info) = self.lookup_attr(node, name)?;
        if !info.readable() {
            return Err(DevError::PermissionDenied);
        }
        let device = device.upgrade()?;
        attr::show(&device, name)
    }

    /// 写属性
    pub fn write_attr(&self, node: &str, name: &str, value: &str) -> Result<(), DevError> {
        let (device, info) = self.lookup_attr(node, name)?;
        if !info.writable() {
            return Err(DevError::PermissionDenied);
        }
        let device = device.upgrade()?;
        attr::store(&device, name, value)
    }

    fn device_of(&self, node: &str) -> Result<DeviceRef, DevError> {
        self.nodes
            .read()
            .get(node)
            .map(|n| n.device.clone())
            .ok_or(DevError::NotFound)
    }

    fn lookup_attr(&self, node: &str, name: &str) -> Result<(DeviceRef, AttrInfo), DevError> {
        let canonical = attr::find(name).ok_or(DevError::NotFound)?.info.name;
        let nodes = self.nodes.read();
        let entry = nodes.get(node).ok_or(DevError::NotFound)?;
        let info = entry
            .attrs
            .iter()
            .find(|a| a.name == canonical)
            .copied()
            .ok_or(DevError::NotFound)?;
        Ok((entry.device.clone(), info))
    }
}

impl NodePublisher for DevClass {
    fn publish_node(
        &self,
        devno: u64,
        name: &str,
        device: DeviceRef,
    ) -> Result<NodeHandle, DevError> {
        let mut nodes = self.nodes.write();
        if nodes.contains_key(name) {
            return Err(DevError::AlreadyExists);
        }
        let handle = NodeHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        nodes.insert(
            name.to_string(),
            ClassNode {
                handle,
                devno,
                device,
                attrs: Vec::new(),
            },
        );
        pr_debug!("[{}] node {} published", self.name, name);
        Ok(handle)
    }

    fn unpublish_node(&self, node: NodeHandle) {
        self.nodes.write().retain(|name, n| {
            let keep = n.handle != node;
            if !keep {
                pr_debug!("[{}] node {} withdrawn", self.name, name);
            }
            keep
        });
    }

    fn publish_attributes(&self, node: NodeHandle, attrs: &[AttrInfo]) -> Result<(), DevError> {
        let mut nodes = self.nodes.write();
        let entry = nodes
            .values_mut()
            .find(|n| n.handle == node)
            .ok_or(DevError::NotFound)?;
        for info in attrs {
            if !entry.attrs.iter().any(|a| a.name == info.name) {
                entry.attrs.push(*info);
            }
        }
        Ok(())
    }
}
