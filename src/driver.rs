//! 生命周期控制器
//!
//! [`PcdDriver`] 处理设备的 attach / detach：
//!
//! ```text
//! attach: 解析描述符 → 分配缓冲区 → 分配设备号 → 登记 → 发布节点 → 发布属性
//! detach: 撤销节点 → 计数减一 → 移出注册表 → 释放缓冲区
//! ```
//!
//! attach 的每一步资源都由一个守卫持有，任何一步失败时守卫按获取的逆序
//! 自动回滚；全部成功后逐个 `commit`。对注册表的结构修改在同一把写锁内完成。

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use lazy_static::lazy_static;
use spin::RwLock;

use crate::attr;
use crate::config::{DEVICE_NAME_PREFIX, MAX_DEVICES, PCD_BASE_MINOR, PCD_MAJOR, REGION_NAME};
use crate::descriptor::{DeviceAnnounce, Resolver, class_by_id};
use crate::device::{Device, DeviceRef, alloc_buffer};
use crate::devno::{ChrdevRegion, major, minor};
use crate::error::DevError;
use crate::node::{NodeHandle, NodePublisher};
use crate::registry::Registry;

/// 驱动运行时配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// 主设备号
    pub major: u32,
    /// 起始次设备号
    pub base_minor: u32,
    /// 最大设备数（预留的设备号数量）
    pub max_devices: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            major: PCD_MAJOR,
            base_minor: PCD_BASE_MINOR,
            max_devices: MAX_DEVICES,
        }
    }
}

/// 总线事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// 设备出现
    Announce(DeviceAnnounce),
    /// 设备消失
    Withdraw {
        /// 平台设备 id
        id: u32,
    },
}

/// 持有一个已分配的设备号，未提交时归还
struct IdentityGuard<'a> {
    region: &'a mut ChrdevRegion,
    devno: u64,
    index: usize,
}

impl<'a> IdentityGuard<'a> {
    fn alloc(region: &'a mut ChrdevRegion) -> Result<Self, DevError> {
        let (devno, index) = region.alloc()?;
        Ok(Self {
            region,
            devno,
            index,
        })
    }

    fn commit(self) {
        core::mem::forget(self);
    }
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.region.free(self.devno) {
            pr_err!(
                "[pcd] rollback: free {}:{} failed: {}",
                major(self.devno),
                minor(self.devno),
                e
            );
            return;
        }
        pr_warn!(
            "[pcd] rollback: released device number {}:{}",
            major(self.devno),
            minor(self.devno)
        );
    }
}

/// 持有注册表中的一项，未提交时移除并释放缓冲区
struct SlotGuard<'a> {
    entries: &'a mut BTreeMap<u64, Arc<Device>>,
    devno: u64,
}

impl<'a> SlotGuard<'a> {
    fn insert(
        entries: &'a mut BTreeMap<u64, Arc<Device>>,
        device: Arc<Device>,
    ) -> Self {
        let devno = device.devno();
        entries.insert(devno, device);
        Self { entries, devno }
    }

    fn commit(self) {
        core::mem::forget(self);
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if let Some(device) = self.entries.remove(&self.devno) {
            device.detach();
            pr_warn!("[pcd] rollback: {} unregistered, buffer freed", device.name());
        }
    }
}

/// 持有一个已发布的节点，未提交时撤销
struct NodeGuard<'a> {
    publisher: &'a dyn NodePublisher,
    handle: NodeHandle,
}

impl<'a> NodeGuard<'a> {
    fn publish(
        publisher: &'a dyn NodePublisher,
        device: &Arc<Device>,
    ) -> Result<Self, DevError> {
        let handle = publisher.publish_node(device.devno(), device.name(), DeviceRef::new(device))?;
        Ok(Self { publisher, handle })
    }

    fn commit(self) -> NodeHandle {
        let handle = self.handle;
        core::mem::forget(self);
        handle
    }
}

impl Drop for NodeGuard<'_> {
    fn drop(&mut self) {
        self.publisher.unpublish_node(self.handle);
        pr_warn!("[pcd] rollback: node {} withdrawn", self.handle.id());
    }
}

/// 伪字符设备驱动
pub struct PcdDriver {
    config: DriverConfig,
    resolver: Resolver,
    registry: RwLock<Registry>,
    publisher: Arc<dyn NodePublisher>,
}

impl PcdDriver {
    /// 以默认配置创建驱动
    pub fn new(publisher: Arc<dyn NodePublisher>) -> Self {
        Self::with_config(publisher, DriverConfig::default())
    }

    /// 以给定配置创建驱动，预留设备号区间
    pub fn with_config(publisher: Arc<dyn NodePublisher>, config: DriverConfig) -> Self {
        let registry = Registry::new(config.major, config.base_minor, config.max_devices);
        pr_info!(
            "[pcd] {}: device number <major>:<minor> = {}:{} ({} reserved)",
            REGION_NAME,
            config.major,
            config.base_minor,
            config.max_devices
        );
        Self {
            config,
            resolver: Resolver::default(),
            registry: RwLock::new(registry),
            publisher,
        }
    }

    /// 替换描述符解析器（例如使用自定义静态表）
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// 运行时配置
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// 已 attach 的设备数
    pub fn count(&self) -> usize {
        self.registry.read().count()
    }

    /// 已注册的设备号
    pub fn identities(&self) -> Vec<u64> {
        self.registry.read().identities()
    }

    /// 按设备号查找
    pub fn lookup(&self, devno: u64) -> Option<Arc<Device>> {
        self.registry.read().get(devno).cloned()
    }

    /// 按平台 id 查找
    pub fn lookup_platform(&self, platform_id: u32) -> Option<Arc<Device>> {
        self.registry.read().find_platform(platform_id).cloned()
    }

    /// 挂载一个设备，返回分配的设备号
    ///
    /// 任何一步失败都会完整回滚，注册表与节点命名空间保持原样。
    pub fn attach(&self, announce: &DeviceAnnounce) -> Result<u64, DevError> {
        let name = announce.name.as_str();
        dev_info!(name, "a device is detected (platform id {})", announce.id);

        let descriptor = self.resolver.resolve(announce).map_err(|kind| {
            dev_err!(name, "{}", kind);
            DevError::ConfigError(kind)
        })?;

        dev_info!(name, "device serial number = {}", descriptor.serial_number);
        dev_info!(name, "device size = {}", descriptor.size);
        dev_info!(name, "device permission = {:#x}", descriptor.permission.raw());
        if let Some(class) = class_by_id(descriptor.class_id) {
            dev_info!(name, "config item 1 = {}", class.config.config_item1);
            dev_info!(name, "config item 2 = {}", class.config.config_item2);
        }

        let buffer = alloc_buffer(descriptor.size as usize).inspect_err(|_| {
            dev_err!(name, "cannot allocate memory for device buffer");
        })?;

        let mut reg = self.registry.write();
        if reg.find_platform(announce.id).is_some() {
            dev_err!(name, "platform id {} is already attached", announce.id);
            return Err(DevError::AlreadyExists);
        }
        let Registry {
            region,
            entries,
            count,
        } = &mut *reg;

        let identity = IdentityGuard::alloc(region).inspect_err(|_| {
            dev_err!(name, "could not allocate device number");
        })?;
        let devno = identity.devno;
        let node_name = format!("{}-{}", DEVICE_NAME_PREFIX, identity.index);

        let device = Device::new(devno, announce.id, node_name, descriptor, buffer)?;
        let slot = SlotGuard::insert(entries, device.clone());

        let node = NodeGuard::publish(&*self.publisher, &device).inspect_err(|e| {
            dev_err!(name, "device create failed: {}", e);
        })?;
        self.publisher
            .publish_attributes(node.handle, &attr::attribute_infos())
            .inspect_err(|e| {
                dev_err!(name, "sysfs attribute creation failed: {}", e);
            })?;

        device.set_node(node.commit());
        slot.commit();
        identity.commit();
        *count += 1;

        dev_info!(
            name,
            "the probe was successful ({} as {}:{})",
            device.name(),
            major(devno),
            minor(devno)
        );
        Ok(devno)
    }

    /// 卸载设备号对应的设备
    pub fn detach(&self, devno: u64) -> Result<(), DevError> {
        let mut reg = self.registry.write();
        self.detach_locked(&mut reg, devno)
    }

    /// 卸载绑定到平台 id 的设备
    pub fn remove(&self, platform_id: u32) -> Result<(), DevError> {
        let mut reg = self.registry.write();
        let devno = reg
            .find_platform(platform_id)
            .map(|d| d.devno())
            .ok_or(DevError::NotFound)?;
        self.detach_locked(&mut reg, devno)
    }

    fn detach_locked(&self, reg: &mut Registry, devno: u64) -> Result<(), DevError> {
        let Some(device) = reg.get(devno).cloned() else {
            pr_warn!(
                "[pcd] detach: no device {}:{}",
                major(devno),
                minor(devno)
            );
            return Err(DevError::NotFound);
        };
        if let Some(node) = device.take_node() {
            self.publisher.unpublish_node(node);
        }
        reg.remove(devno)?;
        device.detach();
        dev_info!(device.name(), "a device is removed");
        Ok(())
    }

    /// 分发总线事件
    pub fn handle_event(&self, event: BusEvent) -> Result<(), DevError> {
        match event {
            BusEvent::Announce(announce) => self.attach(&announce).map(|_| ()),
            BusEvent::Withdraw { id } => self.remove(id),
        }
    }

    /// 卸载全部设备，可重复调用
    pub fn shutdown(&self) {
        let mut reg = self.registry.write();
        for devno in reg.identities() {
            if let Err(e) = self.detach_locked(&mut reg, devno) {
                pr_err!("[pcd] shutdown: detach {}:{} failed: {}", major(devno), minor(devno), e);
            }
        }
    }
}

impl Drop for PcdDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

lazy_static! {
    static ref PCD_DRIVER: RwLock<Option<Arc<PcdDriver>>> = RwLock::new(None);
}

/// 创建进程级驱动实例
pub fn init(publisher: Arc<dyn NodePublisher>) -> Result<Arc<PcdDriver>, DevError> {
    let mut slot = PCD_DRIVER.write();
    if slot.is_some() {
        return Err(DevError::AlreadyExists);
    }
    let driver = Arc::new(PcdDriver::new(publisher));
    *slot = Some(driver.clone());
    pr_info!("[pcd] pcd platform driver loaded");
    Ok(driver)
}

/// 当前的进程级驱动实例
pub fn get() -> Option<Arc<PcdDriver>> {
    PCD_DRIVER.read().clone()
}

/// 卸载全部设备并销毁进程级驱动实例
pub fn exit() -> Result<(), DevError> {
    let driver = PCD_DRIVER.write().take().ok_or(DevError::NotFound)?;
    driver.shutdown();
    pr_info!("[pcd] pcd platform driver unloaded");
    Ok(())
}
