//! 跨模块场景测试

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;
use std::vec::Vec;

use crate::attr::AttrInfo;
use crate::config::dt_prop;
use crate::descriptor::{DeviceAnnounce, DynamicDescriptor};
use crate::device::DeviceRef;
use crate::error::DevError;
use crate::node::{DevClass, NodeHandle, NodePublisher};
use crate::PcdDriver;

mod seek;

/// 带三项属性的设备树描述
fn dt_announce(id: u32, compat: &str, serial: &str, size: u32, raw_perm: u32) -> DeviceAnnounce {
    let desc = DynamicDescriptor::new(compat)
        .with_string(dt_prop::SERIAL_NUMBER, serial)
        .with_u32(dt_prop::SIZE, size)
        .with_u32(dt_prop::PERM, raw_perm);
    DeviceAnnounce::from_dynamic(id, "pcdev-dt", desc)
}

fn new_driver() -> (Arc<DevClass>, PcdDriver) {
    let class = Arc::new(DevClass::default());
    let driver = PcdDriver::new(class.clone());
    (class, driver)
}

/// 在指定步骤失败的节点发布者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailAt {
    Nothing,
    PublishNode,
    PublishAttributes,
}

/// 包一层 DevClass，按需注入失败并记录撤销次数
struct FlakyPublisher {
    inner: DevClass,
    fail_at: Mutex<FailAt>,
    unpublished: AtomicUsize,
    published: Mutex<Vec<NodeHandle>>,
}

impl FlakyPublisher {
    fn new(fail_at: FailAt) -> Arc<Self> {
        Arc::new(Self {
            inner: DevClass::default(),
            fail_at: Mutex::new(fail_at),
            unpublished: AtomicUsize::new(0),
            published: Mutex::new(Vec::new()),
        })
    }

    fn set_fail_at(&self, fail_at: FailAt) {
        *self.fail_at.lock() = fail_at;
    }

    fn published(&self) -> usize {
        self.published.lock().len()
    }

    fn unpublished(&self) -> usize {
        self.unpublished.load(Ordering::SeqCst)
    }
}

impl NodePublisher for FlakyPublisher {
    fn publish_node(
        &self,
        devno: u64,
        name: &str,
        device: DeviceRef,
    ) -> Result<NodeHandle, DevError> {
        if *self.fail_at.lock() == FailAt::PublishNode {
            return Err(DevError::OutOfMemory);
        }
        let handle = self.inner.publish_node(devno, name, device)?;
        self.published.lock().push(handle);
        Ok(handle)
    }

    fn unpublish_node(&self, node: NodeHandle) {
        self.unpublished.fetch_add(1, Ordering::SeqCst);
        self.inner.unpublish_node(node);
    }

    fn publish_attributes(&self, node: NodeHandle, attrs: &[AttrInfo]) -> Result<(), DevError> {
        if *self.fail_at.lock() == FailAt::PublishAttributes {
            return Err(DevError::OutOfMemory);
        }
        self.inner.publish_attributes(node, attrs)
    }
}
