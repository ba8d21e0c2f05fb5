//! 内置平台设备
//!
//! 相当于板级 setup 代码：为四个已知设备类各注册一个平台设备，
//! 平台 id 依次为 0..3，描述来自内置平台数据表。

use alloc::vec::Vec;

use crate::descriptor::{DEVICE_CLASSES, DeviceAnnounce};
use crate::driver::{BusEvent, PcdDriver};
use crate::error::DevError;

/// 四个内置平台设备的上报事件
pub fn platform_devices() -> Vec<DeviceAnnounce> {
    DEVICE_CLASSES
        .iter()
        .enumerate()
        .map(|(id, class)| DeviceAnnounce::from_static(id as u32, class.id))
        .collect()
}

/// 挂载全部内置平台设备，逐个返回结果
pub fn add_devices(driver: &PcdDriver) -> Vec<(u32, Result<u64, DevError>)> {
    let results: Vec<_> = platform_devices()
        .iter()
        .map(|ann| (ann.id, driver.attach(ann)))
        .collect();
    pr_info!("[pcd] device setup module loaded");
    results
}

/// 撤销全部内置平台设备，未挂载的跳过
pub fn remove_devices(driver: &PcdDriver) {
    for ann in platform_devices() {
        match driver.handle_event(BusEvent::Withdraw { id: ann.id }) {
            Ok(()) | Err(DevError::NotFound) => {}
            Err(e) => pr_err!("[pcd] withdraw of platform device {} failed: {}", ann.id, e),
        }
    }
    pr_info!("[pcd] device setup module unloaded");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClassId, DescriptorSource};
    use crate::node::DevClass;
    use alloc::sync::Arc;

    test_case!(test_platform_devices, {
        let devices = platform_devices();
        kassert!(devices.len() == 4);
        for (i, ann) in devices.iter().enumerate() {
            kassert!(ann.id == i as u32);
            kassert!(ann.source == DescriptorSource::Static(ClassId(i as u32)));
        }
        kassert!(devices[2].name == "pcdev-C1X");
    });

    test_case!(test_add_and_remove_devices, {
        let class = Arc::new(DevClass::default());
        let driver = PcdDriver::new(class.clone());

        let results = add_devices(&driver);
        kassert!(results.iter().all(|(_, r)| r.is_ok()));
        kassert!(driver.count() == 4);
        kassert!(class.node_names().len() == 4);

        // 再次挂载：全部重复
        let again = add_devices(&driver);
        kassert!(again.iter().all(|(_, r)| *r == Err(DevError::AlreadyExists)));

        remove_devices(&driver);
        kassert!(driver.count() == 0);
        kassert!(class.node_names().is_empty());
        // 重复撤销不报错
        remove_devices(&driver);
    });
}
