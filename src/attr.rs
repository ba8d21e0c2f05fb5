//! 设备属性
//!
//! 每个设备发布两个属性：
//! - `serial_number`（0444）：序列号
//! - `max_size`（0644）：缓冲区大小，写入时重新分配缓冲区；别名 `size`
//!
//! `show` 返回 sysfs 文本形式（值后跟换行），`store` 接受可选的结尾换行。

use alloc::format;
use alloc::string::String;

use crate::device::Device;
use crate::error::DevError;

/// 属性的元信息，随 `publish_attributes` 交给节点发布者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrInfo {
    /// 属性名
    pub name: &'static str,
    /// 权限位
    pub mode: u16,
}

impl AttrInfo {
    /// 是否可读
    pub fn readable(&self) -> bool {
        self.mode & 0o444 != 0
    }

    /// 是否可写
    pub fn writable(&self) -> bool {
        self.mode & 0o222 != 0
    }
}

type ShowFn = fn(&Device) -> Result<String, DevError>;
type StoreFn = fn(&Device, &str) -> Result<(), DevError>;

/// 一个设备属性
pub struct DeviceAttribute {
    /// 元信息
    pub info: AttrInfo,
    aliases: &'static [&'static str],
    show: ShowFn,
    store: Option<StoreFn>,
}

impl DeviceAttribute {
    fn matches(&self, name: &str) -> bool {
        self.info.name == name || self.aliases.contains(&name)
    }
}

fn show_serial_number(dev: &Device) -> Result<String, DevError> {
    Ok(format!("{}\n", dev.serial_number()))
}

fn show_max_size(dev: &Device) -> Result<String, DevError> {
    Ok(format!("{}\n", dev.size()))
}

fn store_max_size(dev: &Device, value: &str) -> Result<(), DevError> {
    let new_size = parse_size(value)?;
    dev.resize(new_size)
}

/// 解析十进制大小，允许一个结尾换行
fn parse_size(value: &str) -> Result<u32, DevError> {
    let value = value.strip_suffix('\n').unwrap_or(value);
    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(DevError::InvalidArgument),
        Ok(size) => Ok(size),
    }
}

/// 属性表
pub static DEVICE_ATTRIBUTES: [DeviceAttribute; 2] = [
    DeviceAttribute {
        info: AttrInfo { name: "max_size", mode: 0o644 },
        aliases: &["size"],
        show: show_max_size,
        store: Some(store_max_size),
    },
    DeviceAttribute {
        info: AttrInfo { name: "serial_number", mode: 0o444 },
        aliases: &[],
        show: show_serial_number,
        store: None,
    },
];

/// 要发布的属性集合
pub fn attribute_infos() -> [AttrInfo; 2] {
    [DEVICE_ATTRIBUTES[0].info, DEVICE_ATTRIBUTES[1].info]
}

/// 按名称（或别名）查找属性
pub fn find(name: &str) -> Option<&'static DeviceAttribute> {
    DEVICE_ATTRIBUTES.iter().find(|a| a.matches(name))
}

/// 读取属性
pub fn show(dev: &Device, name: &str) -> Result<String, DevError> {
    let attr = find(name).ok_or(DevError::NotFound)?;
    if !dev.is_attached() {
        return Err(DevError::Gone);
    }
    (attr.show)(dev)
}

/// 写入属性
///
/// 没有 store 回调的属性返回 `NotSupported`；格式错误返回 `InvalidArgument`，状态不变。
pub fn store(dev: &Device, name: &str, value: &str) -> Result<(), DevError> {
    let attr = find(name).ok_or(DevError::NotFound)?;
    let store = attr.store.ok_or(DevError::NotSupported)?;
    store(dev, value).inspect_err(|e| {
        dev_warn!(dev.name(), "store {} rejected: {}", attr.info.name, e);
    })
}
