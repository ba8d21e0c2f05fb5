//! 伪字符设备（pseudo character device）框架
//!
//! 把一组内存中的逻辑设备以字符设备节点的形式暴露出来，提供：
//! - 按字节流语义的 open / read / write / lseek / release
//! - 打开时的访问权限检查（只读、只写、读写）
//! - 通过属性接口查询序列号、在线调整缓冲区大小
//! - 静态平台数据表与设备树两种描述来源（设备树优先）
//!
//! # 模块结构
//!
//! ```text
//! descriptor ── 描述符解析（动态 / 静态）
//! dt         ── 设备树扫描，生成 Announce 事件
//! devno      ── 设备号编码与 chrdev 区间分配
//! device     ── 每个设备的运行时状态与缓冲区
//! file       ── 打开句柄（游标 + 访问模式）
//! attr       ── serial_number / max_size 属性
//! node       ── 节点发布接口及内存实现 DevClass
//! registry   ── 设备号 → 设备 的注册表
//! driver     ── attach / detach 生命周期控制
//! setup      ── 内置平台设备表
//! ```
#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[cfg(test)]
#[macro_use]
mod test;

#[macro_use]
pub mod log;

pub mod attr;
pub mod config;
pub mod descriptor;
pub mod device;
pub mod devno;
pub mod driver;
pub mod dt;
pub mod error;
pub mod file;
pub mod node;
pub mod registry;
pub mod setup;

#[cfg(test)]
mod tests;

pub use descriptor::{
    ClassId, DescriptorSource, DeviceAnnounce, DeviceDescriptor, DynamicDescriptor, Permission,
};
pub use device::{Device, DeviceRef};
pub use driver::{BusEvent, DriverConfig, PcdDriver};
pub use error::{ConfigErrorKind, DevError};
pub use file::{AccessMode, PcdFile, SeekWhence};
pub use node::{DevClass, NodeHandle, NodePublisher};
