//! 设备描述符解析
//!
//! 把一次设备上报（[`DeviceAnnounce`]）解析成规范化的 [`DeviceDescriptor`]。
//! 描述来源有两种：
//! - [`DescriptorSource::Dynamic`]：来自设备树节点的属性，必须提供序列号、大小、权限三项
//! - [`DescriptorSource::Static`]：按设备类在内置平台数据表中查找
//!
//! 两者在边界处一次性确定，解析本身是纯函数，不修改任何共享状态。

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::config::{SERIAL_NUMBER_MAX_LEN, dt_prop, perm};
use crate::error::ConfigErrorKind;
use crate::file::AccessMode;

/// 设备类标识，选择一组配置预设
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/// 设备访问权限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// 只允许以只读方式打开
    ReadOnly,
    /// 只允许以只写方式打开
    WriteOnly,
    /// 任意方式
    ReadWrite,
}

impl Permission {
    /// 从平台数据中的原始编码转换（0x01 / 0x10 / 0x11）
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            perm::RDONLY => Some(Permission::ReadOnly),
            perm::WRONLY => Some(Permission::WriteOnly),
            perm::RDWR => Some(Permission::ReadWrite),
            _ => None,
        }
    }

    /// 原始编码
    pub fn raw(self) -> u32 {
        match self {
            Permission::ReadOnly => perm::RDONLY,
            Permission::WriteOnly => perm::WRONLY,
            Permission::ReadWrite => perm::RDWR,
        }
    }

    /// 打开时的权限检查
    ///
    /// - `ReadWrite` 允许任何访问模式
    /// - `ReadOnly` 只允许“请求读且不请求写”
    /// - `WriteOnly` 只允许“请求写且不请求读”
    pub fn permits(self, mode: AccessMode) -> bool {
        let read = mode.contains(AccessMode::READ);
        let write = mode.contains(AccessMode::WRITE);
        match self {
            Permission::ReadWrite => true,
            Permission::ReadOnly => read && !write,
            Permission::WriteOnly => write && !read,
        }
    }
}

/// 规范化后的设备描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// 缓冲区大小（字节，> 0）
    pub size: u32,
    /// 访问权限
    pub permission: Permission,
    /// 序列号（非空，不超过 [`SERIAL_NUMBER_MAX_LEN`] 字节）
    pub serial_number: String,
    /// 设备类
    pub class_id: ClassId,
}

/// 每个设备类的配置预设，只用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassConfig {
    /// 配置项 1
    pub config_item1: i32,
    /// 配置项 2
    pub config_item2: i32,
}

/// 已知设备类
#[derive(Debug)]
pub struct DeviceClass {
    /// 类标识
    pub id: ClassId,
    /// 平台设备名 / 设备树 compatible 字符串
    pub name: &'static str,
    /// 配置预设
    pub config: ClassConfig,
}

/// 设备类表：名称匹配（id_table）与 compatible 匹配（of_match_table）共用
pub static DEVICE_CLASSES: [DeviceClass; 4] = [
    DeviceClass {
        id: ClassId(0),
        name: "pcdev-A1X",
        config: ClassConfig { config_item1: 60, config_item2: 120 },
    },
    DeviceClass {
        id: ClassId(1),
        name: "pcdev-B1X",
        config: ClassConfig { config_item1: 2, config_item2: 3 },
    },
    DeviceClass {
        id: ClassId(2),
        name: "pcdev-C1X",
        config: ClassConfig { config_item1: 99, config_item2: 9 },
    },
    DeviceClass {
        id: ClassId(3),
        name: "pcdev-D1X",
        config: ClassConfig { config_item1: 12, config_item2: 120 },
    },
];

/// 按名称查找设备类
pub fn class_by_name(name: &str) -> Option<&'static DeviceClass> {
    DEVICE_CLASSES.iter().find(|c| c.name == name)
}

/// 按标识查找设备类
pub fn class_by_id(id: ClassId) -> Option<&'static DeviceClass> {
    DEVICE_CLASSES.iter().find(|c| c.id == id)
}

/// 静态平台数据（原始编码，解析时再校验）
#[derive(Debug, Clone, Copy)]
pub struct PlatformData {
    /// 缓冲区大小
    pub size: u32,
    /// 原始权限编码
    pub perm: u32,
    /// 序列号
    pub serial_number: &'static str,
}

/// 静态表中的一项
#[derive(Debug, Clone, Copy)]
pub struct StaticEntry {
    /// 所属设备类
    pub class: ClassId,
    /// 平台数据
    pub pdata: PlatformData,
}

/// 内置平台数据表
pub static DEFAULT_PLATFORM_DATA: [StaticEntry; 4] = [
    StaticEntry {
        class: ClassId(0),
        pdata: PlatformData { size: 512, perm: perm::RDWR, serial_number: "PCDEV_SR_1" },
    },
    StaticEntry {
        class: ClassId(1),
        pdata: PlatformData { size: 1024, perm: perm::RDWR, serial_number: "PCDEV_SR_2" },
    },
    StaticEntry {
        class: ClassId(2),
        pdata: PlatformData { size: 256, perm: perm::RDONLY, serial_number: "PCDEV_SR_3" },
    },
    StaticEntry {
        class: ClassId(3),
        pdata: PlatformData { size: 2048, perm: perm::WRONLY, serial_number: "PCDEV_SR_4" },
    },
];

/// 来自设备树节点的动态描述
///
/// 属性按原始字节保存，读取时再按字符串 / u32 解释，
/// 与 `of_property_read_string` / `of_property_read_u32` 的语义一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicDescriptor {
    compatible: Vec<String>,
    props: HashMap<String, Vec<u8>>,
}

impl DynamicDescriptor {
    /// 创建只带一个 compatible 的描述
    pub fn new(compatible: &str) -> Self {
        let mut desc = Self::default();
        desc.compatible.push(compatible.to_string());
        desc
    }

    /// 追加 compatible 字符串
    pub fn add_compatible(&mut self, compatible: &str) {
        self.compatible.push(compatible.to_string());
    }

    /// compatible 列表
    pub fn compatible(&self) -> &[String] {
        &self.compatible
    }

    /// 设置一个原始属性
    pub fn set_property(&mut self, name: &str, value: &[u8]) {
        self.props.insert(name.to_string(), value.to_vec());
    }

    /// 设置字符串属性（以 NUL 结尾存储）
    pub fn with_string(mut self, name: &str, value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.props.insert(name.to_string(), bytes);
        self
    }

    /// 设置 u32 属性（大端单元格）
    pub fn with_u32(mut self, name: &str, value: u32) -> Self {
        self.props.insert(name.to_string(), value.to_be_bytes().to_vec());
        self
    }

    /// 原始属性值
    pub fn property(&self, name: &str) -> Option<&[u8]> {
        self.props.get(name).map(Vec::as_slice)
    }

    /// 读取字符串属性：缺失为 `MissingField`，不是合法 UTF-8 为 `InvalidField`
    pub fn read_string(&self, name: &'static str) -> Result<&str, ConfigErrorKind> {
        let raw = self.property(name).ok_or(ConfigErrorKind::MissingField(name))?;
        let raw = raw.split(|b| *b == 0).next().unwrap_or(raw);
        core::str::from_utf8(raw).map_err(|_| ConfigErrorKind::InvalidField(name))
    }

    /// 读取 u32 属性：缺失为 `MissingField`，长度不是 4 字节为 `InvalidField`
    pub fn read_u32(&self, name: &'static str) -> Result<u32, ConfigErrorKind> {
        let raw = self.property(name).ok_or(ConfigErrorKind::MissingField(name))?;
        let cell: [u8; 4] = raw
            .try_into()
            .map_err(|_| ConfigErrorKind::InvalidField(name))?;
        Ok(u32::from_be_bytes(cell))
    }
}

/// 描述来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorSource {
    /// 外部配置（设备树），优先
    Dynamic(DynamicDescriptor),
    /// 内置平台数据表中的设备类
    Static(ClassId),
}

/// 总线上报的设备出现事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAnnounce {
    /// 平台设备 id
    pub id: u32,
    /// 平台设备名（只用于日志）
    pub name: String,
    /// 描述来源
    pub source: DescriptorSource,
}

impl DeviceAnnounce {
    /// 由静态设备类构造上报事件
    pub fn from_static(id: u32, class: ClassId) -> Self {
        let name = class_by_id(class).map_or("pcdev", |c| c.name);
        Self {
            id,
            name: name.to_string(),
            source: DescriptorSource::Static(class),
        }
    }

    /// 由设备树描述构造上报事件
    pub fn from_dynamic(id: u32, name: &str, desc: DynamicDescriptor) -> Self {
        Self {
            id,
            name: name.to_string(),
            source: DescriptorSource::Dynamic(desc),
        }
    }
}

/// 描述符解析器
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    static_table: &'static [StaticEntry],
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(&DEFAULT_PLATFORM_DATA)
    }
}

impl Resolver {
    /// 以给定静态表构造解析器
    pub const fn new(static_table: &'static [StaticEntry]) -> Self {
        Self { static_table }
    }

    /// 解析上报事件
    pub fn resolve(&self, announce: &DeviceAnnounce) -> Result<DeviceDescriptor, ConfigErrorKind> {
        match &announce.source {
            DescriptorSource::Dynamic(desc) => Self::resolve_dynamic(desc),
            DescriptorSource::Static(class) => self.resolve_static(*class),
        }
    }

    fn resolve_dynamic(desc: &DynamicDescriptor) -> Result<DeviceDescriptor, ConfigErrorKind> {
        let class = desc
            .compatible()
            .iter()
            .find_map(|c| class_by_name(c))
            .ok_or(ConfigErrorKind::UnknownClass)?;

        let serial_number = desc.read_string(dt_prop::SERIAL_NUMBER)?;
        let size = desc.read_u32(dt_prop::SIZE)?;
        let raw_perm = desc.read_u32(dt_prop::PERM)?;

        Self::build(serial_number, size, raw_perm, class.id, dt_prop::PERM)
    }

    fn resolve_static(&self, class: ClassId) -> Result<DeviceDescriptor, ConfigErrorKind> {
        let entry = self
            .static_table
            .iter()
            .find(|e| e.class == class)
            .ok_or(ConfigErrorKind::NoPlatformData)?;
        let pdata = entry.pdata;

        Self::build(pdata.serial_number, pdata.size, pdata.perm, class, "perm")
    }

    fn build(
        serial_number: &str,
        size: u32,
        raw_perm: u32,
        class_id: ClassId,
        perm_field: &'static str,
    ) -> Result<DeviceDescriptor, ConfigErrorKind> {
        if serial_number.is_empty() || serial_number.len() > SERIAL_NUMBER_MAX_LEN {
            return Err(ConfigErrorKind::InvalidField(dt_prop::SERIAL_NUMBER));
        }
        if size == 0 {
            return Err(ConfigErrorKind::InvalidField(dt_prop::SIZE));
        }
        let permission =
            Permission::from_raw(raw_perm).ok_or(ConfigErrorKind::InvalidField(perm_field))?;

        Ok(DeviceDescriptor {
            size,
            permission,
            serial_number: serial_number.to_string(),
            class_id,
        })
    }
}
