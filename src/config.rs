//! 驱动常量（与平台无关）

/// 可同时挂载的最大设备数，也是预留的次设备号数量
pub const MAX_DEVICES: usize = 10;

/// 主设备号
///
/// 240-254 为 LANANA 划给本地/实验用途的字符设备主设备号
pub const PCD_MAJOR: u32 = 240;

/// 预留区间的起始次设备号
pub const PCD_BASE_MINOR: u32 = 0;

/// 设备类名（/sys/class/pcd_class）
pub const CLASS_NAME: &str = "pcd_class";

/// chrdev 区间名
pub const REGION_NAME: &str = "pcdevs";

/// 设备节点名前缀，节点名为 `pcdev-<index>`
pub const DEVICE_NAME_PREFIX: &str = "pcdev";

/// 序列号最大长度（字节）
pub const SERIAL_NUMBER_MAX_LEN: usize = 32;

/// 设备树属性名
pub mod dt_prop {
    /// 序列号（字符串）
    pub const SERIAL_NUMBER: &str = "org,device-serial-num";
    /// 缓冲区大小（u32）
    pub const SIZE: &str = "org,size";
    /// 权限（u32，取值见 [`super::perm`]）
    pub const PERM: &str = "org,perm";
}

/// 平台数据中的原始权限编码
pub mod perm {
    /// 只读
    pub const RDONLY: u32 = 0x01;
    /// 只写
    pub const WRONLY: u32 = 0x10;
    /// 读写
    pub const RDWR: u32 = 0x11;
}
