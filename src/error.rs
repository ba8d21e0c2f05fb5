//! 驱动错误类型
//!
//! 定义了设备生命周期与 I/O 路径上的全部错误，可通过 [`DevError::to_errno()`]
//! 转换为 Linux 驱动会返回的错误码。

use core::fmt;

/// 描述符解析失败的具体原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// 动态描述符缺少必需字段（字段名）
    MissingField(&'static str),
    /// 字段存在但取值非法（字段名）
    InvalidField(&'static str),
    /// 静态表中没有该设备的平台数据
    NoPlatformData,
    /// 名称 / compatible 不匹配任何已知设备类
    UnknownClass,
}

/// 驱动错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevError {
    // 挂载相关
    /// 描述符缺失或非法，设备不会被创建
    ConfigError(ConfigErrorKind), // -EINVAL(22)
    /// 内存分配失败
    OutOfMemory, // -ENOMEM(12)
    /// 预留的设备号已用尽
    NoIdentitiesAvailable, // -EBUSY(16)
    /// 同一平台设备重复挂载
    AlreadyExists, // -EEXIST(17)

    // 打开 / I/O 相关
    /// 访问模式与设备权限不符
    PermissionDenied, // -EPERM(1)
    /// 写入位置已在设备末尾
    OutOfSpace, // -ENOSPC(28)
    /// seek 目标超出 [0, size]
    InvalidSeek, // -EINVAL(22)
    /// 属性写入内容非法
    InvalidArgument, // -EINVAL(22)

    // 查找相关
    /// 设备号 / 节点 / 属性不存在
    NotFound, // -ENOENT(2)
    /// 句柄指向的设备已被卸载
    Gone, // -ENODEV(19)

    /// 操作不支持（例如写只读属性）
    NotSupported, // -ENOTSUP(95)
}

impl DevError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            DevError::PermissionDenied => -1,
            DevError::NotFound => -2,
            DevError::OutOfMemory => -12,
            DevError::NoIdentitiesAvailable => -16,
            DevError::AlreadyExists => -17,
            DevError::Gone => -19,
            DevError::ConfigError(_) | DevError::InvalidSeek | DevError::InvalidArgument => -22,
            DevError::OutOfSpace => -28,
            DevError::NotSupported => -95,
        }
    }
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::MissingField(name) => write!(f, "missing {} property", name),
            ConfigErrorKind::InvalidField(name) => write!(f, "invalid {} property", name),
            ConfigErrorKind::NoPlatformData => f.write_str("no platform info available"),
            ConfigErrorKind::UnknownClass => f.write_str("no matching device class"),
        }
    }
}

impl fmt::Display for DevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevError::ConfigError(kind) => write!(f, "config error: {}", kind),
            DevError::OutOfMemory => f.write_str("cannot allocate memory"),
            DevError::NoIdentitiesAvailable => f.write_str("no device numbers left"),
            DevError::AlreadyExists => f.write_str("device already attached"),
            DevError::PermissionDenied => f.write_str("permission denied"),
            DevError::OutOfSpace => f.write_str("no space left on the device"),
            DevError::InvalidSeek => f.write_str("invalid seek"),
            DevError::InvalidArgument => f.write_str("invalid argument"),
            DevError::NotFound => f.write_str("not found"),
            DevError::Gone => f.write_str("device is gone"),
            DevError::NotSupported => f.write_str("operation not supported"),
        }
    }
}

impl From<ConfigErrorKind> for DevError {
    fn from(kind: ConfigErrorKind) -> Self {
        DevError::ConfigError(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    test_case!(test_error_codes, {
        kassert!(DevError::PermissionDenied.to_errno() == -1);
        kassert!(DevError::OutOfSpace.to_errno() == -28);
        kassert!(DevError::ConfigError(ConfigErrorKind::NoPlatformData).to_errno() == -22);
        kassert!(DevError::Gone.to_errno() == -19);
    });

    test_case!(test_error_display, {
        let e: DevError = ConfigErrorKind::MissingField("org,size").into();
        kassert!(e.to_string() == "config error: missing org,size property");
        kassert!(DevError::OutOfSpace.to_string() == "no space left on the device");
    });
}
