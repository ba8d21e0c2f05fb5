//! 设备号工具
//!
//! 提供 major/minor 设备号的编码解码，以及一段预留次设备号区间的分配器
//! （相当于 `alloc_chrdev_region` 得到的区间）。

use alloc::vec;
use alloc::vec::Vec;

use crate::error::DevError;

/// 从 major 和 minor 构造设备号
///
/// Linux 标准格式: (minor & 0xff) | ((major & 0xfff) << 8) | ((minor & ~0xff) << 12) | ((major & ~0xfff) << 32)
#[inline]
pub const fn makedev(major: u32, minor: u32) -> u64 {
    let major = major as u64;
    let minor = minor as u64;
    (minor & 0xff) | ((major & 0xfff) << 8) | ((minor & !0xff) << 12) | ((major & !0xfff) << 32)
}

/// 从设备号提取 major
#[inline]
pub const fn major(dev: u64) -> u32 {
    (((dev >> 8) & 0xfff) | ((dev >> 32) & !0xfff)) as u32
}

/// 从设备号提取 minor
#[inline]
pub const fn minor(dev: u64) -> u32 {
    ((dev & 0xff) | ((dev >> 12) & !0xff)) as u32
}

/// 连续的字符设备号区间
///
/// 区间在创建时一次性预留，之后按 next-fit 顺序发放：
/// 每次从上一次发放位置之后开始找空位，到末尾后回绕。
#[derive(Debug)]
pub struct ChrdevRegion {
    major: u32,
    base_minor: u32,
    /// 每个次设备号是否已被占用
    used: Vec<bool>,
    /// 下一次查找的起点（相对 base_minor）
    next: usize,
}

impl ChrdevRegion {
    /// 预留 `count` 个从 `base_minor` 开始的次设备号
    pub fn new(major: u32, base_minor: u32, count: usize) -> Self {
        Self {
            major,
            base_minor,
            used: vec![false; count],
            next: 0,
        }
    }

    /// 区间容量
    pub fn capacity(&self) -> usize {
        self.used.len()
    }

    /// 已发放的设备号数量
    pub fn in_use(&self) -> usize {
        self.used.iter().filter(|u| **u).count()
    }

    /// 分配一个空闲设备号，同时返回它在区间内的下标
    pub fn alloc(&mut self) -> Result<(u64, usize), DevError> {
        let count = self.used.len();
        for step in 0..count {
            let idx = (self.next + step) % count;
            if !self.used[idx] {
                self.used[idx] = true;
                self.next = (idx + 1) % count;
                return Ok((makedev(self.major, self.base_minor + idx as u32), idx));
            }
        }
        Err(DevError::NoIdentitiesAvailable)
    }

    /// 归还设备号
    ///
    /// 不属于本区间或未被占用的设备号返回 `NotFound`。
    pub fn free(&mut self, dev: u64) -> Result<(), DevError> {
        let idx = self.index_of(dev).ok_or(DevError::NotFound)?;
        if !self.used[idx] {
            return Err(DevError::NotFound);
        }
        self.used[idx] = false;
        Ok(())
    }

    /// 设备号在区间内的下标（即节点名 `pcdev-<index>` 中的 index）
    pub fn index_of(&self, dev: u64) -> Option<usize> {
        if major(dev) != self.major {
            return None;
        }
        let idx = minor(dev).checked_sub(self.base_minor)? as usize;
        (idx < self.used.len()).then_some(idx)
    }
}
