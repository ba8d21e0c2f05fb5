//! 设备树发现
//!
//! 遍历扁平设备树（FDT），为每个 `compatible` 命中已知设备类的节点
//! 生成一个带动态描述的 [`DeviceAnnounce`]。字段校验留给 [`Resolver`]。
//!
//! [`Resolver`]: crate::descriptor::Resolver

use alloc::vec::Vec;
use fdt::Fdt;
use fdt::node::FdtNode;

use crate::descriptor::{DeviceAnnounce, DynamicDescriptor, class_by_name};
use crate::error::{ConfigErrorKind, DevError};

/// 扫描设备树 blob
///
/// 平台 id 按遍历顺序从 0 开始分配。blob 无法解析时返回
/// `ConfigError(InvalidField("dtb"))`。
pub fn scan(blob: &[u8]) -> Result<Vec<DeviceAnnounce>, DevError> {
    let fdt = Fdt::new(blob).map_err(|e| {
        pr_err!("[pcd] bad device tree blob: {:?}", e);
        DevError::ConfigError(ConfigErrorKind::InvalidField("dtb"))
    })?;

    let mut found = Vec::new();
    for node in fdt.all_nodes() {
        let Some(compatible) = node.compatible() else {
            continue;
        };
        if !compatible.all().any(|c| class_by_name(c).is_some()) {
            continue;
        }
        let id = found.len() as u32;
        pr_info!("[pcd] found device tree node {} (platform id {})", node.name, id);
        found.push(DeviceAnnounce::from_dynamic(id, node.name, collect(&node)));
    }
    Ok(found)
}

fn collect(node: &FdtNode<'_, '_>) -> DynamicDescriptor {
    let mut desc = DynamicDescriptor::default();
    if let Some(compatible) = node.compatible() {
        for c in compatible.all() {
            desc.add_compatible(c);
        }
    }
    for prop in node.properties() {
        desc.set_property(prop.name, prop.value);
    }
    desc
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::dt_prop;
    use crate::config::perm::{RDONLY, RDWR};
    use crate::descriptor::{ClassId, Permission, Resolver};
    use alloc::vec;

    const FDT_BEGIN_NODE: u32 = 1;
    const FDT_END_NODE: u32 = 2;
    const FDT_PROP: u32 = 3;
    const FDT_END: u32 = 9;

    /// 测试用的最小 DTB 构造器
    pub(crate) struct DtbBuilder {
        structure: Vec<u8>,
        strings: Vec<u8>,
    }

    impl DtbBuilder {
        pub(crate) fn new() -> Self {
            let mut b = Self { structure: Vec::new(), strings: Vec::new() };
            b.begin_node("");
            b.prop_u32("#address-cells", 1);
            b.prop_u32("#size-cells", 1);
            b
        }

        fn token(&mut self, tok: u32) {
            self.structure.extend_from_slice(&tok.to_be_bytes());
        }

        fn pad(&mut self) {
            while self.structure.len() % 4 != 0 {
                self.structure.push(0);
            }
        }

        fn string_offset(&mut self, name: &str) -> u32 {
            let mut off = 0;
            for s in self.strings.split(|b| *b == 0) {
                if s == name.as_bytes() {
                    return off as u32;
                }
                off += s.len() + 1;
            }
            let off = self.strings.len() as u32;
            self.strings.extend_from_slice(name.as_bytes());
            self.strings.push(0);
            off
        }

        pub(crate) fn begin_node(&mut self, name: &str) {
            self.token(FDT_BEGIN_NODE);
            self.structure.extend_from_slice(name.as_bytes());
            self.structure.push(0);
            self.pad();
        }

        pub(crate) fn end_node(&mut self) {
            self.token(FDT_END_NODE);
        }

        pub(crate) fn prop(&mut self, name: &str, value: &[u8]) {
            let nameoff = self.string_offset(name);
            self.token(FDT_PROP);
            self.token(value.len() as u32);
            self.token(nameoff);
            self.structure.extend_from_slice(value);
            self.pad();
        }

        pub(crate) fn prop_str(&mut self, name: &str, value: &str) {
            let mut bytes = value.as_bytes().to_vec();
            bytes.push(0);
            self.prop(name, &bytes);
        }

        pub(crate) fn prop_u32(&mut self, name: &str, value: u32) {
            self.prop(name, &value.to_be_bytes());
        }

        /// 一个带三项 pcdev 属性的完整设备节点
        pub(crate) fn pcdev_node(&mut self, name: &str, compat: &str, serial: &str, size: u32, perm: u32) {
            self.begin_node(name);
            self.prop_str("compatible", compat);
            self.prop_str(dt_prop::SERIAL_NUMBER, serial);
            self.prop_u32(dt_prop::SIZE, size);
            self.prop_u32(dt_prop::PERM, perm);
            self.end_node();
        }

        pub(crate) fn finish(mut self) -> Vec<u8> {
            // 关闭根节点
            self.end_node();
            self.token(FDT_END);

            let header_len = 40usize;
            let rsvmap_len = 16usize;
            let off_struct = header_len + rsvmap_len;
            let off_strings = off_struct + self.structure.len();
            let total = off_strings + self.strings.len();

            let mut blob = vec![0u8; header_len + rsvmap_len];
            let header = [
                0xd00d_feed,
                total as u32,
                off_struct as u32,
                off_strings as u32,
                header_len as u32,
                17,
                16,
                0,
                self.strings.len() as u32,
                self.structure.len() as u32,
            ];
            for (i, word) in header.iter().enumerate() {
                blob[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
            }
            blob.extend_from_slice(&self.structure);
            blob.extend_from_slice(&self.strings);
            blob
        }
    }

    test_case!(test_scan_finds_known_nodes, {
        let mut b = DtbBuilder::new();
        b.pcdev_node("pcdev@1", "pcdev-A1X", "PCDEV_DT_1", 512, RDWR);
        b.begin_node("uart@1000");
        b.prop_str("compatible", "ns16550a");
        b.end_node();
        b.pcdev_node("pcdev@2", "pcdev-C1X", "PCDEV_DT_2", 64, RDONLY);
        let blob = b.finish();

        let found = scan(&blob).unwrap();
        kassert!(found.len() == 2);
        kassert!(found[0].id == 0);
        kassert!(found[0].name == "pcdev@1");
        kassert!(found[1].id == 1);

        let resolver = Resolver::default();
        let first = resolver.resolve(&found[0]).unwrap();
        kassert!(first.size == 512);
        kassert!(first.serial_number == "PCDEV_DT_1");
        kassert!(first.class_id == ClassId(0));

        let second = resolver.resolve(&found[1]).unwrap();
        kassert!(second.permission == Permission::ReadOnly);
        kassert!(second.class_id == ClassId(2));
    });

    test_case!(test_scan_missing_property_left_to_resolver, {
        let mut b = DtbBuilder::new();
        b.begin_node("pcdev@3");
        b.prop_str("compatible", "pcdev-B1X");
        b.prop_u32(dt_prop::SIZE, 16);
        b.prop_u32(dt_prop::PERM, RDWR);
        b.end_node();
        let found = scan(&b.finish()).unwrap();
        kassert!(found.len() == 1);
        kassert!(
            Resolver::default().resolve(&found[0])
                == Err(ConfigErrorKind::MissingField(dt_prop::SERIAL_NUMBER))
        );
    });

    test_case!(test_scan_rejects_garbage, {
        let garbage = [0u8; 64];
        kassert!(
            scan(&garbage) == Err(DevError::ConfigError(ConfigErrorKind::InvalidField("dtb")))
        );
    });
}
