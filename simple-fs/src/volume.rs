//! # 哨兵值接口层
//!
//! [`Volume`] 在 [`SimpleFileSystem`] 之上提供经典的 SimpleFS 调用：
//! 挂载状态显式保存，任何失败都先记录日志，再以哨兵值
//! (`false`、`0` 或 `-1`) 报告。
//!
//! | 调用      | 失败时  |
//! |-----------|---------|
//! | `format`  | `false` |
//! | `mount`   | `false` |
//! | `create`  | `0`     |
//! | `delete`  | `false` |
//! | `getsize` | `-1`    |
//! | `read`    | `0`     |
//! | `write`   | `0`     |

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use block_dev::BlockDevice;

use crate::{Result, SimpleFileSystem};

pub struct Volume {
    block_device: Arc<dyn BlockDevice>,
    /// 挂载期间为 `Some`
    mounted: Option<SimpleFileSystem>,
}

impl Volume {
    pub fn new(block_device: Arc<dyn BlockDevice>) -> Self {
        Self {
            block_device,
            mounted: None,
        }
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    #[inline]
    pub fn filesystem(&self) -> Option<&SimpleFileSystem> {
        self.mounted.as_ref()
    }

    /// 已挂载时拒绝执行，此时不触碰设备
    pub fn format(&mut self) -> bool {
        if self.is_mounted() {
            log::warn!("format: volume is mounted");
            return false;
        }

        report("format", SimpleFileSystem::format(&self.block_device)).is_some()
    }

    /// 已挂载时拒绝执行，不会悄悄重新挂载
    pub fn mount(&mut self) -> bool {
        if self.is_mounted() {
            log::warn!("mount: volume is already mounted");
            return false;
        }

        self.mounted = report("mount", SimpleFileSystem::mount(self.block_device.clone()));
        self.is_mounted()
    }

    /// 新索引节点编号，失败为 0
    pub fn create(&mut self) -> u32 {
        self.mounted_mut("create")
            .and_then(|fs| report("create", fs.create()))
            .unwrap_or(0)
    }

    pub fn delete(&mut self, inumber: u32) -> bool {
        self.mounted_mut("delete")
            .and_then(|fs| report("delete", fs.delete(inumber)))
            .is_some()
    }

    /// 文件大小(字节)，失败为 -1
    pub fn getsize(&self, inumber: u32) -> i64 {
        self.mounted_ref("getsize")
            .and_then(|fs| report("getsize", fs.size(inumber)))
            .map_or(-1, i64::from)
    }

    /// 从`offset`处读出至多`length`字节(不超过`buf.len()`)
    pub fn read(&self, inumber: u32, buf: &mut [u8], length: usize, offset: usize) -> usize {
        let length = length.min(buf.len());
        self.mounted_ref("read")
            .and_then(|fs| report("read", fs.read(inumber, &mut buf[..length], offset)))
            .unwrap_or(0)
    }

    /// 向`offset`处写入至多`length`字节(不超过`data.len()`)
    pub fn write(&mut self, inumber: u32, data: &[u8], length: usize, offset: usize) -> usize {
        let length = length.min(data.len());
        self.mounted_mut("write")
            .and_then(|fs| report("write", fs.write(inumber, &data[..length], offset)))
            .unwrap_or(0)
    }

    /// 卷的可读转储，失败时为一行错误信息
    pub fn debug(&self) -> String {
        let Some(fs) = self.mounted_ref("debug") else {
            return "error: volume is not mounted".to_string();
        };

        match fs.debug() {
            Ok(report) => report.to_string(),
            Err(err) => format!("error: {err}"),
        }
    }
}

impl Volume {
    fn mounted_ref(&self, op: &str) -> Option<&SimpleFileSystem> {
        if self.mounted.is_none() {
            log::warn!("{op}: volume is not mounted");
        }
        self.mounted.as_ref()
    }

    fn mounted_mut(&mut self, op: &str) -> Option<&mut SimpleFileSystem> {
        if self.mounted.is_none() {
            log::warn!("{op}: volume is not mounted");
        }
        self.mounted.as_mut()
    }
}

/// 记录失败的操作并丢弃错误
fn report<T>(op: &str, result: Result<T>) -> Option<T> {
    result.map_err(|err| log::warn!("{op}: {err}")).ok()
}
