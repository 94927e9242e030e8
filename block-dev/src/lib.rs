//! # 块设备接口层
//!
//! 块设备以固定大小的**块**为单位存储数据，块编号为 `0..num_blocks()`；
//! [`BlockDevice`] 就是对读写这些块的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! `simple-fs` 只通过此特质读写磁盘。

#![no_std]

extern crate alloc;

mod ram_disk;

use core::any::Any;

pub use self::ram_disk::RamDisk;

/// 块大小(字节)
pub const BLOCK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("block {block_id} is out of range (device has {num_blocks} blocks)")]
    OutOfRange { block_id: usize, num_blocks: usize },
    #[error("buffer of {len} bytes is not a whole block")]
    BadBuffer { len: usize },
    #[error("image I/O failed on block {block_id}")]
    Io { block_id: usize },
}

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + Any {
    /// 可寻址的块数
    fn num_blocks(&self) -> usize;

    /// `buf.len()` 必须等于 [`BLOCK_SIZE`]
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError>;

    /// `buf.len()` 必须等于 [`BLOCK_SIZE`]
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError>;

    /// 供驱动实现复用的参数检查
    fn check_access(&self, block_id: usize, len: usize) -> Result<(), DeviceError> {
        let num_blocks = self.num_blocks();
        if block_id >= num_blocks {
            return Err(DeviceError::OutOfRange {
                block_id,
                num_blocks,
            });
        }
        if len != BLOCK_SIZE {
            return Err(DeviceError::BadBuffer { len });
        }

        Ok(())
    }
}
