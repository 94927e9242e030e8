#![no_std]

extern crate alloc;

/* simple-fs 的整体架构，自上而下 */

// 哨兵值接口层：显式保存挂载状态，失败以哨兵值报告
mod volume;

// 调试层：转储超级块与有效的索引节点
mod debug;

// 数据传输层：地址转换与读写
mod transfer;

// 磁盘块管理器层：格式化、挂载、索引节点分配
mod efs;

// 磁盘数据结构层：磁盘上的数据结构与内存中的位图
mod layout;

mod error;

pub use block_dev::{BLOCK_SIZE, BlockDevice, DeviceError};

pub use self::{
    debug::{DebugReport, InodeReport},
    efs::{SharedFileSystem, SimpleFileSystem},
    error::{Error, Result},
    layout::{
        Bitmap, DIRECT_COUNT, DiskInode, INDIRECT_COUNT, INODE_SIZE, INODES_PER_BLOCK,
        IndirectBlock, InodeBlock, MAX_FILE_BLOCKS, SuperBlock,
    },
    volume::Volume,
};

pub const MAGIC: u32 = 0xf0f0_3410;

type DataBlock = [u8; BLOCK_SIZE];

#[inline]
fn read_u32(raw: &[u8], offset: usize) -> u32 {
    let mut bytes = [0; 4];
    bytes.copy_from_slice(&raw[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

#[inline]
fn write_u32(raw: &mut [u8], offset: usize, value: u32) {
    raw[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
