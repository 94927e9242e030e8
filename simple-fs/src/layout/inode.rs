//! 磁盘索引节点与间接索引块
//!
//! 文件的逻辑块按如下方式索引：
//! - `0..DIRECT_COUNT` 查 [`DiskInode::direct`]；
//! - `DIRECT_COUNT..MAX_FILE_BLOCKS` 查索引节点唯一的间接索引块，
//!   表项位置为 `index - DIRECT_COUNT`。
//!
//! 0 号块是超级块，因此值为 0 的指针总表示"未分配"。

use crate::{BLOCK_SIZE, DataBlock, read_u32, write_u32};

/// 直接索引可编号数量
pub const DIRECT_COUNT: usize = 5;
/// 间接索引块的编号容量
pub const INDIRECT_COUNT: usize = BLOCK_SIZE / 4;
/// 文件最多占用的数据块数
pub const MAX_FILE_BLOCKS: usize = DIRECT_COUNT + INDIRECT_COUNT;

/// 紧凑记录大小：有效位、大小、直接索引、间接索引
pub const INODE_SIZE: usize = 4 * (2 + DIRECT_COUNT + 1);
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiskInode {
    pub valid: bool,
    /// 文件大小(字节)
    pub size: u32,
    /// 覆盖前 `DIRECT_COUNT * BLOCK_SIZE` 字节
    pub direct: [u32; DIRECT_COUNT],
    /// 指向 [`IndirectBlock`]
    pub indirect: u32,
}

impl DiskInode {
    /// 空闲槽位：无效、大小为 0、无指针
    pub const EMPTY: Self = Self {
        valid: false,
        size: 0,
        direct: [0; DIRECT_COUNT],
        indirect: 0,
    };

    /// 为新的空文件占用此槽位
    #[inline]
    pub fn init(&mut self) {
        *self = Self {
            valid: true,
            ..Self::EMPTY
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// 非零的直接索引，按槽位顺序
    pub fn direct_blocks(&self) -> impl Iterator<Item = u32> + '_ {
        self.direct.iter().copied().filter(|&id| id != 0)
    }

    fn decode(raw: &[u8]) -> Self {
        let mut direct = [0; DIRECT_COUNT];
        for (i, ptr) in direct.iter_mut().enumerate() {
            *ptr = read_u32(raw, 8 + 4 * i);
        }

        Self {
            valid: read_u32(raw, 0) != 0,
            size: read_u32(raw, 4),
            direct,
            indirect: read_u32(raw, 8 + 4 * DIRECT_COUNT),
        }
    }

    fn encode(&self, raw: &mut [u8]) {
        write_u32(raw, 0, self.valid as u32);
        write_u32(raw, 4, self.size);
        for (i, &ptr) in self.direct.iter().enumerate() {
            write_u32(raw, 8 + 4 * i, ptr);
        }
        write_u32(raw, 8 + 4 * DIRECT_COUNT, self.indirect);
    }
}

/// 索引节点表中的一个块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeBlock(pub [DiskInode; INODES_PER_BLOCK]);

impl InodeBlock {
    pub const EMPTY: Self = Self([DiskInode::EMPTY; INODES_PER_BLOCK]);

    pub fn decode(block: &DataBlock) -> Self {
        let mut inodes = [DiskInode::EMPTY; INODES_PER_BLOCK];
        for (inode, raw) in inodes.iter_mut().zip(block.chunks_exact(INODE_SIZE)) {
            *inode = DiskInode::decode(raw);
        }

        Self(inodes)
    }

    pub fn encode(&self) -> DataBlock {
        let mut block = [0; BLOCK_SIZE];
        for (inode, raw) in self.0.iter().zip(block.chunks_exact_mut(INODE_SIZE)) {
            inode.encode(raw);
        }

        block
    }
}

/// 间接索引块：整个块连续存储**块编号**
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectBlock(pub [u32; INDIRECT_COUNT]);

impl IndirectBlock {
    pub const EMPTY: Self = Self([0; INDIRECT_COUNT]);

    pub fn decode(block: &DataBlock) -> Self {
        let mut ptrs = [0; INDIRECT_COUNT];
        for (i, ptr) in ptrs.iter_mut().enumerate() {
            *ptr = read_u32(block, 4 * i);
        }

        Self(ptrs)
    }

    pub fn encode(&self) -> DataBlock {
        let mut block = [0; BLOCK_SIZE];
        for (i, &ptr) in self.0.iter().enumerate() {
            write_u32(&mut block, 4 * i, ptr);
        }

        block
    }

    /// 非零表项，按索引顺序
    pub fn blocks(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied().filter(|&id| id != 0)
    }
}
