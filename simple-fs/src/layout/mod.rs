//! # 磁盘数据结构层
//!
//! SimpleFS 的布局：
//! 超级块 | 索引节点表(设备的十分之一) | 数据块
//!
//! 空闲块位图不落盘，它是这一布局在内存中的映像。

mod super_block;
pub use super_block::SuperBlock;

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{
    DIRECT_COUNT, DiskInode, INDIRECT_COUNT, INODE_SIZE, INODES_PER_BLOCK, IndirectBlock,
    InodeBlock, MAX_FILE_BLOCKS,
};
