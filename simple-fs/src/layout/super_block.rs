use crate::{DataBlock, INODES_PER_BLOCK, MAGIC, read_u32, write_u32};

/// 超级块，总在 0 号块：
/// - 提供文件系统合法性校验；
/// - 记录索引节点区的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    /// 魔数：挂载时校验
    magic: u32,
    /// 文件系统占据块数，含超级块
    pub total_blocks: u32,
    /// 紧随超级块、存放索引节点的块数
    pub inode_blocks: u32,
    /// `inode_blocks * INODES_PER_BLOCK`
    pub inodes: u32,
}

impl SuperBlock {
    /// 新卷的布局：设备的十分之一（向上取整）作为索引节点表。
    /// 若索引节点数超出 `u32`，则返回空。
    pub fn new(total_blocks: u32) -> Option<Self> {
        let inode_blocks = total_blocks.div_ceil(10);
        let inodes = inode_blocks.checked_mul(INODES_PER_BLOCK as u32)?;

        Some(Self {
            magic: MAGIC,
            total_blocks,
            inode_blocks,
            inodes,
        })
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }

    #[inline]
    pub fn magic(&self) -> u32 {
        self.magic
    }

    /// 布局自洽，且与`device_blocks`块的设备相符
    pub fn fits(&self, device_blocks: usize) -> bool {
        self.total_blocks as usize == device_blocks
            && self.inode_blocks > 0
            && self.inode_blocks < self.total_blocks
            && self.inodes as u64 == self.inode_blocks as u64 * INODES_PER_BLOCK as u64
    }

    /// 元数据区之后的第一个块
    #[inline]
    pub fn data_start(&self) -> u32 {
        1 + self.inode_blocks
    }

    /// `block_id`是否为超级块或索引节点区的块
    #[inline]
    pub fn is_metadata(&self, block_id: u32) -> bool {
        block_id < self.data_start()
    }

    /// `block_id`能否存放文件数据或间接索引块
    #[inline]
    pub fn is_data(&self, block_id: u32) -> bool {
        !self.is_metadata(block_id) && block_id < self.total_blocks
    }

    pub fn decode(block: &DataBlock) -> Self {
        Self {
            magic: read_u32(block, 0),
            total_blocks: read_u32(block, 4),
            inode_blocks: read_u32(block, 8),
            inodes: read_u32(block, 12),
        }
    }

    /// 四个字段之后的填充保持为 0
    pub fn encode(&self) -> DataBlock {
        let mut block = [0; crate::BLOCK_SIZE];
        write_u32(&mut block, 0, self.magic);
        write_u32(&mut block, 4, self.total_blocks);
        write_u32(&mut block, 8, self.inode_blocks);
        write_u32(&mut block, 12, self.inodes);

        block
    }
}
