use core::fmt;

use alloc::vec::Vec;

use crate::layout::{DiskInode, INODES_PER_BLOCK, InodeBlock, SuperBlock};
use crate::{Result, SimpleFileSystem};

/// 磁盘元数据的快照，由其 `Display` 实现打印
#[derive(Debug, Clone)]
pub struct DebugReport {
    pub super_block: SuperBlock,
    pub inodes: Vec<InodeReport>,
}

#[derive(Debug, Clone)]
pub struct InodeReport {
    pub inumber: u32,
    pub inode: DiskInode,
    /// 间接索引块的非零表项
    pub indirect_blocks: Vec<u32>,
}

impl SimpleFileSystem {
    /// 从磁盘重新读出超级块，并收集所有有效索引节点
    pub fn debug(&self) -> Result<DebugReport> {
        let super_block = SuperBlock::decode(&self.read_block(0)?);

        let mut inodes = Vec::new();
        for block_index in 0..self.super_block().inode_blocks {
            let block = InodeBlock::decode(&self.read_block(1 + block_index)?);
            for (slot, inode) in block.0.iter().enumerate().filter(|(_, inode)| inode.valid) {
                let indirect_blocks = if self.super_block().is_data(inode.indirect) {
                    self.read_indirect(inode.indirect)?.blocks().collect()
                } else {
                    Vec::new()
                };

                inodes.push(InodeReport {
                    inumber: block_index * INODES_PER_BLOCK as u32 + slot as u32,
                    inode: *inode,
                    indirect_blocks,
                });
            }
        }

        Ok(DebugReport {
            super_block,
            inodes,
        })
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sb = &self.super_block;
        writeln!(f, "superblock:")?;
        if sb.is_valid() {
            writeln!(f, "    magic number is valid")?;
        } else {
            writeln!(f, "    magic number is invalid!")?;
        }
        writeln!(f, "    {} blocks", sb.total_blocks)?;
        writeln!(f, "    {} inode blocks", sb.inode_blocks)?;
        writeln!(f, "    {} inodes", sb.inodes)?;

        for report in &self.inodes {
            writeln!(f, "{report}")?;
        }

        Ok(())
    }
}

impl fmt::Display for InodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "inode {}:", self.inumber)?;
        writeln!(f, "    size: {} bytes", self.inode.size)?;
        write!(f, "    direct blocks:")?;
        for block_id in self.inode.direct_blocks() {
            write!(f, " {block_id}")?;
        }
        if self.inode.indirect != 0 {
            writeln!(f)?;
            writeln!(f, "    indirect block: {}", self.inode.indirect)?;
            write!(f, "    indirect data blocks:")?;
            for block_id in &self.indirect_blocks {
                write!(f, " {block_id}")?;
            }
        }

        Ok(())
    }
}
