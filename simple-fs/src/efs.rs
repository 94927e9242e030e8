//! # 磁盘块管理器层
//!
//! [`SimpleFileSystem`] 由 [`SimpleFileSystem::mount`] 产生，
//! 持有只在挂载期间存在的一切：超级块的副本，以及根据索引节点表重建的空闲块位图。

use core::fmt;

use alloc::sync::Arc;
use block_dev::BlockDevice;
use spin::Mutex;

use crate::layout::*;
use crate::{BLOCK_SIZE, DataBlock, Error, Result};

/// 多线程共享已挂载卷时的唯一互斥域
pub type SharedFileSystem = Arc<Mutex<SimpleFileSystem>>;

pub struct SimpleFileSystem {
    block_device: Arc<dyn BlockDevice>,
    super_block: SuperBlock,
    bitmap: Bitmap,
}

impl SimpleFileSystem {
    /// 写入超级块与空的索引节点表。
    /// 数据块保持原样：索引节点表清零后便无从访问它们。
    pub fn format(block_device: &Arc<dyn BlockDevice>) -> Result<SuperBlock> {
        let device_blocks = block_device.num_blocks();
        let total_blocks =
            u32::try_from(device_blocks).map_err(|_| Error::TooLarge(device_blocks))?;
        let super_block = SuperBlock::new(total_blocks).ok_or(Error::TooLarge(device_blocks))?;
        // 至少容纳超级块与索引节点表
        if super_block.data_start() > total_blocks {
            return Err(Error::TooSmall(device_blocks));
        }

        write_block(&**block_device, 0, &super_block.encode())?;
        let empty = InodeBlock::EMPTY.encode();
        for block_id in 1..super_block.data_start() {
            write_block(&**block_device, block_id, &empty)?;
        }

        log::info!(
            "formatted {total_blocks} blocks: {} inode blocks, {} inodes",
            super_block.inode_blocks,
            super_block.inodes
        );
        Ok(super_block)
    }

    /// 校验超级块，并遍历所有有效索引节点以重建位图
    pub fn mount(block_device: Arc<dyn BlockDevice>) -> Result<Self> {
        let super_block = SuperBlock::decode(&read_block(&*block_device, 0)?);
        if !super_block.is_valid() {
            return Err(Error::BadMagic(super_block.magic()));
        }
        if !super_block.fits(block_device.num_blocks()) {
            return Err(Error::Corrupt);
        }

        let mut efs = Self {
            block_device,
            super_block,
            bitmap: Bitmap::new(super_block.total_blocks as usize),
        };
        efs.rebuild_bitmap()?;

        log::info!(
            "mounted {} blocks, {} in use",
            super_block.total_blocks,
            efs.bitmap.used_count()
        );
        Ok(efs)
    }

    #[inline]
    pub fn into_shared(self) -> SharedFileSystem {
        Arc::new(Mutex::new(self))
    }

    #[inline]
    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    #[inline]
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    #[inline]
    pub fn block_device(&self) -> &Arc<dyn BlockDevice> {
        &self.block_device
    }

    /// 占用编号最小的空闲索引节点(从不为 0)并返回其编号
    pub fn create(&mut self) -> Result<u32> {
        for block_index in 0..self.super_block.inode_blocks {
            let block_id = 1 + block_index;
            let mut inodes = InodeBlock::decode(&self.read_block(block_id)?);

            let first_free = inodes
                .0
                .iter()
                .enumerate()
                .map(|(slot, inode)| (block_index * INODES_PER_BLOCK as u32 + slot as u32, inode))
                .find_map(|(inumber, inode)| (inumber != 0 && !inode.valid).then_some(inumber));
            let Some(inumber) = first_free else {
                continue;
            };

            inodes.0[inumber as usize % INODES_PER_BLOCK].init();
            self.write_block(block_id, &inodes.encode())?;
            log::debug!("created inode {inumber}");
            return Ok(inumber);
        }

        Err(Error::NoFreeInode)
    }

    /// 释放`inumber`拥有的所有块，并使其无效
    pub fn delete(&mut self, inumber: u32) -> Result<()> {
        let mut inode = self.inode(inumber)?;
        let indirect = if self.super_block.is_data(inode.indirect) {
            Some(self.read_indirect(inode.indirect)?)
        } else {
            None
        };

        let direct = inode.direct;
        let indirect_block = inode.indirect;
        inode.clear();
        self.store_inode(inumber, &inode)?;

        for block_id in direct.into_iter().filter(|&id| id != 0) {
            self.release(block_id);
        }
        if let Some(indirect) = indirect {
            for block_id in indirect.blocks() {
                self.release(block_id);
            }
            self.release(indirect_block);
        }

        log::debug!("deleted inode {inumber}");
        Ok(())
    }

    /// 有效索引节点的文件大小
    #[inline]
    pub fn size(&self, inumber: u32) -> Result<u32> {
        self.inode(inumber).map(|inode| inode.size)
    }

    /// 有效索引节点的记录
    pub fn inode(&self, inumber: u32) -> Result<DiskInode> {
        let inode = self.load_inode(inumber)?;
        if !inode.valid {
            return Err(Error::InvalidInode(inumber));
        }

        Ok(inode)
    }
}

impl SimpleFileSystem {
    /// 索引节点编号 → **块编号**与**块内槽位**
    #[inline]
    fn inode_pos(inumber: u32) -> (u32, usize) {
        let block_id = 1 + inumber / INODES_PER_BLOCK as u32;
        let slot = inumber as usize % INODES_PER_BLOCK;

        (block_id, slot)
    }

    fn load_inode(&self, inumber: u32) -> Result<DiskInode> {
        if inumber == 0 || inumber >= self.super_block.inodes {
            return Err(Error::InvalidInode(inumber));
        }
        let (block_id, slot) = Self::inode_pos(inumber);

        Ok(InodeBlock::decode(&self.read_block(block_id)?).0[slot])
    }

    pub(crate) fn store_inode(&self, inumber: u32, inode: &DiskInode) -> Result<()> {
        let (block_id, slot) = Self::inode_pos(inumber);
        let mut inodes = InodeBlock::decode(&self.read_block(block_id)?);
        inodes.0[slot] = *inode;

        self.write_block(block_id, &inodes.encode())
    }

    #[inline]
    pub(crate) fn read_indirect(&self, block_id: u32) -> Result<IndirectBlock> {
        Ok(IndirectBlock::decode(&self.read_block(block_id)?))
    }

    #[inline]
    pub(crate) fn read_block(&self, block_id: u32) -> Result<DataBlock> {
        read_block(&*self.block_device, block_id)
    }

    #[inline]
    pub(crate) fn write_block(&self, block_id: u32, block: &DataBlock) -> Result<()> {
        write_block(&*self.block_device, block_id, block)
    }

    /// 分配编号最小的空闲数据块；设备已满则返回空
    pub(crate) fn alloc_block(&mut self) -> Option<u32> {
        let block_id = self.bitmap.alloc();
        match block_id {
            Some(block_id) => log::debug!("allocated block {block_id}"),
            None => log::warn!("no free block left on the device"),
        }

        block_id
    }

    /// 将数据块归还位图。
    /// 无论损坏的指针指向哪里，元数据区都不会被释放。
    fn release(&mut self, block_id: u32) {
        if !self.super_block.is_data(block_id) {
            log::warn!("refusing to release block {block_id}");
            return;
        }
        self.bitmap.dealloc(block_id);
    }

    /// 先标记元数据区，再标记有效索引节点可达的每个块：
    /// 直接索引、间接索引块及其表项。
    fn rebuild_bitmap(&mut self) -> Result<()> {
        let mut bitmap = Bitmap::new(self.super_block.total_blocks as usize);
        for block_id in 0..self.super_block.data_start() {
            bitmap.mark(block_id);
        }

        for block_index in 0..self.super_block.inode_blocks {
            let inodes = InodeBlock::decode(&self.read_block(1 + block_index)?);
            let valid = inodes.0.iter().enumerate().filter(|(_, inode)| inode.valid);

            for (slot, inode) in valid {
                let inumber = block_index * INODES_PER_BLOCK as u32 + slot as u32;
                for block_id in inode.direct_blocks() {
                    self.claim(&mut bitmap, inumber, block_id);
                }
                if inode.indirect != 0 && self.claim(&mut bitmap, inumber, inode.indirect) {
                    for block_id in self.read_indirect(inode.indirect)?.blocks() {
                        self.claim(&mut bitmap, inumber, block_id);
                    }
                }
            }
        }

        self.bitmap = bitmap;
        Ok(())
    }

    /// 标记`inumber`中的指针。
    /// 指向元数据区或越过设备的指针不可信。
    fn claim(&self, bitmap: &mut Bitmap, inumber: u32, block_id: u32) -> bool {
        if !self.super_block.is_data(block_id) || !bitmap.mark(block_id) {
            log::warn!("inode {inumber} has a bad block pointer {block_id}, ignored");
            return false;
        }

        true
    }
}

impl fmt::Debug for SimpleFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleFileSystem")
            .field("super_block", &self.super_block)
            .field("used_blocks", &self.bitmap.used_count())
            .finish_non_exhaustive()
    }
}

fn read_block(block_device: &dyn BlockDevice, block_id: u32) -> Result<DataBlock> {
    let mut block = [0; BLOCK_SIZE];
    block_device.read_block(block_id as usize, &mut block)?;

    Ok(block)
}

fn write_block(block_device: &dyn BlockDevice, block_id: u32, block: &DataBlock) -> Result<()> {
    block_device.write_block(block_id as usize, block)?;

    Ok(())
}
