//! # 数据传输层
//!
//! 文件内字节位置 `pos` 位于逻辑块 `pos / BLOCK_SIZE`，块内偏移为 `pos % BLOCK_SIZE`。
//! 小于 [`DIRECT_COUNT`] 的逻辑块来自直接索引，其余来自间接索引块。
//!
//! 读遇到第一个空洞即停止；写则分配块填补空洞。

use crate::layout::{DIRECT_COUNT, DiskInode, IndirectBlock, MAX_FILE_BLOCKS};
use crate::{BLOCK_SIZE, Result, SimpleFileSystem};

impl SimpleFileSystem {
    /// 从指定位置(字节偏移)读出数据填充`buf`，不越过文件大小。
    /// 返回读出的字节数；遇到从未写入的块时会提前结束。
    pub fn read(&self, inumber: u32, buf: &mut [u8], offset: usize) -> Result<usize> {
        let inode = self.inode(inumber)?;
        let size = inode.size as usize;
        if offset >= size {
            return Ok(0);
        }
        let end = offset.saturating_add(buf.len()).min(size);

        // 间接索引块，首次用到时才读入
        let mut indirect = None;
        let mut start = offset;
        let mut read_size = 0;
        while start < end {
            let block_index = start / BLOCK_SIZE;
            // 当前块的末地址(字节)
            let current_block_end = ((block_index + 1) * BLOCK_SIZE).min(end);
            let block_read_size = current_block_end - start;

            let block_id = self.block_id(&inode, &mut indirect, block_index)?;
            if block_id == 0 {
                log::debug!("inode {inumber}: hole at logical block {block_index}");
                break;
            }

            let data_block = self.read_block(block_id)?;
            let src = &data_block[start % BLOCK_SIZE..start % BLOCK_SIZE + block_read_size];
            buf[read_size..read_size + block_read_size].copy_from_slice(src);

            read_size += block_read_size;
            start = current_block_end;
        }

        Ok(read_size)
    }

    /// 向指定位置写入`data`，按需分配块。
    ///
    /// 设备的块用尽或文件达到 [`MAX_FILE_BLOCKS`] 时提前停止，
    /// 此前写入的数据保留并计入返回值。
    /// 若 `offset + written` 更大，文件随之增长。
    pub fn write(&mut self, inumber: u32, data: &[u8], offset: usize) -> Result<usize> {
        let mut inode = self.inode(inumber)?;
        let original = inode;
        let end = offset.saturating_add(data.len());

        let mut indirect = None;
        let mut start = offset;
        let mut written_size = 0;
        while start < end {
            let block_index = start / BLOCK_SIZE;
            let Some((block_id, fresh)) = self.map_block(&mut inode, &mut indirect, block_index)?
            else {
                log::warn!(
                    "inode {inumber}: short write, {written_size} of {} bytes",
                    data.len()
                );
                break;
            };
            let current_block_end = ((block_index + 1) * BLOCK_SIZE).min(end);
            let block_write_size = current_block_end - start;

            // 新分配的块无需读出
            let mut data_block = if fresh {
                [0; BLOCK_SIZE]
            } else {
                self.read_block(block_id)?
            };
            let dest = &mut data_block[start % BLOCK_SIZE..start % BLOCK_SIZE + block_write_size];
            dest.copy_from_slice(&data[written_size..written_size + block_write_size]);
            self.write_block(block_id, &data_block)?;

            written_size += block_write_size;
            start = current_block_end;
        }

        if written_size > 0 && offset + written_size > inode.size as usize {
            // 不超过 MAX_FILE_BLOCKS * BLOCK_SIZE
            inode.size = (offset + written_size) as u32;
        }
        if inode != original {
            self.store_inode(inumber, &inode)?;
        }

        Ok(written_size)
    }
}

impl SimpleFileSystem {
    /// 逻辑块 `block_index` 对应的物理块，空洞为 0。
    /// 指向元数据区或越过设备的指针同样视为空洞。
    fn block_id(
        &self,
        inode: &DiskInode,
        indirect: &mut Option<IndirectBlock>,
        block_index: usize,
    ) -> Result<u32> {
        if block_index < DIRECT_COUNT {
            return Ok(self.data_pointer(inode.direct[block_index]));
        }
        if block_index >= MAX_FILE_BLOCKS || self.data_pointer(inode.indirect) == 0 {
            return Ok(0);
        }

        let table = match indirect.take() {
            Some(table) => table,
            None => self.read_indirect(inode.indirect)?,
        };

        Ok(self.data_pointer(indirect.insert(table).0[block_index - DIRECT_COUNT]))
    }

    /// 同 [`Self::block_id`]，但会为空洞分配块（包括间接索引块本身）。
    /// 返回块编号及其是否新分配；无法分配或遇到坏指针时返回空。
    fn map_block(
        &mut self,
        inode: &mut DiskInode,
        indirect: &mut Option<IndirectBlock>,
        block_index: usize,
    ) -> Result<Option<(u32, bool)>> {
        if block_index >= MAX_FILE_BLOCKS {
            log::warn!("logical block {block_index} is past the largest file");
            return Ok(None);
        }

        if block_index < DIRECT_COUNT {
            if inode.direct[block_index] != 0 {
                return Ok(self.trusted(inode.direct[block_index]));
            }
            let Some(block_id) = self.alloc_block() else {
                return Ok(None);
            };
            inode.direct[block_index] = block_id;
            return Ok(Some((block_id, true)));
        }

        if inode.indirect == 0 {
            let Some(block_id) = self.alloc_block() else {
                return Ok(None);
            };
            // 先写入全零的索引块，再让任何表项指向数据
            self.write_block(block_id, &IndirectBlock::EMPTY.encode())?;
            inode.indirect = block_id;
            *indirect = Some(IndirectBlock::EMPTY);
        } else if self.trusted(inode.indirect).is_none() {
            return Ok(None);
        }

        let table = match indirect.take() {
            Some(table) => table,
            None => self.read_indirect(inode.indirect)?,
        };
        let table = indirect.insert(table);
        let slot = block_index - DIRECT_COUNT;
        if table.0[slot] != 0 {
            let block_id = table.0[slot];
            return Ok(self.trusted(block_id));
        }

        let Some(block_id) = self.alloc_block() else {
            return Ok(None);
        };
        table.0[slot] = block_id;
        self.write_block(inode.indirect, &table.encode())?;

        Ok(Some((block_id, true)))
    }

    /// 坏指针读作 0
    #[inline]
    fn data_pointer(&self, block_id: u32) -> u32 {
        if block_id != 0 && !self.super_block().is_data(block_id) {
            log::warn!("bad block pointer {block_id}, read as a hole");
            return 0;
        }

        block_id
    }

    /// 已有的非零指针：可写入则返回 `(block_id, false)`
    fn trusted(&self, block_id: u32) -> Option<(u32, bool)> {
        if !self.super_block().is_data(block_id) {
            log::warn!("bad block pointer {block_id}, write stopped");
            return None;
        }

        Some((block_id, false))
    }
}
