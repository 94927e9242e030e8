//! 空闲块位图
//!
//! 只存在于内存：每次挂载时根据索引节点表重建，随卷卸下而丢弃。
//! 置位表示"已占用"。

use alloc::vec;
use alloc::vec::Vec;

/// 位按 `u64` 分组
type BitGroup = u64;
const GROUP_BITS: usize = BitGroup::BITS as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    groups: Vec<BitGroup>,
    /// 位图所指示的块数
    blocks: usize,
}

/// 块编号
struct BlockId(u32);

impl Bitmap {
    /// `0..blocks` 内的编号初始均空闲。
    /// 最后一组的尾部位预先置位，永远不会被分配。
    pub fn new(blocks: usize) -> Self {
        let mut groups = vec![0; blocks.div_ceil(GROUP_BITS)];
        let tail = blocks % GROUP_BITS;
        if tail != 0 {
            if let Some(last) = groups.last_mut() {
                *last = BitGroup::MAX << tail;
            }
        }

        Self { groups, blocks }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks
    }

    /// 分配编号最小的空闲块，返回其编号。
    /// 若位图的空间用尽，则返回空。
    pub fn alloc(&mut self) -> Option<u32> {
        // 寻找还有剩余空间的bit组(即还有0)，再取其最低的0位
        let (group_index, ingroup_index) =
            self.groups
                .iter()
                .enumerate()
                .find_map(|(group_index, &bits)| {
                    (bits != BitGroup::MAX).then_some((group_index, bits.trailing_ones()))
                })?;

        self.groups[group_index] |= 1 << ingroup_index;
        Some(BlockId::encode(group_index, ingroup_index as usize))
    }

    /// 将`block_id`标为空闲。
    /// 不检查归属，调用者只释放自己拥有的块。
    pub fn dealloc(&mut self, block_id: u32) {
        if !self.contains(block_id) {
            log::warn!("dealloc of block {block_id} outside bitmap of {}", self.blocks);
            return;
        }
        let (group_index, ingroup_index) = BlockId(block_id).decode();
        self.groups[group_index] &= !(1 << ingroup_index);
    }

    /// 将`block_id`标为占用；越界则返回`false`
    pub fn mark(&mut self, block_id: u32) -> bool {
        if !self.contains(block_id) {
            return false;
        }
        let (group_index, ingroup_index) = BlockId(block_id).decode();
        self.groups[group_index] |= 1 << ingroup_index;

        true
    }

    pub fn is_used(&self, block_id: u32) -> bool {
        if !self.contains(block_id) {
            return false;
        }
        let (group_index, ingroup_index) = BlockId(block_id).decode();

        self.groups[group_index] & (1 << ingroup_index) != 0
    }

    pub fn used_count(&self) -> usize {
        (0..self.blocks as u32).filter(|&id| self.is_used(id)).count()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.blocks - self.used_count()
    }

    /// 当前占用的编号，升序
    pub fn used_blocks(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.blocks as u32).filter(|&id| self.is_used(id))
    }

    #[inline]
    fn contains(&self, block_id: u32) -> bool {
        (block_id as usize) < self.blocks
    }
}

impl BlockId {
    #[inline]
    fn encode(group_index: usize, ingroup_index: usize) -> u32 {
        (group_index * GROUP_BITS + ingroup_index) as u32
    }

    #[inline]
    fn decode(self) -> (usize, usize) {
        let block_id = self.0 as usize;
        (block_id / GROUP_BITS, block_id % GROUP_BITS)
    }
}
