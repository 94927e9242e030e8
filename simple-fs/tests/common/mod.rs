//! Helpers shared by the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use block_dev::RamDisk;
use simple_fs::{BLOCK_SIZE, BlockDevice, InodeBlock, SimpleFileSystem};

/// Formats a RAM disk of `blocks` blocks and mounts it.
pub fn mounted(blocks: usize) -> (Arc<RamDisk>, SimpleFileSystem) {
    let disk = Arc::new(RamDisk::new(blocks));
    let device: Arc<dyn BlockDevice> = disk.clone();
    SimpleFileSystem::format(&device).unwrap();
    let fs = SimpleFileSystem::mount(device).unwrap();

    (disk, fs)
}

/// Mounts the same device again, as after a restart.
pub fn remount(disk: &Arc<RamDisk>) -> SimpleFileSystem {
    SimpleFileSystem::mount(disk.clone()).unwrap()
}

/// Recognisable, non-repeating-per-block content.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i % 251) as u8 ^ (i / BLOCK_SIZE) as u8 ^ seed)
        .collect()
}

/// Every block reachable from a valid inode: direct pointers, the indirect
/// block and its entries.
pub fn reachable(fs: &SimpleFileSystem, inumber: u32) -> Vec<u32> {
    let inode = fs.inode(inumber).unwrap();
    let mut blocks: Vec<u32> = inode.direct_blocks().collect();
    if inode.indirect != 0 {
        blocks.push(inode.indirect);
        let mut raw = [0; BLOCK_SIZE];
        fs.block_device()
            .read_block(inode.indirect as usize, &mut raw)
            .unwrap();
        blocks.extend(simple_fs::IndirectBlock::decode(&raw).blocks());
    }

    blocks
}

/// Applies `f` to the raw inode table entry of `inumber`, bypassing the
/// file system, to simulate corruption.
pub fn patch_inode(disk: &RamDisk, inumber: u32, f: impl FnOnce(&mut simple_fs::DiskInode)) {
    let block_id = 1 + inumber as usize / simple_fs::INODES_PER_BLOCK;
    let mut raw = [0; BLOCK_SIZE];
    disk.read_block(block_id, &mut raw).unwrap();
    let mut inodes = InodeBlock::decode(&raw);
    f(&mut inodes.0[inumber as usize % simple_fs::INODES_PER_BLOCK]);
    disk.write_block(block_id, &inodes.encode()).unwrap();
}
