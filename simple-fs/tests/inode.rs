mod common;

use std::collections::BTreeSet;

use simple_fs::{BLOCK_SIZE, BlockDevice, DiskInode, Error, INODES_PER_BLOCK, InodeBlock};

use common::{mounted, pattern, reachable, remount};

fn raw_inode(fs: &simple_fs::SimpleFileSystem, inumber: u32) -> DiskInode {
    let block_id = 1 + inumber as usize / INODES_PER_BLOCK;
    let mut raw = [0; BLOCK_SIZE];
    fs.block_device().read_block(block_id, &mut raw).unwrap();

    InodeBlock::decode(&raw).0[inumber as usize % INODES_PER_BLOCK]
}

#[test]
fn ids_start_at_one_and_reuse_lowest() {
    let (_, mut fs) = mounted(100);
    assert_eq!(1, fs.create().unwrap());
    assert_eq!(2, fs.create().unwrap());
    assert_eq!(3, fs.create().unwrap());

    fs.delete(2).unwrap();
    assert_eq!(2, fs.create().unwrap());
    assert_eq!(4, fs.create().unwrap());

    let inode = fs.inode(4).unwrap();
    assert!(inode.valid);
    assert_eq!(0, inode.size);
    assert_eq!(0, inode.direct_blocks().count());
    assert_eq!(0, inode.indirect);
}

#[test]
fn slot_zero_is_never_handed_out() {
    let (_, fs) = mounted(100);
    assert_eq!(Err(Error::InvalidInode(0)), fs.inode(0));
    assert!(!raw_inode(&fs, 0).valid);
}

#[test]
fn table_fills_up() {
    // one inode block: ids 1..=127
    let (_, mut fs) = mounted(10);
    assert_eq!(128, fs.super_block().inodes);

    let ids: Vec<u32> = (0..127).map(|_| fs.create().unwrap()).collect();
    assert_eq!((1..128).collect::<Vec<_>>(), ids);
    assert_eq!(Err(Error::NoFreeInode), fs.create());

    fs.delete(64).unwrap();
    assert_eq!(64, fs.create().unwrap());
}

#[test]
fn ids_cross_inode_blocks() {
    let (_, mut fs) = mounted(20);
    for _ in 1..INODES_PER_BLOCK {
        fs.create().unwrap();
    }

    let inumber = fs.create().unwrap();
    assert_eq!(128, inumber);
    // block 2, slot 0
    let mut raw = [0; BLOCK_SIZE];
    fs.block_device().read_block(2, &mut raw).unwrap();
    assert!(InodeBlock::decode(&raw).0[0].valid);
}

#[test]
fn created_inode_is_persisted() {
    let (disk, mut fs) = mounted(100);
    let inumber = fs.create().unwrap();
    drop(fs);

    let mut fs = remount(&disk);
    assert_eq!(0, fs.size(inumber).unwrap());
    assert_eq!(inumber + 1, fs.create().unwrap());
}

#[test]
fn delete_frees_owned_blocks() {
    let (_, mut fs) = mounted(100);
    let keep = fs.create().unwrap();
    let doomed = fs.create().unwrap();
    fs.write(keep, &pattern(2 * BLOCK_SIZE, 1), 0).unwrap();
    fs.write(doomed, &pattern(9 * BLOCK_SIZE, 2), 0).unwrap();

    let kept: BTreeSet<u32> = reachable(&fs, keep).into_iter().collect();
    let owned = reachable(&fs, doomed);
    let used = fs.bitmap().used_count();

    fs.delete(doomed).unwrap();
    assert_eq!(used - owned.len(), fs.bitmap().used_count());
    for block_id in owned {
        assert!(!fs.bitmap().is_used(block_id));
    }
    for &block_id in &kept {
        assert!(fs.bitmap().is_used(block_id));
    }

    assert_eq!(DiskInode::EMPTY, raw_inode(&fs, doomed));
    assert_eq!(Err(Error::InvalidInode(doomed)), fs.size(doomed));
    assert_eq!(Err(Error::InvalidInode(doomed)), fs.delete(doomed));
}

#[test]
fn freed_blocks_are_reused() {
    let (_, mut fs) = mounted(100);
    let first = fs.create().unwrap();
    fs.write(first, &pattern(3 * BLOCK_SIZE, 0), 0).unwrap();
    let blocks = reachable(&fs, first);
    fs.delete(first).unwrap();

    let second = fs.create().unwrap();
    assert_eq!(first, second);
    fs.write(second, &pattern(3 * BLOCK_SIZE, 7), 0).unwrap();
    assert_eq!(blocks, reachable(&fs, second));
}

#[test]
fn invalid_delete_changes_nothing() {
    let (disk, mut fs) = mounted(100);
    let live = fs.create().unwrap();
    fs.write(live, b"payload", 0).unwrap();
    let before = disk.snapshot();
    let bitmap = fs.bitmap().clone();

    for inumber in [0, live + 1, fs.super_block().inodes, u32::MAX] {
        assert_eq!(Err(Error::InvalidInode(inumber)), fs.delete(inumber));
    }
    assert_eq!(before, disk.snapshot());
    assert_eq!(&bitmap, fs.bitmap());
}
