use std::sync::Arc;

use block_dev::{BLOCK_SIZE, BlockDevice, DeviceError};
use simple_fs::{SimpleFileSystem, Volume};

use crate::BlockFile;

#[test]
fn image_has_requested_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fs.img");

    let file = BlockFile::create(&path, 16).unwrap();
    assert_eq!(16, file.num_blocks());
    assert_eq!(16 * BLOCK_SIZE as u64, std::fs::metadata(&path).unwrap().len());

    drop(file);
    assert_eq!(16, BlockFile::open(&path).unwrap().num_blocks());
}

#[test]
fn blocks_round_trip_and_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let file = BlockFile::create(dir.path().join("fs.img"), 4).unwrap();

    let block = [0x5a; BLOCK_SIZE];
    file.write_block(3, &block).unwrap();
    let mut buf = [0; BLOCK_SIZE];
    file.read_block(3, &mut buf).unwrap();
    assert_eq!(block, buf);
    file.read_block(0, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));

    assert_eq!(2, file.reads());
    assert_eq!(1, file.writes());
}

#[test]
fn bad_access_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = BlockFile::create(dir.path().join("fs.img"), 4).unwrap();
    let mut buf = [0; BLOCK_SIZE];

    assert_eq!(
        Err(DeviceError::OutOfRange {
            block_id: 4,
            num_blocks: 4
        }),
        file.read_block(4, &mut buf)
    );
    assert_eq!(
        Err(DeviceError::BadBuffer { len: 10 }),
        file.write_block(0, &buf[..10])
    );
    assert_eq!(0, file.reads() + file.writes());
}

#[test]
fn volume_on_image_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fs.img");

    let inumber = {
        let mut volume = Volume::new(Arc::new(BlockFile::create(&path, 64).unwrap()));
        assert!(volume.format());
        assert!(volume.mount());
        let inumber = volume.create();
        assert_eq!(11, volume.write(inumber, b"hello image", 11, 0));
        inumber
    };

    let fs = SimpleFileSystem::mount(Arc::new(BlockFile::open(&path).unwrap())).unwrap();
    let mut buf = [0; 11];
    assert_eq!(11, fs.read(inumber, &mut buf, 0).unwrap());
    assert_eq!(b"hello image", &buf);
}
