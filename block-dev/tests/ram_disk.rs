use block_dev::{BLOCK_SIZE, BlockDevice, DeviceError, RamDisk};

#[test]
fn starts_zeroed() {
    let disk = RamDisk::new(3);
    assert_eq!(3, disk.num_blocks());
    assert_eq!(3 * BLOCK_SIZE, disk.snapshot().len());
    assert!(disk.snapshot().iter().all(|&b| b == 0));
}

#[test]
fn blocks_are_independent() {
    let disk = RamDisk::new(3);
    disk.write_block(1, &[7; BLOCK_SIZE]).unwrap();

    let mut buf = [0; BLOCK_SIZE];
    disk.read_block(1, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 7));
    disk.read_block(2, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));

    assert_eq!(2, disk.reads());
    assert_eq!(1, disk.writes());
}

#[test]
fn rejects_bad_access() {
    let disk = RamDisk::new(2);
    let mut buf = [0; BLOCK_SIZE];

    assert_eq!(
        Err(DeviceError::OutOfRange {
            block_id: 2,
            num_blocks: 2
        }),
        disk.read_block(2, &mut buf)
    );
    assert_eq!(
        Err(DeviceError::BadBuffer { len: BLOCK_SIZE + 1 }),
        disk.write_block(0, &[0; BLOCK_SIZE + 1])
    );
    assert_eq!(0, disk.reads() + disk.writes());
}
