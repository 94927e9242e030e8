use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use block_dev::{BLOCK_SIZE, BlockDevice, DeviceError};

/// Disk image on the host, one [`BLOCK_SIZE`] block after another.
#[derive(Debug)]
pub struct BlockFile {
    file: Mutex<File>,
    num_blocks: usize,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl BlockFile {
    /// Opens or creates an image of exactly `num_blocks` blocks. Existing
    /// content is kept; the file is grown or cut to size.
    pub fn create(path: impl AsRef<Path>, num_blocks: usize) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        fd.set_len((num_blocks * BLOCK_SIZE) as u64)?;

        Ok(Self::new(fd, num_blocks))
    }

    /// Opens an existing image; its length decides the block count.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let fd = OpenOptions::new().read(true).write(true).open(path)?;
        let num_blocks = fd.metadata()?.len() as usize / BLOCK_SIZE;

        Ok(Self::new(fd, num_blocks))
    }

    fn new(fd: File, num_blocks: usize) -> Self {
        Self {
            file: Mutex::new(fd),
            num_blocks,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn access<T>(
        &self,
        block_id: usize,
        f: impl FnOnce(&mut File) -> io::Result<T>,
    ) -> Result<T, DeviceError> {
        let mut file = self.file.lock().map_err(|_| DeviceError::Io { block_id })?;
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .and_then(|_| f(&mut *file))
            .map_err(|err| {
                log::error!("block {block_id}: {err}");
                DeviceError::Io { block_id }
            })
    }
}

impl BlockDevice for BlockFile {
    #[inline]
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError> {
        self.check_access(block_id, buf.len())?;
        self.access(block_id, |file| file.read_exact(buf))?;
        self.reads.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError> {
        self.check_access(block_id, buf.len())?;
        self.access(block_id, |file| file.write_all(buf))?;
        self.writes.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }
}
