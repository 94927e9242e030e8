use block_dev::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
    #[error("magic number mismatch: {0:#x}")]
    BadMagic(u32),
    #[error("superblock geometry does not match the device")]
    Corrupt,
    #[error("device of {0} blocks is too small for a volume")]
    TooSmall(usize),
    #[error("device of {0} blocks exceeds 32-bit block ids")]
    TooLarge(usize),
    #[error("inode {0} is out of range or not allocated")]
    InvalidInode(u32),
    #[error("no free inode")]
    NoFreeInode,
}

pub type Result<T> = core::result::Result<T, Error>;
