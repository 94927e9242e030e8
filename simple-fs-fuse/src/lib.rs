//! Host-side tooling for SimpleFS images: a [`BlockDevice`] backed by a
//! regular file, used by the `simple-fs-packer` binary.
//!
//! [`BlockDevice`]: block_dev::BlockDevice

#[cfg(test)]
mod tests;

mod block_file;

pub use self::block_file::BlockFile;
