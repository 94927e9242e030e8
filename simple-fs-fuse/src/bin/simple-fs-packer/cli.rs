use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(about = "Build and inspect SimpleFS disk images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create (or resize) an image and write an empty file system to it
    Format {
        /// Image file
        #[arg(long, short)]
        image: PathBuf,

        /// Image size in 4 KiB blocks
        #[arg(long, short, default_value_t = 1024)]
        blocks: usize,
    },

    /// Print the superblock and every live inode
    Debug {
        /// Image file
        #[arg(long, short)]
        image: PathBuf,
    },

    /// Copy host files into new inodes
    Pack {
        /// Image file
        #[arg(long, short)]
        image: PathBuf,

        /// Host files, one inode each
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Copy an inode's content out to a host file
    Unpack {
        /// Image file
        #[arg(long, short)]
        image: PathBuf,

        /// Inode id
        #[arg(long, short = 'n')]
        inode: u32,

        /// Output file
        #[arg(long, short = 'O')]
        out: PathBuf,
    },
}
