mod cli;

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use simple_fs::{BlockDevice, SimpleFileSystem};
use simple_fs_fuse::BlockFile;

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let block_file = match cli.command {
        Command::Format { image, blocks } => format(&image, blocks)?,
        Command::Debug { image } => debug(&image)?,
        Command::Pack { image, files } => pack(&image, &files)?,
        Command::Unpack { image, inode, out } => unpack(&image, inode, &out)?,
    };

    log::info!(
        "{} disk block reads, {} disk block writes",
        block_file.reads(),
        block_file.writes()
    );
    Ok(())
}

fn format(image: &Path, blocks: usize) -> io::Result<Arc<BlockFile>> {
    let block_file = Arc::new(BlockFile::create(image, blocks)?);
    let device: Arc<dyn BlockDevice> = block_file.clone();
    let super_block = SimpleFileSystem::format(&device).map_err(fs_error)?;
    println!(
        "{}: {} blocks, {} inodes",
        image.display(),
        super_block.total_blocks,
        super_block.inodes
    );

    Ok(block_file)
}

fn debug(image: &Path) -> io::Result<Arc<BlockFile>> {
    let (block_file, fs) = mount(image)?;
    print!("{}", fs.debug().map_err(fs_error)?);

    Ok(block_file)
}

fn pack(image: &Path, files: &[impl AsRef<Path>]) -> io::Result<Arc<BlockFile>> {
    let (block_file, mut fs) = mount(image)?;

    for file in files {
        let file = file.as_ref();
        let data = fs::read(file)?;
        let inumber = fs.create().map_err(fs_error)?;
        let written = fs.write(inumber, &data, 0).map_err(fs_error)?;
        if written < data.len() {
            log::warn!(
                "{}: only {written} of {} bytes fit",
                file.display(),
                data.len()
            );
        }
        println!("inode {inumber} <- {} ({written} bytes)", file.display());
    }

    Ok(block_file)
}

fn unpack(image: &Path, inumber: u32, out: &Path) -> io::Result<Arc<BlockFile>> {
    let (block_file, fs) = mount(image)?;

    let mut data = vec![0; fs.size(inumber).map_err(fs_error)? as usize];
    let read = fs.read(inumber, &mut data, 0).map_err(fs_error)?;
    data.truncate(read);
    fs::write(out, &data)?;
    println!("inode {inumber} -> {} ({read} bytes)", out.display());

    Ok(block_file)
}

fn mount(image: &Path) -> io::Result<(Arc<BlockFile>, SimpleFileSystem)> {
    let block_file = Arc::new(BlockFile::open(image)?);
    let fs = SimpleFileSystem::mount(block_file.clone()).map_err(fs_error)?;

    Ok((block_file, fs))
}

fn fs_error(err: simple_fs::Error) -> io::Error {
    io::Error::other(err)
}
