//! 文件系统格式化
//!
//! 生成一个全新的 VSFS 镜像，布局从块 0 开始依次是：
//!
//! ```text
//! | superblock | journal (block_count 块) | inode 位图 | 数据位图 | inode 表 | 数据区 ... |
//! ```
//!
//! 根目录是 inode 0，目录项放在数据区第一块（`data_start`）。

use crate::{
    bitmap::set_bit,
    block::{BlockDev, BlockDevice},
    consts::*,
    dir::set_entry,
    error::{Error, ErrorKind, Result},
    hal::{timestamp, SystemHal},
    inode::write_inode,
    journal::{write_header, JournalConfig, JournalHeader},
    superblock::write_superblock,
    types::{DirEntry, Inode, Superblock},
};
use alloc::vec;

/// 格式化参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// 文件系统总块数
    pub total_blocks: u32,
    /// inode 总数
    pub inode_count: u32,
    /// journal 区域
    pub journal: JournalConfig,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            total_blocks: 64,
            inode_count: 64,
            journal: JournalConfig::default(),
        }
    }
}

impl FormatOptions {
    /// 按参数计算 superblock
    pub fn layout(&self) -> Result<Superblock> {
        if self.journal.start_block <= SUPERBLOCK_BLOCK as u32 || self.journal.block_count == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "journal region must follow the superblock",
            ));
        }
        if self.inode_count == 0 || self.inode_count > (BLOCK_SIZE * 8) as u32 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "inode count must fit in one bitmap block",
            ));
        }

        let inode_bitmap = self.journal.end_block();
        let data_bitmap = inode_bitmap + 1;
        let inode_start = data_bitmap + 1;
        let data_start = inode_start + self.inode_count.div_ceil(INODES_PER_BLOCK);
        if data_start >= self.total_blocks {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "image too small for the requested layout",
            ));
        }

        Ok(Superblock {
            magic: FS_MAGIC,
            block_size: BLOCK_SIZE as u32,
            total_blocks: self.total_blocks,
            inode_count: self.inode_count,
            journal_block: self.journal.start_block,
            inode_bitmap,
            data_bitmap,
            inode_start,
            data_start,
        })
    }
}

/// 格式化块设备
///
/// 元数据块全部清零后重写；数据区只写根目录块，其余块不动。
pub fn format<D: BlockDevice, H: SystemHal>(
    bdev: &mut BlockDev<D>,
    opts: &FormatOptions,
) -> Result<Superblock> {
    let sb = opts.layout()?;
    if sb.total_blocks as u64 > bdev.total_blocks() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "image has fewer blocks than requested",
        ));
    }

    let zero = vec![0u8; BLOCK_SIZE];
    for block_no in 0..=sb.data_start {
        bdev.write_block(block_no as u64, &zero)?;
    }

    write_superblock(bdev, &sb)?;
    write_header(bdev, &opts.journal, &JournalHeader::empty())?;

    // 根 inode 和根目录块已分配
    let mut bitmap = vec![0u8; BLOCK_SIZE];
    set_bit(&mut bitmap, ROOT_INODE)?;
    bdev.write_block(sb.inode_bitmap as u64, &bitmap)?;
    bdev.write_block(sb.data_bitmap as u64, &bitmap)?;

    let now = timestamp::<H>();
    let mut direct = [0u32; INODE_DIRECT_POINTERS];
    direct[0] = sb.data_start;
    let root = Inode {
        kind: INODE_TYPE_DIR,
        links: 2,
        size: 2 * DIRENT_SIZE as u32,
        direct,
        ctime: now,
        mtime: now,
    };
    write_inode(bdev, &sb, ROOT_INODE, &root)?;

    let mut dir = vec![0u8; BLOCK_SIZE];
    set_entry(&mut dir, 0, &DirEntry::new(ROOT_INODE, "."));
    set_entry(&mut dir, 1, &DirEntry::new(ROOT_INODE, ".."));
    bdev.write_block(sb.data_start as u64, &dir)?;

    bdev.flush()?;
    log::info!(
        "formatted image: {} blocks, {} inodes, journal {}..{}, data_start {}",
        sb.total_blocks,
        sb.inode_count,
        opts.journal.start_block,
        opts.journal.end_block(),
        sb.data_start
    );
    Ok(sb)
}
