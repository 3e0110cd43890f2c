//! Inode 写入

use super::InodeLocation;
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
    types::{Inode, Superblock},
};
use alloc::vec;

/// 把 inode 写进 inode 表块镜像的某个槽位（只改内存）
pub fn set_inode_in_block(block: &mut [u8], slot: usize, inode: &Inode) {
    let start = slot * INODE_SIZE;
    inode.encode(&mut block[start..start + INODE_SIZE]);
}

/// 直接把 inode 写回块设备（读-改-写所在块）
///
/// 不经过 journal，只用于格式化。
pub fn write_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    ino: u32,
    inode: &Inode,
) -> Result<()> {
    let loc = InodeLocation::of(ino);
    let block_no = loc.block_no(sb)? as u64;
    let mut block = vec![0u8; BLOCK_SIZE];
    bdev.read_block(block_no, &mut block)?;
    set_inode_in_block(&mut block, loc.slot, inode);
    bdev.write_block(block_no, &block)
}
