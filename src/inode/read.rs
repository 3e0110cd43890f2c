//! Inode 读取

use super::InodeLocation;
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
    types::{Inode, Superblock},
};
use alloc::vec;

/// 从 inode 表块镜像中取出某个槽位
pub fn inode_in_block(block: &[u8], slot: usize) -> Inode {
    let start = slot * INODE_SIZE;
    Inode::decode(&block[start..start + INODE_SIZE])
}

/// 从块设备读取 inode
pub fn read_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    ino: u32,
) -> Result<Inode> {
    let loc = InodeLocation::of(ino);
    let mut block = vec![0u8; BLOCK_SIZE];
    bdev.read_block(loc.block_no(sb)? as u64, &mut block)?;
    Ok(inode_in_block(&block, loc.slot))
}
