//! Superblock 读取

use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
    types::Superblock,
};
use alloc::vec;

/// 从块设备读取 superblock
///
/// 不校验魔数，由调用者通过 [`Superblock::is_valid`] 判断。
pub fn read_superblock<D: BlockDevice>(bdev: &mut BlockDev<D>) -> Result<Superblock> {
    let mut block = vec![0u8; BLOCK_SIZE];
    bdev.read_block(SUPERBLOCK_BLOCK, &mut block)?;
    Superblock::decode(&block)
}
