//! Inode 操作模块
//!
//! inode 表从 `inode_start` 开始，每块 32 个 128 字节的 inode。
//! 结构定义见 [`crate::types::Inode`]。

mod read;
mod write;

pub use read::*;
pub use write::*;

use crate::consts::INODES_PER_BLOCK;
use crate::error::{Error, ErrorKind, Result};
use crate::types::Superblock;

/// inode 在 inode 表中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeLocation {
    /// inode 表内的块序号（相对 `inode_start`）
    pub table_block: u32,
    /// 块内槽位
    pub slot: usize,
}

impl InodeLocation {
    /// 计算 inode 的位置
    pub fn of(ino: u32) -> Self {
        Self {
            table_block: ino / INODES_PER_BLOCK,
            slot: (ino % INODES_PER_BLOCK) as usize,
        }
    }

    /// 绝对块号
    ///
    /// superblock 损坏导致块号溢出时返回 `Corrupted`。
    pub fn block_no(&self, sb: &Superblock) -> Result<u32> {
        sb.inode_start
            .checked_add(self.table_block)
            .ok_or(Error::new(ErrorKind::Corrupted, "inode table block out of range"))
    }
}
