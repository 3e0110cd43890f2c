//! 目录操作模块
//!
//! VSFS 只有一个根目录，目录项存放在 `data_start` 这一块里，
//! 是一张固定容量（128 项）的表。结构定义见 [`crate::types::DirEntry`]。

use crate::consts::*;
use crate::types::DirEntry;

/// 读取目录块中的第 `slot` 项
pub fn entry_at(block: &[u8], slot: usize) -> DirEntry {
    let start = slot * DIRENT_SIZE;
    DirEntry::decode(&block[start..start + DIRENT_SIZE])
}

/// 写入目录块中的第 `slot` 项（只改内存）
pub fn set_entry(block: &mut [u8], slot: usize, entry: &DirEntry) {
    let start = slot * DIRENT_SIZE;
    entry.encode(&mut block[start..start + DIRENT_SIZE]);
}

/// 查找第一个空闲槽位
pub fn find_free_slot(block: &[u8]) -> Option<usize> {
    (0..DIRENTS_PER_BLOCK).find(|&slot| entry_at(block, slot).is_free())
}

/// 遍历所有已使用的目录项
pub fn entries(block: &[u8]) -> impl Iterator<Item = (usize, DirEntry)> + '_ {
    (0..DIRENTS_PER_BLOCK)
        .map(move |slot| (slot, entry_at(block, slot)))
        .filter(|(_, entry)| !entry.is_free())
}

/// 按名字查找
pub fn lookup(block: &[u8], name: &str) -> Option<DirEntry> {
    entries(block)
        .map(|(_, entry)| entry)
        .find(|entry| entry.name_bytes() == name.as_bytes())
}
