//! 测试用内存块设备

use super::BlockDevice;
use crate::consts::BLOCK_SIZE;
use crate::error::{Error, ErrorKind, Result};
use alloc::vec::Vec;

pub(crate) struct MockDevice {
    pub(crate) block_size: u32,
    pub(crate) sector_size: u32,
    pub(crate) total_blocks: u64,
    pub(crate) storage: Vec<u8>,
    /// 写入只报告半个块
    pub(crate) short_writes: bool,
    /// 允许成功的写入次数，之后每次写入都失败（模拟崩溃）
    pub(crate) writes_left: Option<u64>,
}

impl MockDevice {
    pub(crate) fn new(total_blocks: u64) -> Self {
        let block_size = BLOCK_SIZE as u32;
        let sector_size = 512;
        let storage = alloc::vec![0u8; (total_blocks * block_size as u64) as usize];
        Self {
            block_size,
            sector_size,
            total_blocks,
            storage,
            short_writes: false,
            writes_left: None,
        }
    }

    pub(crate) fn block(&self, block_no: u64) -> &[u8] {
        let start = block_no as usize * BLOCK_SIZE;
        &self.storage[start..start + BLOCK_SIZE]
    }
}

impl BlockDevice for MockDevice {
    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn sector_size(&self) -> u32 {
        self.sector_size
    }

    fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
        let start = (lba * self.sector_size as u64) as usize;
        let len = (count * self.sector_size) as usize;
        if start + len > self.storage.len() {
            return Err(Error::new(ErrorKind::Io, "mock read beyond end"));
        }
        buf[..len].copy_from_slice(&self.storage[start..start + len]);
        Ok(len)
    }

    fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(Error::new(ErrorKind::Io, "mock device crashed"));
            }
            *left -= 1;
        }
        let start = (lba * self.sector_size as u64) as usize;
        let mut len = (count * self.sector_size) as usize;
        if start + len > self.storage.len() {
            return Err(Error::new(ErrorKind::Io, "mock write beyond end"));
        }
        if self.short_writes {
            len /= 2;
        }
        self.storage[start..start + len].copy_from_slice(&buf[..len]);
        Ok(len)
    }
}
