//! VSFS Journal 实现
//!
//! 这个模块提供预写日志：先把事务写进 journal 区域，稍后再重放到目标块。
//!
//! # 架构概述
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Transaction Builder                       │
//! │        stage_create_file() / Transaction::write_block()   │
//! └───────────────────────┬──────────────────────────────────┘
//!                         │ stage
//!                         ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Journal Core                            │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐   │
//! │  │    header    │  │    commit    │  │   recovery   │   │
//! │  │ (magic+游标) │  │ (追加 record)│  │ (重放+清空)  │   │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘   │
//! └─────────┼─────────────────┼─────────────────┼────────────┘
//!           └─────────────────┴─────────────────┘
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Block Layer                           │
//! │                 BlockDev / BlockDevice                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # 原子性
//!
//! `bytes_used` 游标只在 commit record 写完之后才落盘。崩溃发生在追加途中时，
//! 磁盘上的游标仍是旧值，重放永远看不到半个事务；游标之后的字节不会被读取。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! let mut journal = Journal::open(&mut bdev, JournalConfig::default())?;
//! let mut txn = Transaction::new();
//! txn.write_block(30, &block)?;
//! journal.stage(&mut bdev, &txn)?;
//!
//! // 之后
//! let report = Journal::load(&mut bdev, JournalConfig::default())?.install(&mut bdev)?;
//! ```

pub mod types;

mod header;
mod commit;
mod recovery;

// Re-exports
pub use types::*;
pub use header::{initialize_if_absent, read_header, write_header};
pub use recovery::{InstallReport, RecordInfo};

use crate::block::{BlockDev, BlockDevice};
use crate::consts::*;
use crate::error::Error;

/// Journal 区域配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalConfig {
    /// 起始块号（header 所在块）
    pub start_block: u32,
    /// 区域块数
    pub block_count: u32,
    /// 单个事务最多的 data record 数
    pub max_txn_records: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            start_block: JOURNAL_START_BLOCK,
            block_count: JOURNAL_BLOCKS,
            max_txn_records: MAX_TXN_RECORDS,
        }
    }
}

impl JournalConfig {
    /// 区域总字节数（含 header）
    pub fn capacity(&self) -> u32 {
        self.block_count.saturating_mul(BLOCK_SIZE as u32)
    }

    /// 区域结束块号（不包含）
    pub fn end_block(&self) -> u32 {
        self.start_block.saturating_add(self.block_count)
    }

    /// 把区域内的字节位置映射为（绝对块号，块内偏移）
    pub(crate) fn locate(&self, pos: u32) -> (u64, usize) {
        let block = self.start_block as u64 + (pos as usize / BLOCK_SIZE) as u64;
        (block, pos as usize % BLOCK_SIZE)
    }
}

/// Journal 操作结果
///
/// 除 `Io` 外都是可恢复的前置条件错误，在任何修改性写入之前检出。
/// `Io` 是致命的存储错误，不做重试。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// 文件系统魔数不匹配
    NotAFilesystem,
    /// Journal 未初始化
    Uninitialized,
    /// Journal 中还有未安装的事务
    Busy,
    /// 没有空闲 inode
    NoFreeInodes,
    /// 根目录没有空闲槽位
    NoFreeDirectorySlots,
    /// 剩余空间放不下事务
    Full,
    /// 未知 record 类型
    UnknownRecordType {
        /// record 在 journal 区域中的偏移
        offset: u32,
        /// 读到的类型标签
        kind: u16,
    },
    /// 单个事务的 data record 超过上限
    TooManyRecords {
        /// 超限 record 的偏移
        offset: u32,
        /// 上限
        limit: usize,
    },
    /// record 声明大小或位置不合法
    MalformedRecord {
        /// record 的偏移
        offset: u32,
    },
    /// 文件名不合法
    InvalidName,
    /// 块 I/O 失败（致命）
    Io(Error),
}

impl JournalError {
    /// 是否是致命的存储错误
    pub fn is_fatal(&self) -> bool {
        matches!(self, JournalError::Io(_))
    }

    /// 命令行退出码，每种结果一个
    pub fn exit_code(&self) -> i32 {
        match self {
            JournalError::NotAFilesystem => 10,
            JournalError::Uninitialized => 11,
            JournalError::Busy => 12,
            JournalError::NoFreeInodes => 13,
            JournalError::NoFreeDirectorySlots => 14,
            JournalError::Full => 15,
            JournalError::UnknownRecordType { .. } => 16,
            JournalError::TooManyRecords { .. } => 17,
            JournalError::MalformedRecord { .. } => 18,
            JournalError::InvalidName => 19,
            JournalError::Io(_) => 74,
        }
    }
}

impl From<Error> for JournalError {
    fn from(err: Error) -> Self {
        JournalError::Io(err)
    }
}

impl core::fmt::Display for JournalError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            JournalError::NotAFilesystem => write!(f, "Invalid filesystem magic"),
            JournalError::Uninitialized => write!(f, "Journal not initialized"),
            JournalError::Busy => write!(
                f,
                "Journal has pending transactions, run install before staging new ones"
            ),
            JournalError::NoFreeInodes => write!(f, "No free inodes available"),
            JournalError::NoFreeDirectorySlots => write!(f, "No free directory slots"),
            JournalError::Full => write!(f, "Journal full, run install first"),
            JournalError::UnknownRecordType { offset, kind } => {
                write!(f, "Unknown record type {} at journal offset {}", kind, offset)
            }
            JournalError::TooManyRecords { offset, limit } => write!(
                f,
                "More than {} data records in one transaction (offset {})",
                limit, offset
            ),
            JournalError::MalformedRecord { offset } => {
                write!(f, "Malformed journal record at offset {}", offset)
            }
            JournalError::InvalidName => write!(f, "Invalid file name"),
            JournalError::Io(err) => write!(f, "Journal I/O error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for JournalError {}

/// Journal 实例
///
/// 持有区域配置和内存中的 header（权威游标）。块设备由调用者按次传入，
/// 同一时刻只有一个写者。
#[derive(Debug, Clone)]
pub struct Journal {
    config: JournalConfig,
    header: JournalHeader,
}

impl Journal {
    /// 读取 header，不做校验也不初始化
    pub fn load<D: BlockDevice>(
        bdev: &mut BlockDev<D>,
        config: JournalConfig,
    ) -> Result<Self, JournalError> {
        let header = read_header(bdev, &config)?;
        Ok(Self { config, header })
    }

    /// 读取 header，未初始化时写入一个空 header
    pub fn open<D: BlockDevice>(
        bdev: &mut BlockDev<D>,
        config: JournalConfig,
    ) -> Result<Self, JournalError> {
        let header = initialize_if_absent(bdev, &config)?;
        Ok(Self { config, header })
    }

    /// 区域配置
    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// 当前 header
    pub fn header(&self) -> &JournalHeader {
        &self.header
    }

    /// 剩余可用字节
    pub fn remaining(&self) -> u32 {
        self.config.capacity().saturating_sub(self.header.bytes_used)
    }

    /// 确认没有待安装的事务
    pub fn ensure_idle(&self) -> Result<(), JournalError> {
        if !self.header.is_initialized() {
            return Err(JournalError::Uninitialized);
        }
        if !self.header.is_empty() {
            return Err(JournalError::Busy);
        }
        Ok(())
    }

    /// 确认还能放下 `size` 字节
    pub fn ensure_room(&self, size: u32) -> Result<(), JournalError> {
        if self.header.bytes_used as u64 + size as u64 > self.config.capacity() as u64 {
            return Err(JournalError::Full);
        }
        Ok(())
    }

    /// 把内存中的 header 写回磁盘
    pub fn persist<D: BlockDevice>(&self, bdev: &mut BlockDev<D>) -> Result<(), JournalError> {
        write_header(bdev, &self.config, &self.header)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_config_locate() {
        let config = JournalConfig::default();
        assert_eq!(config.capacity(), 16 * 4096);
        assert_eq!(config.end_block(), 17);
        assert_eq!(config.locate(0), (1, 0));
        assert_eq!(config.locate(4095), (1, 4095));
        assert_eq!(config.locate(4096), (2, 0));
        assert_eq!(config.locate(12300), (4, 12));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            JournalError::NotAFilesystem,
            JournalError::Uninitialized,
            JournalError::Busy,
            JournalError::NoFreeInodes,
            JournalError::NoFreeDirectorySlots,
            JournalError::Full,
            JournalError::UnknownRecordType { offset: 0, kind: 0 },
            JournalError::TooManyRecords { offset: 0, limit: 0 },
            JournalError::MalformedRecord { offset: 0 },
            JournalError::InvalidName,
            JournalError::Io(Error::new(ErrorKind::Io, "x")),
        ];
        for (i, a) in errors.iter().enumerate() {
            assert_ne!(a.exit_code(), 0);
            for b in &errors[i + 1..] {
                assert_ne!(a.exit_code(), b.exit_code());
            }
        }
        assert!(errors[10].is_fatal());
        assert!(!errors[2].is_fatal());
    }
}
