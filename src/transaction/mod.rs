//! Transaction 构建
//!
//! 事务是一组"块 N 的新内容"，由 [`Journal::stage`](crate::journal::Journal::stage)
//! 一次性写进 journal，之后由 install 原子地重放。
//!
//! ## 模块结构
//!
//! - `create` - 在根目录下创建文件的事务
//!
//! ```rust,ignore
//! use vsfs_journal::transaction::Transaction;
//!
//! let mut txn = Transaction::new();
//! txn.write_block(lba, &block)?;
//! journal.stage(&mut bdev, &txn)?;
//! ```

mod create;

pub use create::{stage_create_file, CreatedFile};

use crate::{
    consts::*,
    error::Result,
    journal::Record,
};
use alloc::vec::Vec;

/// 待暂存的事务
///
/// 只在内存中累积 data record，不接触块设备。
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    records: Vec<Record>,
}

impl Transaction {
    /// 创建空事务
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录块 `block_no` 的新内容
    ///
    /// 同一个块写两次时以后一次为准，事务里每个块只出现一次。
    pub fn write_block(&mut self, block_no: u32, payload: &[u8]) -> Result<()> {
        let record = Record::data(block_no, payload)?;
        let existing = self.records.iter_mut().find(|r| {
            matches!(r, Record::Data { block_no: b, .. } if *b == block_no)
        });
        match existing {
            Some(slot) => *slot = record,
            None => self.records.push(record),
        }
        Ok(())
    }

    /// data record 数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否没有任何块
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 所有 data record，按加入顺序
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// 序列化后的字节数（含 commit record）
    pub fn serialized_size(&self) -> u32 {
        (self.records.len() * DATA_RECORD_SIZE + COMMIT_RECORD_SIZE) as u32
    }
}
