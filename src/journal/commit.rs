//! Journal 追加与事务提交
//!
//! record 按字节线性追加到 `bytes_used` 处，可以跨越块边界。
//! 每个被触及的块都要读-改-写，因为它可能与已有的 journal 内容共享。

use super::{write_header, Journal, JournalConfig, JournalError, JournalHeader, Record};
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::{Error, ErrorKind, Result},
    transaction::Transaction,
};
use alloc::vec;

/// 把字节写入 journal 区域的 `pos` 处
pub(crate) fn write_journal_bytes<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    config: &JournalConfig,
    mut pos: u32,
    bytes: &[u8],
) -> Result<()> {
    let mut block = vec![0u8; BLOCK_SIZE];
    let mut written = 0;

    while written < bytes.len() {
        let (block_no, offset) = config.locate(pos);
        let chunk = (bytes.len() - written).min(BLOCK_SIZE - offset);

        bdev.read_block(block_no, &mut block)?;
        block[offset..offset + chunk].copy_from_slice(&bytes[written..written + chunk]);
        bdev.write_block(block_no, &block)?;

        written += chunk;
        pos += chunk as u32;
    }

    Ok(())
}

/// 追加一条 record，返回推进后的 header
///
/// 不持久化 header；调用者在 commit record 之后统一写 header。
pub fn append_record<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    config: &JournalConfig,
    header: &JournalHeader,
    record: &Record,
) -> Result<JournalHeader> {
    let bytes = record.encode()?;
    let end = header.bytes_used as u64 + bytes.len() as u64;
    if end > config.capacity() as u64 {
        return Err(Error::new(
            ErrorKind::NoSpace,
            "record does not fit in journal region",
        ));
    }

    write_journal_bytes(bdev, config, header.bytes_used, &bytes)?;
    log::debug!(
        "appended record type={} size={} at {}",
        record.kind(),
        bytes.len(),
        header.bytes_used
    );

    Ok(JournalHeader {
        bytes_used: end as u32,
        ..*header
    })
}

impl Journal {
    /// 追加一条 record，只推进内存中的游标
    ///
    /// 游标落盘前，这条 record 对重放不可见。
    pub fn append<D: BlockDevice>(
        &mut self,
        bdev: &mut BlockDev<D>,
        record: &Record,
    ) -> core::result::Result<(), JournalError> {
        self.ensure_room(record.encoded_len() as u32)?;
        self.header = append_record(bdev, &self.config, &self.header, record)?;
        Ok(())
    }

    /// 暂存一个事务
    ///
    /// 依次追加所有 data record 和一条 commit record，flush 之后再写 header，
    /// header 写入成功才算暂存完成。journal 非空时拒绝（`Busy`），
    /// 放不下时拒绝（`Full`），两种情况下都不写任何东西。
    pub fn stage<D: BlockDevice>(
        &mut self,
        bdev: &mut BlockDev<D>,
        txn: &Transaction,
    ) -> core::result::Result<(), JournalError> {
        self.ensure_idle()?;

        if txn.is_empty() {
            log::debug!("empty transaction, nothing to stage");
            return Ok(());
        }
        if txn.len() > self.config.max_txn_records {
            return Err(JournalError::TooManyRecords {
                offset: self.header.bytes_used,
                limit: self.config.max_txn_records,
            });
        }
        self.ensure_room(txn.serialized_size())?;

        let mut cursor = self.header;
        for record in txn.records() {
            cursor = append_record(bdev, &self.config, &cursor, record)?;
        }
        cursor = append_record(bdev, &self.config, &cursor, &Record::Commit)?;

        // record 先落盘，再推进游标
        bdev.flush()?;
        write_header(bdev, &self.config, &cursor)?;
        bdev.flush()?;
        self.header = cursor;

        log::info!(
            "staged transaction: {} block(s), journal now {} bytes",
            txn.len(),
            cursor.bytes_used
        );
        Ok(())
    }
}
