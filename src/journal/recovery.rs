//! Journal 重放（install）
//!
//! # 重放流程
//!
//! 1. header 魔数不匹配 ⇒ `Uninitialized`
//! 2. journal 为空 ⇒ 什么都不做
//! 3. 从 header 之后开始扫描：data record 缓冲起来，commit record 把缓冲的块全部写到目标位置
//! 4. 扫描到 `bytes_used` 为止；末尾没有 commit 的 data record 丢弃并告警
//! 5. 把 header 重置为空并落盘
//!
//! 出错时不重置 header。已经写出的事务会在下一次 install 时再写一遍，内容相同，所以是幂等的。

use super::{
    write_header, Journal, JournalConfig, JournalError, JournalHeader, Record, RecordHeader,
};
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
};
use alloc::vec;
use alloc::vec::Vec;

/// 一次 install 的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// 重放的事务数
    pub transactions: u32,
    /// 写出的块数
    pub blocks_written: u32,
    /// 丢弃的未提交 data record 数
    pub discarded_records: u32,
}

/// journal 中一条 record 的摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    /// 在 journal 区域中的偏移
    pub offset: u32,
    /// 类型标签
    pub kind: u16,
    /// 声明的字节数
    pub size: u16,
    /// data record 的目标块
    pub block_no: Option<u32>,
}

/// 从 journal 区域的 `pos` 处读出 `buf.len()` 字节
pub(crate) fn read_journal_bytes<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    config: &JournalConfig,
    mut pos: u32,
    buf: &mut [u8],
) -> Result<()> {
    let mut block = vec![0u8; BLOCK_SIZE];
    let mut done = 0;

    while done < buf.len() {
        let (block_no, offset) = config.locate(pos);
        let chunk = (buf.len() - done).min(BLOCK_SIZE - offset);

        bdev.read_block(block_no, &mut block)?;
        buf[done..done + chunk].copy_from_slice(&block[offset..offset + chunk]);

        done += chunk;
        pos += chunk as u32;
    }

    Ok(())
}

/// 顺序扫描 journal 的游标
struct Scanner<'a> {
    config: &'a JournalConfig,
    end: u32,
    pos: u32,
}

impl<'a> Scanner<'a> {
    fn new(config: &'a JournalConfig, header: &JournalHeader) -> core::result::Result<Self, JournalError> {
        if header.bytes_used < JOURNAL_HEADER_SIZE || header.bytes_used > config.capacity() {
            return Err(JournalError::MalformedRecord {
                offset: header.bytes_used,
            });
        }
        Ok(Self {
            config,
            end: header.bytes_used,
            pos: JOURNAL_HEADER_SIZE,
        })
    }

    /// 读下一条 record；扫描到结尾返回 None
    ///
    /// 先读类型和大小，再按类型分派解码。
    fn next<D: BlockDevice>(
        &mut self,
        bdev: &mut BlockDev<D>,
    ) -> core::result::Result<Option<(u32, RecordHeader, Record)>, JournalError> {
        if self.pos >= self.end {
            return Ok(None);
        }
        let offset = self.pos;
        let malformed = JournalError::MalformedRecord { offset };

        if offset as usize + RECORD_HEADER_SIZE > self.end as usize {
            return Err(malformed);
        }
        let mut raw = [0u8; RECORD_HEADER_SIZE];
        read_journal_bytes(bdev, self.config, offset, &mut raw)?;
        let header = RecordHeader::decode(&raw);
        if offset as usize + header.size as usize > self.end as usize {
            return Err(malformed);
        }

        let record = match header.kind {
            REC_DATA => {
                if (header.size as usize) < DATA_RECORD_SIZE {
                    return Err(malformed);
                }
                let mut buf = vec![0u8; DATA_RECORD_SIZE];
                read_journal_bytes(bdev, self.config, offset, &mut buf)?;
                Record::decode_data(&buf)
            }
            REC_COMMIT => {
                if (header.size as usize) < COMMIT_RECORD_SIZE {
                    return Err(malformed);
                }
                Record::Commit
            }
            kind => {
                log::error!("unknown record type {} at journal offset {}", kind, offset);
                return Err(JournalError::UnknownRecordType { offset, kind });
            }
        };

        // 按声明大小前进，不关心 record 内部结构
        self.pos += header.size as u32;
        Ok(Some((offset, header, record)))
    }
}

impl Journal {
    /// 重放所有已提交的事务并清空 journal
    ///
    /// 对空 journal 是无操作，所以连续调用两次时第二次什么都不写。
    pub fn install<D: BlockDevice>(
        &mut self,
        bdev: &mut BlockDev<D>,
    ) -> core::result::Result<InstallReport, JournalError> {
        if !self.header.is_initialized() {
            return Err(JournalError::Uninitialized);
        }

        let mut report = InstallReport::default();
        if self.header.is_empty() {
            log::info!("journal is empty, nothing to install");
            return Ok(report);
        }

        let mut scanner = Scanner::new(&self.config, &self.header)?;
        let mut pending: Vec<(u32, Vec<u8>)> = Vec::new();

        while let Some((offset, _, record)) = scanner.next(bdev)? {
            match record {
                Record::Data { block_no, payload } => {
                    if pending.len() >= self.config.max_txn_records {
                        log::error!("too many data records in one transaction at offset {}", offset);
                        return Err(JournalError::TooManyRecords {
                            offset,
                            limit: self.config.max_txn_records,
                        });
                    }
                    pending.push((block_no, payload));
                }
                Record::Commit => {
                    for (block_no, payload) in pending.drain(..) {
                        log::debug!("replaying block {}", block_no);
                        bdev.write_block(block_no as u64, &payload)?;
                        report.blocks_written += 1;
                    }
                    report.transactions += 1;
                }
            }
        }

        if !pending.is_empty() {
            // 只告警：区分不了"正常结束在事务中间"和"提交之后的内容已损坏"
            log::warn!(
                "found {} uncommitted data record(s) at end of journal, discarding",
                pending.len()
            );
            report.discarded_records = pending.len() as u32;
        }

        // 目标块先落盘，再清空 journal
        bdev.flush()?;
        let empty = JournalHeader::empty();
        write_header(bdev, &self.config, &empty)?;
        bdev.flush()?;
        self.header = empty;

        log::info!(
            "journal installed: {} transaction(s), {} block(s)",
            report.transactions,
            report.blocks_written
        );
        Ok(report)
    }

    /// 列出 journal 中待安装的 record（不修改任何内容）
    pub fn records<D: BlockDevice>(
        &self,
        bdev: &mut BlockDev<D>,
    ) -> core::result::Result<Vec<RecordInfo>, JournalError> {
        if !self.header.is_initialized() {
            return Err(JournalError::Uninitialized);
        }

        let mut scanner = Scanner::new(&self.config, &self.header)?;
        let mut infos = Vec::new();
        while let Some((offset, header, record)) = scanner.next(bdev)? {
            let block_no = match record {
                Record::Data { block_no, .. } => Some(block_no),
                Record::Commit => None,
            };
            infos.push(RecordInfo {
                offset,
                kind: header.kind,
                size: header.size,
                block_no,
            });
        }
        Ok(infos)
    }
}
