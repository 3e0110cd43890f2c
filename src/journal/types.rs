//! Journal 磁盘格式定义
//!
//! journal 区域是一段线性字节空间，从起始块的第 0 字节算起：
//!
//! ```text
//! Offset  Size  Field
//! 0x0000  4     magic (0x4A524E4C)
//! 0x0004  4     bytes_used（含 header 自身）
//! 0x0008  ...   record 序列
//!
//! data record   (4104 字节)
//! 0x0000  2     type = 1
//! 0x0002  2     size = 4104
//! 0x0004  4     block_no
//! 0x0008  4096  payload
//!
//! commit record (4 字节)
//! 0x0000  2     type = 2
//! 0x0002  2     size = 4
//! ```
//!
//! 所有字段都是小端序。record 不做任何对齐，可以跨块。

use crate::consts::*;
use crate::error::{Error, ErrorKind, Result};
use alloc::vec;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};

// =============================================================================
// Journal Header
// =============================================================================

/// Journal header
///
/// 位于 journal 起始块的前 8 字节，每次变更原地覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalHeader {
    /// 魔数，不匹配表示从未初始化
    pub magic: u32,
    /// 有效内容的结尾
    pub bytes_used: u32,
}

impl JournalHeader {
    /// 空 journal 的 header
    pub const fn empty() -> Self {
        Self {
            magic: JOURNAL_MAGIC,
            bytes_used: JOURNAL_HEADER_SIZE,
        }
    }

    /// 从块前缀解码
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            magic: LittleEndian::read_u32(&buf[0..4]),
            bytes_used: LittleEndian::read_u32(&buf[4..8]),
        }
    }

    /// 编码到块前缀
    pub fn encode(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..4], self.magic);
        LittleEndian::write_u32(&mut buf[4..8], self.bytes_used);
    }

    /// 魔数是否匹配
    pub fn is_initialized(&self) -> bool {
        self.magic == JOURNAL_MAGIC
    }

    /// 是否没有待安装的内容
    pub fn is_empty(&self) -> bool {
        self.bytes_used == JOURNAL_HEADER_SIZE
    }
}

// =============================================================================
// Records
// =============================================================================

/// Record 头：类型 + 声明大小
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// 类型标签（`REC_DATA` / `REC_COMMIT` / 未知）
    pub kind: u16,
    /// 声明的字节数（含头），读者按它跳到下一个 record
    pub size: u16,
}

impl RecordHeader {
    /// 解码 4 字节 record 头
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            kind: LittleEndian::read_u16(&buf[0..2]),
            size: LittleEndian::read_u16(&buf[2..4]),
        }
    }

    /// 编码 4 字节 record 头
    pub fn encode(&self, buf: &mut [u8]) {
        LittleEndian::write_u16(&mut buf[0..2], self.kind);
        LittleEndian::write_u16(&mut buf[2..4], self.size);
    }
}

/// Journal record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// 块 `block_no` 最终应包含 `payload`
    Data {
        /// 目标块号
        block_no: u32,
        /// 恰好一个块的内容
        payload: Vec<u8>,
    },
    /// 事务结束
    Commit,
}

impl Record {
    /// 构造 data record
    ///
    /// payload 必须恰好是一个块。
    pub fn data(block_no: u32, payload: &[u8]) -> Result<Self> {
        if payload.len() != BLOCK_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "data record payload must be exactly one block",
            ));
        }
        Ok(Record::Data {
            block_no,
            payload: payload.to_vec(),
        })
    }

    /// 类型标签
    pub fn kind(&self) -> u16 {
        match self {
            Record::Data { .. } => REC_DATA,
            Record::Commit => REC_COMMIT,
        }
    }

    /// 编码后的字节数
    pub fn encoded_len(&self) -> usize {
        match self {
            Record::Data { .. } => DATA_RECORD_SIZE,
            Record::Commit => COMMIT_RECORD_SIZE,
        }
    }

    /// Record 头
    pub fn header(&self) -> RecordHeader {
        RecordHeader {
            kind: self.kind(),
            size: self.encoded_len() as u16,
        }
    }

    /// 编码为字节序列
    ///
    /// 手工构造的 data record 的 payload 不是一个块时返回 `InvalidInput`。
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()];
        self.header().encode(&mut buf[..RECORD_HEADER_SIZE]);
        if let Record::Data { block_no, payload } = self {
            if payload.len() != BLOCK_SIZE {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "data record payload must be exactly one block",
                ));
            }
            LittleEndian::write_u32(&mut buf[4..8], *block_no);
            buf[8..].copy_from_slice(payload);
        }
        Ok(buf)
    }

    /// 解码一条完整的 data record（含头）
    ///
    /// 调用者已根据头部确认类型为 `REC_DATA`。
    pub fn decode_data(buf: &[u8]) -> Self {
        Record::Data {
            block_no: LittleEndian::read_u32(&buf[4..8]),
            payload: buf[8..DATA_RECORD_SIZE].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let mut buf = [0u8; 8];
        JournalHeader::empty().encode(&mut buf);
        assert_eq!(buf, [0x4C, 0x4E, 0x52, 0x4A, 8, 0, 0, 0]);
        let header = JournalHeader::decode(&buf);
        assert!(header.is_initialized());
        assert!(header.is_empty());
        assert!(!JournalHeader::decode(&[0u8; 8]).is_initialized());
    }

    #[test]
    fn test_data_record_layout() {
        let payload = vec![0x11u8; BLOCK_SIZE];
        let record = Record::data(0x0102_0304, &payload).unwrap();
        let bytes = record.encode().unwrap();
        assert_eq!(bytes.len(), 4104);
        assert_eq!(&bytes[0..8], &[1, 0, 0x08, 0x10, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(RecordHeader::decode(&bytes).size as usize, DATA_RECORD_SIZE);
        assert_eq!(Record::decode_data(&bytes), record);
    }

    #[test]
    fn test_commit_record_layout() {
        assert_eq!(Record::Commit.encode().unwrap(), vec![2, 0, 4, 0]);
    }

    #[test]
    fn test_data_record_rejects_partial_payload() {
        assert!(Record::data(1, &[0u8; 100]).is_err());

        // 绕过构造函数的 record 在编码时被拒绝
        let handmade = Record::Data {
            block_no: 1,
            payload: vec![1u8; 10],
        };
        assert_eq!(handmade.encode().unwrap_err().kind(), ErrorKind::InvalidInput);
    }
}
