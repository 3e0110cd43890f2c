//! VSFS 磁盘数据结构定义
//!
//! 所有结构都按字段顺序和宽度显式编解码（小端序），不做内存重解释，
//! 所以布局与编译器无关。
//!
//! ```text
//! superblock (块 0, 前 128 字节)
//! 0x00 magic  0x04 block_size  0x08 total_blocks  0x0C inode_count
//! 0x10 journal_block  0x14 inode_bitmap  0x18 data_bitmap
//! 0x1C inode_start  0x20 data_start  0x24.. 保留
//!
//! inode (128 字节)
//! 0x00 type(u16)  0x02 links(u16)  0x04 size  0x08 direct[8]  0x28 ctime  0x2C mtime  0x30.. 填充
//!
//! dirent (32 字节)
//! 0x00 inode  0x04 name[28]
//! ```

use crate::consts::*;
use crate::error::{Error, ErrorKind, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Superblock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Superblock {
    /// 魔数
    pub magic: u32,
    /// 块大小
    pub block_size: u32,
    /// 总块数
    pub total_blocks: u32,
    /// inode 总数
    pub inode_count: u32,
    /// journal 起始块
    pub journal_block: u32,
    /// inode 位图块
    pub inode_bitmap: u32,
    /// 数据块位图块
    pub data_bitmap: u32,
    /// inode 表起始块
    pub inode_start: u32,
    /// 数据区起始块（根目录块）
    pub data_start: u32,
}

impl Superblock {
    /// 从块的前缀解码
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < SUPERBLOCK_SIZE {
            return Err(Error::new(ErrorKind::InvalidInput, "superblock buffer too small"));
        }
        let field = |i: usize| LittleEndian::read_u32(&buf[i * 4..i * 4 + 4]);
        Ok(Self {
            magic: field(0),
            block_size: field(1),
            total_blocks: field(2),
            inode_count: field(3),
            journal_block: field(4),
            inode_bitmap: field(5),
            data_bitmap: field(6),
            inode_start: field(7),
            data_start: field(8),
        })
    }

    /// 编码到块的前缀，保留区清零
    pub fn encode(&self, buf: &mut [u8]) {
        let fields = [
            self.magic,
            self.block_size,
            self.total_blocks,
            self.inode_count,
            self.journal_block,
            self.inode_bitmap,
            self.data_bitmap,
            self.inode_start,
            self.data_start,
        ];
        buf[..SUPERBLOCK_SIZE].fill(0);
        LittleEndian::write_u32_into(&fields, &mut buf[..fields.len() * 4]);
    }

    /// 验证魔数
    pub fn is_valid(&self) -> bool {
        self.magic == FS_MAGIC
    }
}

/// 磁盘 inode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inode {
    /// 类型（0 空闲，1 文件，2 目录）
    pub kind: u16,
    /// 硬链接数
    pub links: u16,
    /// 文件大小（字节）
    pub size: u32,
    /// 直接块指针
    pub direct: [u32; INODE_DIRECT_POINTERS],
    /// 创建时间
    pub ctime: u32,
    /// 修改时间
    pub mtime: u32,
}

impl Inode {
    /// 新建普通文件 inode
    pub fn new_file(now: u32) -> Self {
        Self {
            kind: INODE_TYPE_FILE,
            links: 1,
            size: 0,
            direct: [0; INODE_DIRECT_POINTERS],
            ctime: now,
            mtime: now,
        }
    }

    /// 从 128 字节的槽位解码
    pub fn decode(buf: &[u8]) -> Self {
        let mut direct = [0u32; INODE_DIRECT_POINTERS];
        LittleEndian::read_u32_into(&buf[8..8 + INODE_DIRECT_POINTERS * 4], &mut direct);
        Self {
            kind: LittleEndian::read_u16(&buf[0..2]),
            links: LittleEndian::read_u16(&buf[2..4]),
            size: LittleEndian::read_u32(&buf[4..8]),
            direct,
            ctime: LittleEndian::read_u32(&buf[40..44]),
            mtime: LittleEndian::read_u32(&buf[44..48]),
        }
    }

    /// 编码到 128 字节的槽位，填充区清零
    pub fn encode(&self, buf: &mut [u8]) {
        let slot = &mut buf[..INODE_SIZE];
        slot.fill(0);
        LittleEndian::write_u16(&mut slot[0..2], self.kind);
        LittleEndian::write_u16(&mut slot[2..4], self.links);
        LittleEndian::write_u32(&mut slot[4..8], self.size);
        LittleEndian::write_u32_into(&self.direct, &mut slot[8..8 + INODE_DIRECT_POINTERS * 4]);
        LittleEndian::write_u32(&mut slot[40..44], self.ctime);
        LittleEndian::write_u32(&mut slot[44..48], self.mtime);
    }

    /// 是否是目录
    pub fn is_dir(&self) -> bool {
        self.kind == INODE_TYPE_DIR
    }

    /// 是否是普通文件
    pub fn is_file(&self) -> bool {
        self.kind == INODE_TYPE_FILE
    }
}

/// 目录项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    /// inode 编号
    pub inode: u32,
    /// 名字，NUL 结尾
    pub name: [u8; NAME_LEN],
}

impl DirEntry {
    /// 构造目录项
    ///
    /// 名字超过 27 字节时截断，最后一个字节总是 NUL。
    pub fn new(inode: u32, name: &str) -> Self {
        let mut field = [0u8; NAME_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NAME_LEN - 1);
        field[..len].copy_from_slice(&bytes[..len]);
        Self { inode, name: field }
    }

    /// 解码 32 字节目录项
    pub fn decode(buf: &[u8]) -> Self {
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&buf[4..DIRENT_SIZE]);
        Self {
            inode: LittleEndian::read_u32(&buf[0..4]),
            name,
        }
    }

    /// 编码为 32 字节目录项
    pub fn encode(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..4], self.inode);
        buf[4..DIRENT_SIZE].copy_from_slice(&self.name);
    }

    /// 名字字节（不含 NUL）
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        &self.name[..end]
    }

    /// 名字（非 UTF-8 时返回 None）
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(self.name_bytes()).ok()
    }

    /// 空闲槽位：inode 为 0 且名字为空
    pub fn is_free(&self) -> bool {
        self.inode == 0 && self.name[0] == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superblock_layout() {
        let sb = Superblock {
            magic: FS_MAGIC,
            block_size: 4096,
            total_blocks: 64,
            inode_count: 64,
            journal_block: 1,
            inode_bitmap: 17,
            data_bitmap: 18,
            inode_start: 19,
            data_start: 21,
        };
        let mut buf = [0xEEu8; SUPERBLOCK_SIZE];
        sb.encode(&mut buf);
        assert_eq!(&buf[0..4], &FS_MAGIC.to_le_bytes());
        assert_eq!(&buf[32..36], &21u32.to_le_bytes());
        assert!(buf[36..].iter().all(|&b| b == 0));
        assert_eq!(Superblock::decode(&buf).unwrap(), sb);
        assert!(Superblock::decode(&buf[..10]).is_err());
    }

    #[test]
    fn test_inode_layout() {
        let mut inode = Inode::new_file(77);
        inode.direct[7] = 0xABCD;
        let mut buf = [0xFFu8; INODE_SIZE];
        inode.encode(&mut buf);
        assert_eq!(&buf[0..2], &1u16.to_le_bytes());
        assert_eq!(&buf[36..40], &0xABCDu32.to_le_bytes());
        assert_eq!(&buf[44..48], &77u32.to_le_bytes());
        assert!(buf[48..].iter().all(|&b| b == 0));
        assert_eq!(Inode::decode(&buf), inode);
        assert!(inode.is_file());
    }

    #[test]
    fn test_dirent_truncates_long_name() {
        let long = "a-name-that-is-definitely-longer-than-28";
        let entry = DirEntry::new(5, long);
        assert_eq!(entry.name_bytes().len(), NAME_LEN - 1);
        assert_eq!(entry.name[NAME_LEN - 1], 0);
        assert_eq!(entry.name_str().unwrap(), &long[..NAME_LEN - 1]);
    }

    #[test]
    fn test_dirent_free_slot() {
        assert!(DirEntry::decode(&[0u8; DIRENT_SIZE]).is_free());
        // "." 指向 inode 0 但名字非空
        assert!(!DirEntry::new(0, ".").is_free());
        assert!(!DirEntry::new(3, "").is_free());
    }
}
