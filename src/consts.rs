//! VSFS 常量定义
//!
//! 这个模块包含了磁盘布局的所有常量定义，包括：
//! - 块大小与扇区大小
//! - 魔数
//! - journal 区域与 record 格式
//! - inode / 目录项布局

//=============================================================================
// 基础常量
//=============================================================================

/// 逻辑块大小（4096 字节，格式固定）
pub const BLOCK_SIZE: usize = 4096;

/// 默认物理扇区大小（512 字节）
pub const DEFAULT_SECTOR_SIZE: u32 = 512;

//=============================================================================
// Superblock 相关
//=============================================================================

/// 文件系统魔数 ("VSFS")
pub const FS_MAGIC: u32 = 0x5653_4653;

/// Superblock 所在块号
pub const SUPERBLOCK_BLOCK: u64 = 0;

/// Superblock 在块内占用的字节数（其余部分保留）
pub const SUPERBLOCK_SIZE: usize = 128;

//=============================================================================
// Journal 相关
//=============================================================================

/// Journal 魔数 ("JRNL")
pub const JOURNAL_MAGIC: u32 = 0x4A52_4E4C;

/// 默认 journal 起始块号
pub const JOURNAL_START_BLOCK: u32 = 1;

/// 默认 journal 区域块数
pub const JOURNAL_BLOCKS: u32 = 16;

/// 单个事务最多缓冲的 data record 数
pub const MAX_TXN_RECORDS: usize = 16;

/// Journal header 大小：magic(4) + bytes_used(4)
pub const JOURNAL_HEADER_SIZE: u32 = 8;

/// Record 类型：数据块
pub const REC_DATA: u16 = 1;

/// Record 类型：提交
pub const REC_COMMIT: u16 = 2;

/// Record 头大小：type(2) + size(2)
pub const RECORD_HEADER_SIZE: usize = 4;

/// Data record 大小：头(4) + block_no(4) + payload(4096)
pub const DATA_RECORD_SIZE: usize = RECORD_HEADER_SIZE + 4 + BLOCK_SIZE;

/// Commit record 大小：只有头
pub const COMMIT_RECORD_SIZE: usize = RECORD_HEADER_SIZE;

//=============================================================================
// Inode 相关
//=============================================================================

/// 磁盘 inode 大小（含填充）
pub const INODE_SIZE: usize = 128;

/// 每块 inode 数
pub const INODES_PER_BLOCK: u32 = (BLOCK_SIZE / INODE_SIZE) as u32;

/// 直接块指针数量
pub const INODE_DIRECT_POINTERS: usize = 8;

/// 根目录 inode 编号
pub const ROOT_INODE: u32 = 0;

/// Inode 类型：普通文件
pub const INODE_TYPE_FILE: u16 = 1;

/// Inode 类型：目录
pub const INODE_TYPE_DIR: u16 = 2;

//=============================================================================
// 目录项相关
//=============================================================================

/// 目录项名字字段长度（含结尾 NUL）
pub const NAME_LEN: usize = 28;

/// 目录项大小：inode(4) + name(28)
pub const DIRENT_SIZE: usize = 4 + NAME_LEN;

/// 每块目录项数
pub const DIRENTS_PER_BLOCK: usize = BLOCK_SIZE / DIRENT_SIZE;
